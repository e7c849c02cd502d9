//! Fairfloor session binary
//!
//! Runs either as the organizer host, publishing one event's availability
//! topic, or as a headless vendor session that subscribes to it, keeps a
//! projected floor plan in sync, and takes booking commands on stdin.

mod config;
mod state;
mod sync;

use std::net::SocketAddr;

use fairfloor_core::{
    apply_group_prices, generate_default_positions, Error as CoreError, FloorPlan, Mode,
    StallStatus,
};
use fairfloor_net::Publisher;
use tokio::io::AsyncBufReadExt;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::{AppState, SelectionOutcome, MAX_STALLS_PER_BOOKING};
use crate::sync::{StallSync, SyncEvent};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "Failed to start async runtime");
            std::process::exit(1);
        }
    };

    let result = if config.host {
        runtime.block_on(run_host(config))
    } else {
        runtime.block_on(run_vendor(config))
    };

    if let Err(e) = result {
        error!(error = %e, "Session ended with an error");
        std::process::exit(1);
    }
}

/// Organizer side: generate the layout and publish availability
async fn run_host(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut stalls = match generate_default_positions(&config.counts) {
        Ok(stalls) => stalls,
        Err(CoreError::CapacityExceeded { total, remaining }) => {
            error!(total, remaining, "Requested layout exceeds hall capacity");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    apply_group_prices(&mut stalls, &config.prices);
    info!(stalls = stalls.len(), "Generated default floor plan");

    let addr: SocketAddr = config.server_addr.parse()?;
    let publisher = Publisher::start(addr.port(), config.event_id, Vec::new()).await?;
    info!(addr = %publisher.addr(), event_id = %config.event_id, "Hosting availability");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    publisher.shutdown();
    Ok(())
}

/// Vendor side: subscribe to availability and keep the projection fresh
async fn run_vendor(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new();

    // Same deterministic layout the host generates for this event
    let mut stalls = match generate_default_positions(&config.counts) {
        Ok(stalls) => stalls,
        Err(CoreError::CapacityExceeded { total, remaining }) => {
            error!(total, remaining, "Configured layout exceeds hall capacity");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    apply_group_prices(&mut stalls, &config.prices);
    state.set_stalls(stalls);

    let floor_plan = FloorPlan::new(Mode::Book);

    let addr: SocketAddr = config.server_addr.parse()?;
    let mut sync = StallSync::new();
    sync.open(addr, config.event_id)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    info!(addr = %addr, event_id = %config.event_id, "Vendor session started");

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = sync.next_event() => {
                match event {
                    Some(SyncEvent::Snapshot(booked_stall_ids)) => {
                        state.replace_booked(booked_stall_ids);
                        log_projection(&state, &floor_plan);
                    }
                    Some(SyncEvent::StateChanged(sync_state)) => {
                        info!(state = ?sync_state, "Sync state changed");
                    }
                    Some(SyncEvent::Rejected(reason)) => {
                        error!(reason = %reason, "Subscription rejected");
                        break;
                    }
                    None => break,
                }
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !handle_command(line.trim(), &state, &floor_plan) {
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    sync.close().await;
    Ok(())
}

/// Handle one stdin command; returns false to end the session
fn handle_command(line: &str, state: &AppState, floor_plan: &FloorPlan) -> bool {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("select") => {
            let Some(code) = parts.next() else {
                warn!("Usage: select <stall-code>");
                return true;
            };
            let stalls = state.stalls();
            let Some(stall) = stalls.iter().find(|s| s.stall_code == code) else {
                warn!(code, "Unknown stall");
                return true;
            };
            match floor_plan.click(stall, &state.booked()) {
                Some(action) => match state.apply_click(&action) {
                    SelectionOutcome::Added => {
                        info!(code, total = state.selection_total(), "Stall selected");
                    }
                    SelectionOutcome::Removed => {
                        info!(code, total = state.selection_total(), "Stall deselected");
                    }
                    SelectionOutcome::LimitReached => {
                        warn!(limit = MAX_STALLS_PER_BOOKING, "Selection limit reached");
                    }
                },
                None => info!(code, "Stall not selectable"),
            }
        }
        Some("clear") => {
            state.clear_selection();
            info!("Selection cleared");
        }
        Some("status") => log_projection(state, floor_plan),
        Some("quit") => return false,
        Some(other) => warn!(command = other, "Unknown command (select/clear/status/quit)"),
        None => {}
    }
    true
}

fn log_projection(state: &AppState, floor_plan: &FloorPlan) {
    let views = floor_plan.project(&state.stalls(), &state.selection(), &state.booked());
    let open = views
        .iter()
        .filter(|v| v.status == StallStatus::Open)
        .count();
    let selected = views
        .iter()
        .filter(|v| v.status == StallStatus::Selected)
        .count();
    info!(total = views.len(), open, selected, "Floor plan updated");
}
