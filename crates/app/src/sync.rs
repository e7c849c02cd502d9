//! Live availability sync for the session
//!
//! Wraps a [`fairfloor_net::Subscriber`] in an explicit open/close resource:
//! `open` subscribes to one event's topic and `close` tears everything down,
//! including any pending reconnect timer, so no callback fires into a closed
//! session. Reconnection uses a fixed delay; the channel is best-effort and
//! a session that never connects keeps working off its last snapshot.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fairfloor_net::{ChannelEvent, Subscriber};
use tokio::sync::{mpsc, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Fixed reconnect delay between attempts
const RECONNECT_DELAY_MS: u64 = 5000;

/// Sync connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No subscription requested
    Offline,
    /// Connection attempt in flight
    Connecting,
    /// Subscribed and receiving snapshots
    Live,
    /// Lost the publisher; retrying on a fixed delay
    Reconnecting,
}

/// Events from the sync layer to the session
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// Sync state changed
    StateChanged(SyncState),
    /// New booked-set snapshot; replace the held set wholesale
    Snapshot(Vec<String>),
    /// Publisher refused the subscription (wrong event, full)
    Rejected(String),
}

enum SyncCommand {
    Open { addr: SocketAddr, event_id: Uuid },
    Close,
}

struct SyncShared {
    sync_state: SyncState,
    addr: Option<SocketAddr>,
    event_id: Option<Uuid>,
}

/// Sync manager handle
pub struct StallSync {
    state: Arc<RwLock<SyncShared>>,
    event_rx: mpsc::Receiver<SyncEvent>,
    cmd_tx: mpsc::Sender<SyncCommand>,
}

impl StallSync {
    /// Create a new sync manager; its task runs until the handle drops
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::channel(64);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);

        let state = Arc::new(RwLock::new(SyncShared {
            sync_state: SyncState::Offline,
            addr: None,
            event_id: None,
        }));

        tokio::spawn(sync_task(state.clone(), event_tx, cmd_rx));

        Self {
            state,
            event_rx,
            cmd_tx,
        }
    }

    /// Subscribe to one event's availability topic
    pub async fn open(&self, addr: SocketAddr, event_id: Uuid) -> Result<(), &'static str> {
        self.cmd_tx
            .send(SyncCommand::Open { addr, event_id })
            .await
            .map_err(|_| "Sync task not running")
    }

    /// Tear down the subscription and cancel any pending reconnect
    pub async fn close(&self) {
        let _ = self.cmd_tx.send(SyncCommand::Close).await;
    }

    /// Get the next sync event
    pub async fn next_event(&mut self) -> Option<SyncEvent> {
        self.event_rx.recv().await
    }

    /// Get the next sync event without waiting
    #[allow(dead_code)]
    pub fn try_recv_event(&mut self) -> Option<SyncEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Current sync state
    #[allow(dead_code)]
    pub async fn state(&self) -> SyncState {
        self.state.read().await.sync_state
    }
}

impl Default for StallSync {
    fn default() -> Self {
        Self::new()
    }
}

async fn set_state(
    state: &Arc<RwLock<SyncShared>>,
    event_tx: &mpsc::Sender<SyncEvent>,
    next: SyncState,
) {
    state.write().await.sync_state = next;
    let _ = event_tx.send(SyncEvent::StateChanged(next)).await;
}

/// Main sync task
async fn sync_task(
    state: Arc<RwLock<SyncShared>>,
    event_tx: mpsc::Sender<SyncEvent>,
    mut cmd_rx: mpsc::Receiver<SyncCommand>,
) {
    let mut subscriber: Option<Subscriber> = None;
    // When set, a reconnect attempt fires at this instant; Close clears it.
    let mut reconnect_at: Option<Instant> = None;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SyncCommand::Open { addr, event_id }) => {
                        reconnect_at = None;
                        if let Some(sub) = subscriber.take() {
                            sub.disconnect().await;
                        }
                        {
                            let mut s = state.write().await;
                            s.addr = Some(addr);
                            s.event_id = Some(event_id);
                        }
                        set_state(&state, &event_tx, SyncState::Connecting).await;
                        match Subscriber::connect(addr, event_id).await {
                            Ok(sub) => {
                                subscriber = Some(sub);
                            }
                            Err(e) => {
                                debug!(error = %e, "Initial connect failed, will retry");
                                set_state(&state, &event_tx, SyncState::Reconnecting).await;
                                reconnect_at = Some(
                                    Instant::now() + Duration::from_millis(RECONNECT_DELAY_MS),
                                );
                            }
                        }
                    }
                    Some(SyncCommand::Close) => {
                        reconnect_at = None;
                        if let Some(sub) = subscriber.take() {
                            sub.disconnect().await;
                        }
                        {
                            let mut s = state.write().await;
                            s.addr = None;
                            s.event_id = None;
                        }
                        set_state(&state, &event_tx, SyncState::Offline).await;
                        info!("Availability sync closed");
                    }
                    None => {
                        debug!("Sync command channel closed");
                        break;
                    }
                }
            }

            // Channel events while subscribed
            event = async {
                match subscriber.as_mut() {
                    Some(sub) => sub.next_event().await,
                    None => std::future::pending().await,
                }
            } => {
                match event {
                    Some(ChannelEvent::Subscribed { booked_stall_ids }) => {
                        set_state(&state, &event_tx, SyncState::Live).await;
                        let _ = event_tx.send(SyncEvent::Snapshot(booked_stall_ids)).await;
                    }
                    Some(ChannelEvent::Snapshot { booked_stall_ids }) => {
                        let _ = event_tx.send(SyncEvent::Snapshot(booked_stall_ids)).await;
                    }
                    Some(ChannelEvent::Rejected { reason }) => {
                        warn!(reason = %reason, "Subscription rejected");
                        subscriber = None;
                        let _ = event_tx.send(SyncEvent::Rejected(reason)).await;
                        set_state(&state, &event_tx, SyncState::Offline).await;
                    }
                    Some(ChannelEvent::ServerShutdown) => {
                        debug!("Publisher shutting down");
                    }
                    Some(ChannelEvent::Disconnected) | None => {
                        subscriber = None;
                        let retryable = state.read().await.addr.is_some();
                        if retryable {
                            set_state(&state, &event_tx, SyncState::Reconnecting).await;
                            reconnect_at = Some(
                                Instant::now() + Duration::from_millis(RECONNECT_DELAY_MS),
                            );
                        } else {
                            set_state(&state, &event_tx, SyncState::Offline).await;
                        }
                    }
                }
            }

            // Fixed-delay reconnect timer
            _ = async {
                match reconnect_at {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            } => {
                reconnect_at = None;
                let target = {
                    let s = state.read().await;
                    s.addr.zip(s.event_id)
                };
                if let Some((addr, event_id)) = target {
                    info!(addr = %addr, "Reconnect attempt");
                    match Subscriber::connect(addr, event_id).await {
                        Ok(sub) => {
                            subscriber = Some(sub);
                        }
                        Err(e) => {
                            debug!(error = %e, "Reconnect failed");
                            reconnect_at = Some(
                                Instant::now() + Duration::from_millis(RECONNECT_DELAY_MS),
                            );
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairfloor_net::Publisher;

    async fn next_snapshot(sync: &mut StallSync) -> Vec<String> {
        loop {
            match sync.next_event().await {
                Some(SyncEvent::Snapshot(ids)) => return ids,
                Some(_) => continue,
                None => panic!("sync task ended"),
            }
        }
    }

    #[tokio::test]
    async fn test_open_delivers_snapshots() {
        let event_id = Uuid::new_v4();
        let publisher = Publisher::start(0, event_id, vec!["S-02".to_string()])
            .await
            .unwrap();

        let mut sync = StallSync::new();
        sync.open(publisher.addr(), event_id).await.unwrap();

        assert_eq!(next_snapshot(&mut sync).await, ["S-02"]);

        publisher.publish(vec!["S-02".to_string(), "L-01".to_string()]).await;
        assert_eq!(next_snapshot(&mut sync).await, ["S-02", "L-01"]);

        sync.close().await;
        publisher.shutdown();
    }

    #[tokio::test]
    async fn test_close_goes_offline_and_stays_there() {
        let event_id = Uuid::new_v4();
        let publisher = Publisher::start(0, event_id, Vec::new()).await.unwrap();

        let mut sync = StallSync::new();
        sync.open(publisher.addr(), event_id).await.unwrap();
        next_snapshot(&mut sync).await;

        sync.close().await;

        // Drain until the Offline transition lands
        loop {
            match sync.next_event().await {
                Some(SyncEvent::StateChanged(SyncState::Offline)) => break,
                Some(_) => continue,
                None => panic!("sync task ended"),
            }
        }
        assert_eq!(sync.state().await, SyncState::Offline);

        // A publisher push after close must not surface anything
        publisher.publish(vec!["S-09".to_string()]).await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(sync.try_recv_event().is_none());

        publisher.shutdown();
    }

    #[tokio::test]
    async fn test_connect_failure_schedules_reconnect() {
        // Nothing is listening on this address
        let addr: SocketAddr = "127.0.0.1:1".parse().unwrap();
        let mut sync = StallSync::new();
        sync.open(addr, Uuid::new_v4()).await.unwrap();

        loop {
            match sync.next_event().await {
                Some(SyncEvent::StateChanged(SyncState::Reconnecting)) => break,
                Some(_) => continue,
                None => panic!("sync task ended"),
            }
        }

        // Close cancels the pending retry
        sync.close().await;
        loop {
            match sync.next_event().await {
                Some(SyncEvent::StateChanged(SyncState::Offline)) => break,
                Some(_) => continue,
                None => panic!("sync task ended"),
            }
        }
    }
}
