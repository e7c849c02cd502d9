//! TCP publisher for one event's availability topic
//!
//! The host runs one publisher per event. Subscribers connect, name the
//! event they want, and from then on receive the full booked-set snapshot
//! every time it changes, plus a liveness heartbeat. Everything sent is a
//! whole snapshot; the publisher keeps no per-subscriber delta state.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::io::{ReadHalf, WriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::frame::{read_frame, write_frame};
use crate::protocol::{AvailabilityUpdate, Message};

/// Maximum number of connected subscribers
const MAX_SUBSCRIBERS: usize = 64;

/// Heartbeat interval in milliseconds
const HEARTBEAT_INTERVAL_MS: u64 = 2000;

/// Connected subscriber state
struct Peer {
    tx: mpsc::Sender<Message>,
}

/// Publisher state shared across tasks
struct PublisherState {
    event_id: Uuid,
    booked_stall_ids: Vec<String>,
    peers: HashMap<Uuid, Peer>,
}

/// Availability publisher handle
pub struct Publisher {
    addr: SocketAddr,
    state: Arc<RwLock<PublisherState>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Publisher {
    /// Start a publisher for one event on the given port (0 picks a free one)
    pub async fn start(port: u16, event_id: Uuid, booked_stall_ids: Vec<String>) -> Result<Self> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await?;
        let bound_addr = listener.local_addr()?;

        info!(addr = %bound_addr, event_id = %event_id, "Availability publisher started");

        let (shutdown_tx, _) = broadcast::channel(1);

        let state = Arc::new(RwLock::new(PublisherState {
            event_id,
            booked_stall_ids,
            peers: HashMap::new(),
        }));

        tokio::spawn(accept_task(
            listener,
            state.clone(),
            shutdown_tx.subscribe(),
            shutdown_tx.clone(),
        ));
        tokio::spawn(heartbeat_task(state.clone(), shutdown_tx.subscribe()));

        Ok(Publisher {
            addr: bound_addr,
            state,
            shutdown_tx,
        })
    }

    /// Address the publisher is listening on
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Replace the booked set and broadcast the new snapshot to everyone.
    pub async fn publish(&self, booked_stall_ids: Vec<String>) {
        let mut s = self.state.write().await;
        s.booked_stall_ids = booked_stall_ids.clone();
        let update = Message::Availability(AvailabilityUpdate::now(s.event_id, booked_stall_ids));
        for peer in s.peers.values() {
            let _ = peer.tx.try_send(update.clone());
        }
        debug!(subscribers = s.peers.len(), "Published snapshot");
    }

    /// Number of currently connected subscribers
    pub async fn subscriber_count(&self) -> usize {
        self.state.read().await.peers.len()
    }

    /// Stop accepting, notify subscribers, and release the listener
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Accept loop: one task per incoming connection
async fn accept_task(
    listener: TcpListener,
    state: Arc<RwLock<PublisherState>>,
    mut shutdown_rx: broadcast::Receiver<()>,
    shutdown_tx: broadcast::Sender<()>,
) {
    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, peer_addr)) => {
                        debug!(peer = %peer_addr, "Subscriber connecting");
                        tokio::spawn(connection_task(
                            stream,
                            state.clone(),
                            shutdown_tx.subscribe(),
                        ));
                    }
                    Err(e) => {
                        warn!(error = %e, "Accept failed");
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Publisher accept loop stopping");
                break;
            }
        }
    }
}

/// Periodic liveness beacon to all subscribers
async fn heartbeat_task(state: Arc<RwLock<PublisherState>>, mut shutdown_rx: broadcast::Receiver<()>) {
    let mut tick = tokio::time::interval(Duration::from_millis(HEARTBEAT_INTERVAL_MS));
    loop {
        tokio::select! {
            _ = tick.tick() => {
                let s = state.read().await;
                let beat = Message::Heartbeat {
                    event_id: s.event_id,
                    timestamp: Utc::now(),
                };
                for peer in s.peers.values() {
                    let _ = peer.tx.try_send(beat.clone());
                }
            }
            _ = shutdown_rx.recv() => break,
        }
    }
}

/// Handle one subscriber for its whole lifetime
async fn connection_task(
    stream: TcpStream,
    state: Arc<RwLock<PublisherState>>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let (mut reader, mut writer) = tokio::io::split(stream);

    let peer_id = match admit(&mut reader, &mut writer, &state).await {
        Ok(id) => id,
        Err(e) => {
            debug!(error = %e, "Subscription not admitted");
            return;
        }
    };

    let (tx, mut rx) = mpsc::channel(64);
    state.write().await.peers.insert(peer_id, Peer { tx });

    loop {
        tokio::select! {
            // Outgoing snapshot or heartbeat
            msg = rx.recv() => {
                match msg {
                    Some(msg) => {
                        if let Err(e) = write_frame(&mut writer, &msg).await {
                            debug!(error = %e, "Write failed, dropping subscriber");
                            break;
                        }
                    }
                    None => break,
                }
            }

            // Incoming traffic: only pings are expected
            result = read_frame(&mut reader) => {
                match result {
                    Ok(Message::Ping) => {
                        if write_frame(&mut writer, &Message::Pong).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {
                        debug!("Ignoring unexpected subscriber message");
                    }
                    Err(Error::Protocol(e)) => {
                        debug!(error = %e, "Ignoring malformed subscriber frame");
                    }
                    Err(_) => {
                        debug!(peer = %peer_id, "Subscriber disconnected");
                        break;
                    }
                }
            }

            _ = shutdown_rx.recv() => {
                let _ = write_frame(&mut writer, &Message::ServerShutdown).await;
                break;
            }
        }
    }

    state.write().await.peers.remove(&peer_id);
    debug!(peer = %peer_id, "Subscriber removed");
}

/// Validate the subscription handshake and send the current snapshot
async fn admit(
    reader: &mut ReadHalf<TcpStream>,
    writer: &mut WriteHalf<TcpStream>,
    state: &Arc<RwLock<PublisherState>>,
) -> Result<Uuid> {
    let requested = match read_frame(reader).await? {
        Message::Subscribe { event_id } => event_id,
        _ => {
            let reject = Message::SubscribeRejected {
                reason: "Expected subscribe request".to_string(),
            };
            let _ = write_frame(writer, &reject).await;
            return Err(Error::Protocol("Handshake out of order".into()));
        }
    };

    let (event_id, snapshot, peer_count) = {
        let s = state.read().await;
        (s.event_id, s.booked_stall_ids.clone(), s.peers.len())
    };

    if requested != event_id {
        let reject = Message::SubscribeRejected {
            reason: format!("Unknown event {}", requested),
        };
        let _ = write_frame(writer, &reject).await;
        return Err(Error::Rejected(format!("Wrong event {}", requested)));
    }

    if peer_count >= MAX_SUBSCRIBERS {
        let reject = Message::SubscribeRejected {
            reason: "Publisher full".to_string(),
        };
        let _ = write_frame(writer, &reject).await;
        return Err(Error::PublisherFull);
    }

    write_frame(
        writer,
        &Message::SubscribeAccepted {
            event_id,
            booked_stall_ids: snapshot,
        },
    )
    .await?;

    Ok(Uuid::new_v4())
}
