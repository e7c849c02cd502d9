//! TCP subscriber for one event's availability topic
//!
//! The channel is best-effort: a subscriber that never connects leaves the
//! booking UI fully usable with its last fetched snapshot. Malformed frames
//! are skipped without dropping the connection or the held snapshot.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::frame::{read_frame, write_frame};
use crate::protocol::Message;

/// Publisher is considered dead if no heartbeat for this many milliseconds
const PUBLISHER_DEAD_TIMEOUT_MS: u64 = 6000;

/// Outgoing ping cadence in milliseconds
const PING_INTERVAL_MS: u64 = 4000;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Event received from the publisher
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// Subscription accepted; carries the snapshot current at that moment
    Subscribed { booked_stall_ids: Vec<String> },
    /// Booked-set replacement push
    Snapshot { booked_stall_ids: Vec<String> },
    /// Subscription was rejected
    Rejected { reason: String },
    /// Publisher is shutting down
    ServerShutdown,
    /// Connection lost (heartbeat timeout or socket close)
    Disconnected,
}

/// Subscriber handle for one event's availability channel
pub struct Subscriber {
    state: Arc<RwLock<SubscriberState>>,
    event_rx: mpsc::Receiver<ChannelEvent>,
    cmd_tx: mpsc::Sender<SubscriberCommand>,
}

struct SubscriberState {
    connection: ConnectionState,
    event_id: Uuid,
    last_heartbeat: Instant,
}

enum SubscriberCommand {
    Disconnect,
}

impl Subscriber {
    /// Connect and subscribe to one event's availability topic
    pub async fn connect(addr: SocketAddr, event_id: Uuid) -> Result<Self> {
        info!(addr = %addr, event_id = %event_id, "Connecting to availability publisher");

        let stream = TcpStream::connect(addr).await?;
        let (reader, mut writer) = tokio::io::split(stream);

        write_frame(&mut writer, &Message::Subscribe { event_id }).await?;

        let state = Arc::new(RwLock::new(SubscriberState {
            connection: ConnectionState::Connecting,
            event_id,
            last_heartbeat: Instant::now(),
        }));

        let (event_tx, event_rx) = mpsc::channel(64);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);

        let state_clone = state.clone();
        tokio::spawn(connection_task(
            reader,
            writer,
            state_clone,
            event_tx,
            cmd_rx,
        ));

        Ok(Subscriber {
            state,
            event_rx,
            cmd_tx,
        })
    }

    /// Get the next channel event
    pub async fn next_event(&mut self) -> Option<ChannelEvent> {
        self.event_rx.recv().await
    }

    /// Tear the connection down. Safe on every exit path; the task stops
    /// and no further events fire after the receiver drains.
    pub async fn disconnect(&self) {
        let _ = self.cmd_tx.send(SubscriberCommand::Disconnect).await;
    }

    /// Get current connection state
    pub async fn connection_state(&self) -> ConnectionState {
        self.state.read().await.connection
    }

    /// Event this subscriber is scoped to
    pub async fn event_id(&self) -> Uuid {
        self.state.read().await.event_id
    }
}

/// Main connection task
async fn connection_task(
    mut reader: ReadHalf<TcpStream>,
    mut writer: WriteHalf<TcpStream>,
    state: Arc<RwLock<SubscriberState>>,
    event_tx: mpsc::Sender<ChannelEvent>,
    mut cmd_rx: mpsc::Receiver<SubscriberCommand>,
) {
    // Wait for the subscription response
    match read_frame(&mut reader).await {
        Ok(Message::SubscribeAccepted {
            event_id: _,
            booked_stall_ids,
        }) => {
            {
                let mut s = state.write().await;
                s.connection = ConnectionState::Connected;
                s.last_heartbeat = Instant::now();
            }
            let _ = event_tx
                .send(ChannelEvent::Subscribed { booked_stall_ids })
                .await;
            info!("Subscribed to availability topic");
        }
        Ok(Message::SubscribeRejected { reason }) => {
            state.write().await.connection = ConnectionState::Disconnected;
            warn!(reason = %reason, "Subscription rejected");
            let _ = event_tx.send(ChannelEvent::Rejected { reason }).await;
            return;
        }
        Ok(_) => {
            warn!("Unexpected first message from publisher");
            state.write().await.connection = ConnectionState::Disconnected;
            let _ = event_tx.send(ChannelEvent::Disconnected).await;
            return;
        }
        Err(e) => {
            warn!(error = %e, "Failed to read subscription response");
            state.write().await.connection = ConnectionState::Disconnected;
            let _ = event_tx.send(ChannelEvent::Disconnected).await;
            return;
        }
    }

    let mut ping_tick = tokio::time::interval(Duration::from_millis(PING_INTERVAL_MS));
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let watchdog_interval = Duration::from_millis(1000);

    loop {
        tokio::select! {
            // Incoming message from the publisher
            result = read_frame(&mut reader) => {
                match result {
                    Ok(msg) => {
                        if !handle_publisher_message(msg, &state, &event_tx).await {
                            break;
                        }
                    }
                    Err(Error::Protocol(e)) => {
                        // Malformed payload: drop it, keep the stream. The
                        // previously delivered snapshot stays in force.
                        debug!(error = %e, "Ignoring malformed frame");
                    }
                    Err(Error::ConnectionClosed) => {
                        debug!("Publisher closed connection");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Read error");
                        break;
                    }
                }
            }

            // Keep-alive ping
            _ = ping_tick.tick() => {
                if let Err(e) = write_frame(&mut writer, &Message::Ping).await {
                    warn!(error = %e, "Write error");
                    break;
                }
            }

            // Heartbeat watchdog
            _ = tokio::time::sleep(watchdog_interval) => {
                let elapsed = state.read().await.last_heartbeat.elapsed().as_millis() as u64;
                if elapsed > PUBLISHER_DEAD_TIMEOUT_MS {
                    warn!(elapsed_ms = elapsed, "Publisher appears dead - no heartbeat");
                    break;
                }
            }

            // Teardown requested
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SubscriberCommand::Disconnect) | None => {
                        debug!("Disconnect requested");
                        break;
                    }
                }
            }
        }
    }

    state.write().await.connection = ConnectionState::Disconnected;
    let _ = event_tx.send(ChannelEvent::Disconnected).await;
    info!("Disconnected from availability publisher");
}

/// Handle one message; returns false when the connection should end
async fn handle_publisher_message(
    msg: Message,
    state: &Arc<RwLock<SubscriberState>>,
    event_tx: &mpsc::Sender<ChannelEvent>,
) -> bool {
    match msg {
        Message::Availability(update) => {
            let scoped = state.read().await.event_id;
            if update.event_id != scoped {
                // Another event's topic leaked through; not ours to apply.
                debug!(event_id = %update.event_id, "Ignoring snapshot for other event");
                return true;
            }
            let _ = event_tx
                .send(ChannelEvent::Snapshot {
                    booked_stall_ids: update.booked_stall_ids,
                })
                .await;
            true
        }
        Message::Heartbeat { timestamp: _, .. } => {
            state.write().await.last_heartbeat = Instant::now();
            true
        }
        Message::Pong => {
            debug!("Received pong");
            true
        }
        Message::ServerShutdown => {
            let _ = event_tx.send(ChannelEvent::ServerShutdown).await;
            false
        }
        _ => {
            debug!("Ignoring unexpected message");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::AvailabilityUpdate;
    use crate::server::Publisher;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_subscribe_delivers_initial_snapshot() {
        let event_id = Uuid::new_v4();
        let publisher = Publisher::start(0, event_id, vec!["S-01".to_string()])
            .await
            .unwrap();

        let mut sub = Subscriber::connect(publisher.addr(), event_id).await.unwrap();

        match sub.next_event().await {
            Some(ChannelEvent::Subscribed { booked_stall_ids }) => {
                assert_eq!(booked_stall_ids, ["S-01"]);
            }
            other => panic!("Expected Subscribed, got {:?}", other),
        }

        assert_eq!(sub.connection_state().await, ConnectionState::Connected);
        sub.disconnect().await;
        publisher.shutdown();
    }

    #[tokio::test]
    async fn test_publish_replaces_snapshot() {
        let event_id = Uuid::new_v4();
        let publisher = Publisher::start(0, event_id, Vec::new()).await.unwrap();

        let mut sub = Subscriber::connect(publisher.addr(), event_id).await.unwrap();
        assert!(matches!(
            sub.next_event().await,
            Some(ChannelEvent::Subscribed { .. })
        ));

        publisher
            .publish(vec!["S-01".to_string(), "M-03".to_string()])
            .await;

        match sub.next_event().await {
            Some(ChannelEvent::Snapshot { booked_stall_ids }) => {
                assert_eq!(booked_stall_ids, ["S-01", "M-03"]);
            }
            other => panic!("Expected Snapshot, got {:?}", other),
        }

        sub.disconnect().await;
        publisher.shutdown();
    }

    #[tokio::test]
    async fn test_wrong_event_is_rejected() {
        let publisher = Publisher::start(0, Uuid::new_v4(), Vec::new()).await.unwrap();

        let mut sub = Subscriber::connect(publisher.addr(), Uuid::new_v4())
            .await
            .unwrap();

        assert!(matches!(
            sub.next_event().await,
            Some(ChannelEvent::Rejected { .. })
        ));
        publisher.shutdown();
    }

    #[tokio::test]
    async fn test_malformed_frame_is_skipped() {
        let event_id = Uuid::new_v4();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (mut reader, mut writer) = tokio::io::split(stream);

            // Consume the Subscribe frame, accept the subscription
            read_frame(&mut reader).await.unwrap();
            write_frame(
                &mut writer,
                &Message::SubscribeAccepted {
                    event_id,
                    booked_stall_ids: Vec::new(),
                },
            )
            .await
            .unwrap();

            // A garbage frame, then a well-formed snapshot
            let garbage = b"{broken";
            writer
                .write_all(&(garbage.len() as u32).to_be_bytes())
                .await
                .unwrap();
            writer.write_all(garbage).await.unwrap();
            write_frame(
                &mut writer,
                &Message::Availability(AvailabilityUpdate::now(
                    event_id,
                    vec!["L-02".to_string()],
                )),
            )
            .await
            .unwrap();

            // Hold the socket open until the client has read everything
            tokio::time::sleep(Duration::from_millis(500)).await;
        });

        let mut sub = Subscriber::connect(addr, event_id).await.unwrap();
        assert!(matches!(
            sub.next_event().await,
            Some(ChannelEvent::Subscribed { .. })
        ));

        // The malformed frame is silently dropped; the next event is the
        // well-formed snapshot.
        match sub.next_event().await {
            Some(ChannelEvent::Snapshot { booked_stall_ids }) => {
                assert_eq!(booked_stall_ids, ["L-02"]);
            }
            other => panic!("Expected Snapshot, got {:?}", other),
        }

        sub.disconnect().await;
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_notifies_subscribers() {
        let event_id = Uuid::new_v4();
        let publisher = Publisher::start(0, event_id, Vec::new()).await.unwrap();

        let mut sub = Subscriber::connect(publisher.addr(), event_id).await.unwrap();
        assert!(matches!(
            sub.next_event().await,
            Some(ChannelEvent::Subscribed { .. })
        ));

        publisher.shutdown();

        // ServerShutdown followed by Disconnected as the task winds down
        let mut saw_shutdown = false;
        while let Some(event) = sub.next_event().await {
            match event {
                ChannelEvent::ServerShutdown => saw_shutdown = true,
                ChannelEvent::Disconnected => break,
                _ => {}
            }
        }
        assert!(saw_shutdown);
    }
}
