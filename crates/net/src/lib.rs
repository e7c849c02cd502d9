//! Fairfloor Network Library
//!
//! Live availability channel for one event: a host runs a [`Publisher`]
//! that pushes the current set of booked stall codes, and each vendor
//! client runs a [`Subscriber`] that receives those snapshots.
//!
//! # Architecture
//!
//! - **Publisher**: per-event TCP host, broadcasts full snapshots
//! - **Subscriber**: connects for one event id, receives snapshots
//! - **Protocol**: length-prefixed JSON messages
//!
//! Every update is a whole replacement of the booked set, never a diff;
//! subscribers apply the most recent successfully parsed message and need
//! no ordering or deduplication logic beyond that.
//!
//! # Usage
//!
//! ```ignore
//! // Host publishes availability for an event
//! let publisher = Publisher::start(7410, event_id, initial_booked).await?;
//! publisher.publish(vec!["S-01".into(), "M-03".into()]).await;
//!
//! // A vendor client subscribes
//! let mut sub = Subscriber::connect(addr, event_id).await?;
//! while let Some(event) = sub.next_event().await {
//!     match event {
//!         ChannelEvent::Snapshot { booked_stall_ids } => { /* replace set */ }
//!         _ => {}
//!     }
//! }
//! ```

pub mod client;
pub mod error;
mod frame;
pub mod protocol;
pub mod server;

pub use client::{ChannelEvent, ConnectionState, Subscriber};
pub use error::{Error, Result};
pub use protocol::{AvailabilityUpdate, Message};
pub use server::Publisher;

/// Default port for Fairfloor availability publishers
pub const DEFAULT_PORT: u16 = 7410;
