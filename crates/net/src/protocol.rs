//! Availability channel message types
//!
//! All messages are JSON-serialized and length-prefixed on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Full snapshot of booked stall codes for one event.
///
/// Always a whole replacement of the booked set, never a diff: receivers
/// drop whatever they held and keep only `booked_stall_ids`. The payload
/// field names match the booking server's JSON (`bookedStallIds`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityUpdate {
    pub event_id: Uuid,
    pub booked_stall_ids: Vec<String>,
    pub published_at: DateTime<Utc>,
}

impl AvailabilityUpdate {
    pub fn now(event_id: Uuid, booked_stall_ids: Vec<String>) -> Self {
        Self {
            event_id,
            booked_stall_ids,
            published_at: Utc::now(),
        }
    }
}

/// Availability channel protocol messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// Client asks to receive availability for one event
    Subscribe { event_id: Uuid },

    /// Publisher accepts, delivering the current snapshot immediately
    SubscribeAccepted {
        event_id: Uuid,
        booked_stall_ids: Vec<String>,
    },

    /// Publisher rejects the subscription
    SubscribeRejected { reason: String },

    /// Booked-set snapshot push
    Availability(AvailabilityUpdate),

    /// Ping to keep the connection alive
    Ping,

    /// Pong response to ping
    Pong,

    /// Publisher liveness beacon
    Heartbeat {
        event_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// Publisher is shutting down
    ServerShutdown,
}

impl Message {
    /// Serialize message to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize message from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
