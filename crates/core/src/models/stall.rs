//! Stall model - the bookable unit

use serde::{Deserialize, Serialize};

use crate::hall::{to_logical, LogicalPoint, Rect};
use crate::models::StallSize;

/// A bookable stall placed on the hall canvas.
///
/// `stall_code` is the stable local key; the server assigns `id` once the
/// stall is persisted. Booked status is *not* owned by this record - the
/// booked-id set is supplied externally and merged at render time.
/// Field names serialize camelCase to match the booking server's JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub stall_code: String,
    pub size: StallSize,
    pub position_x: i32,
    pub position_y: i32,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booked_by: Option<String>,
}

impl Stall {
    pub fn new(stall_code: String, size: StallSize, position_x: i32, position_y: i32) -> Self {
        Self {
            id: None,
            stall_code,
            size,
            position_x,
            position_y,
            price: 0.0,
            blocked: false,
            booked_by: None,
        }
    }

    /// Bounding box of this stall's footprint
    pub fn rect(&self) -> Rect {
        let (width, height) = self.size.footprint();
        Rect::new(self.position_x, self.position_y, width, height)
    }

    /// Operator-facing coordinate of the stall's top-left corner
    pub fn logical(&self) -> LogicalPoint {
        to_logical(self.position_x, self.position_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let stall = Stall::new("S-01".to_string(), StallSize::Small, 303, 70);
        let json = serde_json::to_value(&stall).unwrap();
        assert_eq!(json["stallCode"], "S-01");
        assert_eq!(json["positionX"], 303);
        assert_eq!(json["size"], "SMALL");
        // Unset server identity is omitted entirely
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_deserializes_server_payload() {
        let json = r#"{
            "id": 42,
            "stallCode": "M-03",
            "size": "MEDIUM",
            "positionX": 120,
            "positionY": 260,
            "price": 1500.0,
            "blocked": false,
            "bookedBy": "vendor@example.com"
        }"#;
        let stall: Stall = serde_json::from_str(json).unwrap();
        assert_eq!(stall.id, Some(42));
        assert_eq!(stall.size, StallSize::Medium);
        assert_eq!(stall.booked_by.as_deref(), Some("vendor@example.com"));
    }

    #[test]
    fn test_rect_uses_footprint() {
        let stall = Stall::new("L-01".to_string(), StallSize::Large, 100, 200);
        let rect = stall.rect();
        assert_eq!((rect.width, rect.height), (120, 64));
    }
}
