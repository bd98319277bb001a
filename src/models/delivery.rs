use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeliveryStatus {
    Pending,
    Assigned,
    PickedUp,
    InTransit,
    Delivered,
    Failed,
}

/// One immutable history entry per accepted transition (plus the initial
/// `Pending`). History is append-only and never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub status: DeliveryStatus,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: Uuid,
    pub package_id: Uuid,
    pub postal_code: String,
    pub status: DeliveryStatus,
    pub driver_id: Option<Uuid>,
    pub history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
}

impl Delivery {
    pub fn new(package_id: Uuid, postal_code: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            package_id,
            postal_code,
            status: DeliveryStatus::Pending,
            driver_id: None,
            history: vec![HistoryEntry {
                status: DeliveryStatus::Pending,
                at: now,
            }],
            created_at: now,
        }
    }
}

/// Published on the broadcast channel after every accepted transition;
/// the websocket endpoint forwards these to connected clients.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryEvent {
    pub delivery_id: Uuid,
    pub package_id: Uuid,
    pub status: DeliveryStatus,
    pub driver_id: Option<Uuid>,
    pub at: DateTime<Utc>,
}
