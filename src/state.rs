use std::sync::RwLock;

use dashmap::DashMap;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::models::delivery::{Delivery, DeliveryEvent, DeliveryStatus};
use crate::models::driver::Driver;
use crate::models::vehicle::{default_catalog, VehicleClass};
use crate::observability::metrics::Metrics;
use crate::settings::PricingSettings;

pub struct AppState {
    pub deliveries: DashMap<Uuid, Delivery>,
    pub drivers: DashMap<Uuid, Driver>,
    pub catalog: RwLock<Vec<VehicleClass>>,
    pub settings: RwLock<PricingSettings>,
    /// Serializes allocation runs; held for the whole batch.
    pub allocation_lock: Mutex<()>,
    pub delivery_events_tx: broadcast::Sender<DeliveryEvent>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(event_buffer_size: usize) -> Self {
        let (delivery_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            deliveries: DashMap::new(),
            drivers: DashMap::new(),
            catalog: RwLock::new(default_catalog()),
            settings: RwLock::new(PricingSettings::default()),
            allocation_lock: Mutex::new(()),
            delivery_events_tx,
            metrics: Metrics::new(),
        }
    }

    pub fn pending_delivery_count(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|entry| entry.value().status == DeliveryStatus::Pending)
            .count()
    }
}
