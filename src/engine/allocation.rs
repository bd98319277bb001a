use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::lifecycle::{apply_event, LifecycleEvent};
use crate::error::AppError;
use crate::models::delivery::DeliveryStatus;
use crate::models::driver::Driver;
use crate::state::AppState;

/// One driver's share of an allocation run. A postal-code zone is never
/// split across drivers.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneAssignment {
    pub driver_id: Uuid,
    pub postal_codes: Vec<String>,
    pub delivery_ids: Vec<Uuid>,
}

/// Distributes all pending deliveries across available drivers, whole
/// zone by whole zone, largest zones first, round-robin in driver catalog
/// order. Runs are serialized behind the allocation lock; each delivery's
/// ASSIGN is an independent idempotent unit, so a re-run skips anything
/// that already left `Pending`.
pub async fn allocate_zones(state: &AppState) -> Result<Vec<ZoneAssignment>, AppError> {
    let _guard = state.allocation_lock.lock().await;

    let start = Instant::now();
    let result = run_allocation(state);

    let outcome = match &result {
        Ok(_) => "success",
        Err(AppError::NoDriversAvailable) => "no_drivers",
        Err(_) => "error",
    };
    state
        .metrics
        .allocation_runs_total
        .with_label_values(&[outcome])
        .inc();

    if let Ok(assignments) = &result {
        info!(
            drivers = assignments.len(),
            deliveries = assignments.iter().map(|a| a.delivery_ids.len()).sum::<usize>(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "allocation run finished"
        );
    }

    result
}

fn run_allocation(state: &AppState) -> Result<Vec<ZoneAssignment>, AppError> {
    let pending: Vec<(Uuid, String)> = state
        .deliveries
        .iter()
        .filter(|entry| entry.value().status == DeliveryStatus::Pending)
        .map(|entry| (entry.value().id, entry.value().postal_code.clone()))
        .collect();

    if pending.is_empty() {
        return Ok(Vec::new());
    }

    let mut drivers: Vec<Driver> = state
        .drivers
        .iter()
        .filter(|entry| entry.value().available)
        .map(|entry| entry.value().clone())
        .collect();
    if drivers.is_empty() {
        return Err(AppError::NoDriversAvailable);
    }
    // catalog order: deterministic for a given store state
    drivers.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

    let mut zones: HashMap<String, Vec<Uuid>> = HashMap::new();
    for (delivery_id, postal_code) in pending {
        zones.entry(postal_code).or_default().push(delivery_id);
    }

    // Largest zones first, so round-robin spreads the big ones across
    // drivers instead of clustering them on whoever comes first.
    let mut zones: Vec<(String, Vec<Uuid>)> = zones.into_iter().collect();
    zones.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(&b.0)));

    let mut assignments: Vec<ZoneAssignment> = drivers
        .iter()
        .map(|driver| ZoneAssignment {
            driver_id: driver.id,
            postal_codes: Vec::new(),
            delivery_ids: Vec::new(),
        })
        .collect();

    for (zone_index, (postal_code, delivery_ids)) in zones.into_iter().enumerate() {
        let slot = &mut assignments[zone_index % drivers.len()];
        let driver_id = slot.driver_id;

        let mut assigned_any = false;
        for delivery_id in delivery_ids {
            match apply_event(state, delivery_id, LifecycleEvent::Assign, Some(driver_id)) {
                Ok(_) => {
                    slot.delivery_ids.push(delivery_id);
                    assigned_any = true;
                }
                // raced out of Pending since the snapshot; safe to skip
                Err(AppError::InvalidTransition(_)) => {
                    warn!(%delivery_id, "delivery left pending during allocation; skipped");
                }
                Err(err) => return Err(err),
            }
        }

        if assigned_any {
            slot.postal_codes.push(postal_code);
        }
    }

    assignments.retain(|a| !a.delivery_ids.is_empty());

    for assignment in &assignments {
        state
            .metrics
            .driver_assigned_zones
            .with_label_values(&[&assignment.driver_id.to_string()])
            .set(assignment.postal_codes.len() as f64);
    }

    Ok(assignments)
}

#[cfg(test)]
mod tests {
    use super::allocate_zones;
    use crate::engine::lifecycle::{apply_event, LifecycleEvent};
    use crate::error::AppError;
    use crate::models::delivery::{Delivery, DeliveryStatus};
    use crate::models::driver::Driver;
    use crate::state::AppState;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn add_driver(state: &AppState, name: &str, minutes_ago: i64) -> Uuid {
        let driver = Driver {
            id: Uuid::new_v4(),
            name: name.to_string(),
            available: true,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        };
        let id = driver.id;
        state.drivers.insert(id, driver);
        id
    }

    fn add_pending(state: &AppState, postal_code: &str) -> Uuid {
        let delivery = Delivery::new(Uuid::new_v4(), postal_code.to_string());
        let id = delivery.id;
        state.deliveries.insert(id, delivery);
        id
    }

    #[tokio::test]
    async fn no_pending_deliveries_is_a_noop_success() {
        let state = AppState::new(16);
        add_driver(&state, "dana", 10);

        let assignments = allocate_zones(&state).await.unwrap();
        assert!(assignments.is_empty());
    }

    #[tokio::test]
    async fn no_drivers_fails_with_zero_side_effects() {
        let state = AppState::new(16);
        let id = add_pending(&state, "06600");

        let err = allocate_zones(&state).await.unwrap_err();
        assert!(matches!(err, AppError::NoDriversAvailable));

        let delivery = state.deliveries.get(&id).unwrap();
        assert_eq!(delivery.status, DeliveryStatus::Pending);
        assert!(delivery.driver_id.is_none());
    }

    #[tokio::test]
    async fn zones_are_never_split_across_drivers() {
        let state = AppState::new(16);
        add_driver(&state, "dana", 20);
        add_driver(&state, "luis", 10);

        for _ in 0..5 {
            add_pending(&state, "06600");
        }
        for _ in 0..3 {
            add_pending(&state, "11520");
        }

        let assignments = allocate_zones(&state).await.unwrap();

        let mut zone_owner: std::collections::HashMap<String, Uuid> =
            std::collections::HashMap::new();
        for assignment in &assignments {
            for postal in &assignment.postal_codes {
                assert!(
                    zone_owner.insert(postal.clone(), assignment.driver_id).is_none(),
                    "zone {postal} assigned to two drivers"
                );
            }
        }
        assert_eq!(zone_owner.len(), 2);
    }

    #[tokio::test]
    async fn every_pending_delivery_gets_assigned() {
        let state = AppState::new(16);
        add_driver(&state, "dana", 30);
        add_driver(&state, "luis", 20);
        add_driver(&state, "mara", 10);

        for postal in ["06600", "06600", "11520", "03100", "03100", "03100", "54000"] {
            add_pending(&state, postal);
        }

        let assignments = allocate_zones(&state).await.unwrap();
        let assigned: usize = assignments.iter().map(|a| a.delivery_ids.len()).sum();
        assert_eq!(assigned, 7);

        for entry in state.deliveries.iter() {
            assert_eq!(entry.value().status, DeliveryStatus::Assigned);
            assert!(entry.value().driver_id.is_some());
        }
    }

    #[tokio::test]
    async fn largest_zone_goes_to_the_first_driver() {
        let state = AppState::new(16);
        let first = add_driver(&state, "dana", 30);
        add_driver(&state, "luis", 10);

        for _ in 0..4 {
            add_pending(&state, "11520");
        }
        add_pending(&state, "06600");

        let assignments = allocate_zones(&state).await.unwrap();
        let firsts = assignments
            .iter()
            .find(|a| a.driver_id == first)
            .expect("first driver got a zone");

        assert_eq!(firsts.postal_codes, vec!["11520".to_string()]);
        assert_eq!(firsts.delivery_ids.len(), 4);
    }

    #[tokio::test]
    async fn rerun_skips_deliveries_already_assigned() {
        let state = AppState::new(16);
        let driver = add_driver(&state, "dana", 10);

        let assigned_early = add_pending(&state, "06600");
        add_pending(&state, "06600");
        apply_event(&state, assigned_early, LifecycleEvent::Assign, Some(driver)).unwrap();

        let assignments = allocate_zones(&state).await.unwrap();
        let assigned: usize = assignments.iter().map(|a| a.delivery_ids.len()).sum();

        assert_eq!(assigned, 1);
        assert!(!assignments
            .iter()
            .any(|a| a.delivery_ids.contains(&assigned_early)));
    }

    #[tokio::test]
    async fn unavailable_drivers_are_not_considered() {
        let state = AppState::new(16);
        let driver = Driver {
            id: Uuid::new_v4(),
            name: "off-duty".to_string(),
            available: false,
            created_at: Utc::now(),
        };
        state.drivers.insert(driver.id, driver);
        add_pending(&state, "06600");

        let err = allocate_zones(&state).await.unwrap_err();
        assert!(matches!(err, AppError::NoDriversAvailable));
    }
}
