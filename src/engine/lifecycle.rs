use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::delivery::{Delivery, DeliveryEvent, DeliveryStatus, HistoryEntry};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LifecycleEvent {
    Assign,
    Unassign,
    PickUp,
    StartDelivery,
    ConfirmDelivery,
    ReportIssue,
    Retry,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::Assign => "assign",
            LifecycleEvent::Unassign => "unassign",
            LifecycleEvent::PickUp => "pick_up",
            LifecycleEvent::StartDelivery => "start_delivery",
            LifecycleEvent::ConfirmDelivery => "confirm_delivery",
            LifecycleEvent::ReportIssue => "report_issue",
            LifecycleEvent::Retry => "retry",
        }
    }
}

/// The full transition table. `Delivered` is terminal; `Failed` is
/// recoverable through `Retry`. Anything not listed here is rejected.
pub fn transition(
    status: DeliveryStatus,
    event: LifecycleEvent,
) -> Result<DeliveryStatus, AppError> {
    use DeliveryStatus::*;
    use LifecycleEvent::*;

    match (status, event) {
        (Pending, Assign) => Ok(Assigned),
        (Assigned, PickUp) => Ok(PickedUp),
        (Assigned, Unassign) => Ok(Pending),
        (PickedUp, StartDelivery) => Ok(InTransit),
        (InTransit, ConfirmDelivery) => Ok(Delivered),
        (InTransit, ReportIssue) => Ok(Failed),
        (Failed, Retry) => Ok(Assigned),
        (status, event) => Err(AppError::InvalidTransition(format!(
            "{} from {:?}",
            event.as_str(),
            status
        ))),
    }
}

/// Applies one event to a stored delivery: validates the transition,
/// appends one history entry, publishes a broadcast event, and records
/// metrics. On rejection the record is untouched.
pub fn apply_event(
    state: &AppState,
    delivery_id: Uuid,
    event: LifecycleEvent,
    driver_id: Option<Uuid>,
) -> Result<Delivery, AppError> {
    let result = {
        let mut delivery = state
            .deliveries
            .get_mut(&delivery_id)
            .ok_or_else(|| AppError::NotFound(format!("delivery {delivery_id} not found")))?;

        match transition(delivery.status, event) {
            Ok(_)
                if event == LifecycleEvent::Assign
                    && driver_id.is_none()
                    && delivery.driver_id.is_none() =>
            {
                Err(AppError::InvalidInput(
                    "assign requires a driver_id".to_string(),
                ))
            }
            Ok(next) => {
                let now = Utc::now();
                delivery.status = next;
                match event {
                    LifecycleEvent::Assign => {
                        if let Some(driver_id) = driver_id {
                            delivery.driver_id = Some(driver_id);
                        }
                    }
                    LifecycleEvent::Unassign => {
                        delivery.driver_id = None;
                    }
                    _ => {}
                }
                delivery.history.push(HistoryEntry { status: next, at: now });
                Ok(delivery.clone())
            }
            Err(err) => Err(err),
        }
    };

    let outcome = if result.is_ok() { "success" } else { "rejected" };
    state
        .metrics
        .delivery_transitions_total
        .with_label_values(&[event.as_str(), outcome])
        .inc();

    let delivery = result?;
    state
        .metrics
        .pending_deliveries
        .set(state.pending_delivery_count() as i64);

    let published = DeliveryEvent {
        delivery_id: delivery.id,
        package_id: delivery.package_id,
        status: delivery.status,
        driver_id: delivery.driver_id,
        at: Utc::now(),
    };
    let _ = state.delivery_events_tx.send(published);

    info!(
        delivery_id = %delivery.id,
        event = event.as_str(),
        status = ?delivery.status,
        "delivery transition applied"
    );

    Ok(delivery)
}

#[cfg(test)]
mod tests {
    use super::{apply_event, transition, LifecycleEvent};
    use crate::error::AppError;
    use crate::models::delivery::{Delivery, DeliveryStatus};
    use crate::state::AppState;
    use uuid::Uuid;

    const ALL_STATUSES: [DeliveryStatus; 6] = [
        DeliveryStatus::Pending,
        DeliveryStatus::Assigned,
        DeliveryStatus::PickedUp,
        DeliveryStatus::InTransit,
        DeliveryStatus::Delivered,
        DeliveryStatus::Failed,
    ];

    const ALL_EVENTS: [LifecycleEvent; 7] = [
        LifecycleEvent::Assign,
        LifecycleEvent::Unassign,
        LifecycleEvent::PickUp,
        LifecycleEvent::StartDelivery,
        LifecycleEvent::ConfirmDelivery,
        LifecycleEvent::ReportIssue,
        LifecycleEvent::Retry,
    ];

    #[test]
    fn happy_path_reaches_delivered() {
        let mut status = DeliveryStatus::Pending;
        for event in [
            LifecycleEvent::Assign,
            LifecycleEvent::PickUp,
            LifecycleEvent::StartDelivery,
            LifecycleEvent::ConfirmDelivery,
        ] {
            status = transition(status, event).unwrap();
        }
        assert_eq!(status, DeliveryStatus::Delivered);
    }

    #[test]
    fn failed_delivery_retries_to_assigned() {
        let status = transition(DeliveryStatus::Failed, LifecycleEvent::Retry).unwrap();
        assert_eq!(status, DeliveryStatus::Assigned);
    }

    #[test]
    fn unassign_returns_to_pending() {
        let status = transition(DeliveryStatus::Assigned, LifecycleEvent::Unassign).unwrap();
        assert_eq!(status, DeliveryStatus::Pending);
    }

    #[test]
    fn delivered_is_terminal() {
        for event in ALL_EVENTS {
            assert!(transition(DeliveryStatus::Delivered, event).is_err());
        }
    }

    #[test]
    fn exactly_seven_transitions_are_legal() {
        let mut accepted = 0;
        for status in ALL_STATUSES {
            for event in ALL_EVENTS {
                if transition(status, event).is_ok() {
                    accepted += 1;
                }
            }
        }
        assert_eq!(accepted, 7);
    }

    #[test]
    fn rejection_names_event_and_state() {
        let err = transition(DeliveryStatus::Pending, LifecycleEvent::PickUp).unwrap_err();
        match err {
            AppError::InvalidTransition(msg) => {
                assert!(msg.contains("pick_up"));
                assert!(msg.contains("Pending"));
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    #[test]
    fn rejected_event_leaves_record_and_history_untouched() {
        let state = AppState::new(16);
        let delivery = Delivery::new(Uuid::new_v4(), "06600".to_string());
        let id = delivery.id;
        state.deliveries.insert(id, delivery);

        let err = apply_event(&state, id, LifecycleEvent::PickUp, None).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));

        let stored = state.deliveries.get(&id).unwrap();
        assert_eq!(stored.status, DeliveryStatus::Pending);
        assert_eq!(stored.history.len(), 1);
    }

    #[test]
    fn accepted_event_appends_one_history_entry() {
        let state = AppState::new(16);
        let delivery = Delivery::new(Uuid::new_v4(), "06600".to_string());
        let id = delivery.id;
        state.deliveries.insert(id, delivery);

        let driver = Uuid::new_v4();
        let updated = apply_event(&state, id, LifecycleEvent::Assign, Some(driver)).unwrap();

        assert_eq!(updated.status, DeliveryStatus::Assigned);
        assert_eq!(updated.driver_id, Some(driver));
        assert_eq!(updated.history.len(), 2);
        assert_eq!(updated.history[1].status, DeliveryStatus::Assigned);
    }

    #[test]
    fn assign_without_driver_is_rejected() {
        let state = AppState::new(16);
        let delivery = Delivery::new(Uuid::new_v4(), "06600".to_string());
        let id = delivery.id;
        state.deliveries.insert(id, delivery);

        let err = apply_event(&state, id, LifecycleEvent::Assign, None).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let stored = state.deliveries.get(&id).unwrap();
        assert_eq!(stored.status, DeliveryStatus::Pending);
        assert_eq!(stored.history.len(), 1);
    }

    #[test]
    fn assign_without_driver_counts_as_a_rejected_transition() {
        let state = AppState::new(16);
        let delivery = Delivery::new(Uuid::new_v4(), "06600".to_string());
        let id = delivery.id;
        state.deliveries.insert(id, delivery);

        let rejected = || {
            state
                .metrics
                .delivery_transitions_total
                .with_label_values(&["assign", "rejected"])
                .get()
        };

        let before = rejected();
        apply_event(&state, id, LifecycleEvent::Assign, None).unwrap_err();
        assert_eq!(rejected(), before + 1);
    }

    #[test]
    fn unassign_clears_the_driver() {
        let state = AppState::new(16);
        let delivery = Delivery::new(Uuid::new_v4(), "06600".to_string());
        let id = delivery.id;
        state.deliveries.insert(id, delivery);

        apply_event(&state, id, LifecycleEvent::Assign, Some(Uuid::new_v4())).unwrap();
        let updated = apply_event(&state, id, LifecycleEvent::Unassign, None).unwrap();

        assert_eq!(updated.status, DeliveryStatus::Pending);
        assert_eq!(updated.driver_id, None);
    }
}
