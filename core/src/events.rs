//! Workshop change notifications.
//!
//! [`WorkshopEventBus`] is an explicit, session-scoped registry: whoever owns
//! the session owns the bus and passes it to the components that publish
//! workshop mutations. There is no process-wide instance.
//!
//! # Delivery
//!
//! - Observers run synchronously, in subscription order, once per
//!   [`WorkshopEventBus::notify`] call.
//! - Each observer receives its own clone of the workshop, so nothing one
//!   observer does to its snapshot is visible to the next.
//! - A failing observer (an `Err` return or a panic) is logged and reported in
//!   the [`NotifyReport`]; delivery continues with the next observer.
//!
//! # Reentrancy
//!
//! `notify`, `subscribe`, and `unsubscribe` all take `&mut self`, so an
//! observer cannot reach back into the bus that is delivering to it.
//!
//! # Lifetime
//!
//! Subscriptions live until [`WorkshopEventBus::unsubscribe`] is called or the
//! bus is dropped. Nothing is cleaned up automatically.

use std::num::NonZeroUsize;
use std::panic::{AssertUnwindSafe, catch_unwind};

use chrono::{DateTime, Utc};
use thiserror::Error;

use ebios_types::{BoundedBuffer, Workshop, WorkshopId, WorkshopNumber, WorkshopStatus};

/// Delivery records kept when nothing else is configured.
pub const DEFAULT_HISTORY_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(n) => n,
    None => unreachable!(),
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ObserverError {
    message: String,
}

impl ObserverError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Receives workshop snapshots.
pub trait WorkshopObserver: Send {
    fn on_workshop_changed(&mut self, snapshot: Workshop) -> Result<(), ObserverError>;
}

impl<F> WorkshopObserver for F
where
    F: FnMut(Workshop) -> Result<(), ObserverError> + Send,
{
    fn on_workshop_changed(&mut self, snapshot: Workshop) -> Result<(), ObserverError> {
        self(snapshot)
    }
}

/// Handle returned by [`WorkshopEventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Returned(ObserverError),
    Panicked(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverFailure {
    pub subscription: SubscriptionId,
    pub kind: FailureKind,
}

/// Outcome of one `notify` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyReport {
    pub delivered: usize,
    pub failures: Vec<ObserverFailure>,
}

impl NotifyReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// What was delivered, kept in the bus's bounded history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRecord {
    pub workshop: WorkshopId,
    pub number: WorkshopNumber,
    pub status: WorkshopStatus,
    pub delivered: usize,
    pub failed: usize,
    pub at: DateTime<Utc>,
}

struct Subscription {
    id: SubscriptionId,
    observer: Box<dyn WorkshopObserver>,
}

pub struct WorkshopEventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
    history: BoundedBuffer<DeliveryRecord>,
}

impl std::fmt::Debug for WorkshopEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkshopEventBus")
            .field("subscribers", &self.subscriptions.len())
            .field("next_id", &self.next_id)
            .field("history", &self.history.len())
            .finish()
    }
}

impl Default for WorkshopEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkshopEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    #[must_use]
    pub fn with_history_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 1,
            history: BoundedBuffer::new(capacity),
        }
    }

    pub fn subscribe(&mut self, observer: impl WorkshopObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            observer: Box::new(observer),
        });
        tracing::debug!(subscription = id.0, total = self.subscriptions.len(), "Observer subscribed");
        id
    }

    /// Remove a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.id != id);
        let removed = self.subscriptions.len() != before;
        if removed {
            tracing::debug!(subscription = id.0, total = self.subscriptions.len(), "Observer unsubscribed");
        }
        removed
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Deliver a snapshot of `workshop` to every observer.
    pub fn notify(&mut self, workshop: &Workshop) -> NotifyReport {
        let mut report = NotifyReport::default();

        for sub in &mut self.subscriptions {
            let snapshot = workshop.clone();
            let observer = &mut sub.observer;
            let outcome = catch_unwind(AssertUnwindSafe(|| observer.on_workshop_changed(snapshot)));
            let kind = match outcome {
                Ok(Ok(())) => {
                    report.delivered += 1;
                    continue;
                }
                Ok(Err(err)) => FailureKind::Returned(err),
                Err(payload) => FailureKind::Panicked(panic_message(payload.as_ref())),
            };
            tracing::warn!(
                subscription = sub.id.0,
                workshop = %workshop.id,
                error = ?kind,
                "Workshop observer failed; continuing delivery"
            );
            report.failures.push(ObserverFailure {
                subscription: sub.id,
                kind,
            });
        }

        self.history.push(DeliveryRecord {
            workshop: workshop.id.clone(),
            number: workshop.number,
            status: workshop.status,
            delivered: report.delivered,
            failed: report.failures.len(),
            at: Utc::now(),
        });

        report
    }

    /// Recent deliveries, oldest first.
    #[must_use]
    pub fn history(&self) -> &BoundedBuffer<DeliveryRecord> {
        &self.history
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "observer panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use ebios_types::MissionId;

    fn workshop() -> Workshop {
        Workshop::new(
            WorkshopId::new("w-1"),
            MissionId::new("mission-1"),
            WorkshopNumber::new(1).unwrap(),
            Utc::now(),
        )
    }

    type Log = Arc<Mutex<Vec<(&'static str, Workshop)>>>;

    fn recorder(log: &Log, name: &'static str) -> impl WorkshopObserver + 'static {
        let log = Arc::clone(log);
        move |snapshot: Workshop| -> Result<(), ObserverError> {
            log.lock().unwrap().push((name, snapshot));
            Ok(())
        }
    }

    #[test]
    fn fan_out_in_subscription_order() {
        let log: Log = Arc::default();
        let mut bus = WorkshopEventBus::new();
        bus.subscribe(recorder(&log, "first"));
        bus.subscribe(recorder(&log, "second"));
        bus.subscribe(recorder(&log, "third"));

        let w = workshop();
        let report = bus.notify(&w);

        assert_eq!(report.delivered, 3);
        assert!(report.is_clean());
        let log = log.lock().unwrap();
        let names: Vec<&str> = log.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
        for (_, snapshot) in log.iter() {
            assert_eq!(snapshot, &w);
            assert!(!std::ptr::eq(snapshot, &w));
        }
    }

    #[test]
    fn observer_mutation_does_not_leak() {
        let seen: Arc<Mutex<Vec<usize>>> = Arc::default();
        let mut bus = WorkshopEventBus::new();
        bus.subscribe(|mut snapshot: Workshop| -> Result<(), ObserverError> {
            snapshot.record_step("tampered".into());
            snapshot.status = WorkshopStatus::Completed;
            Ok(())
        });
        let seen_clone = Arc::clone(&seen);
        bus.subscribe(move |snapshot: Workshop| -> Result<(), ObserverError> {
            assert_eq!(snapshot.status, WorkshopStatus::NotStarted);
            seen_clone.lock().unwrap().push(snapshot.completed_steps().len());
            Ok(())
        });

        let report = bus.notify(&workshop());
        assert!(report.is_clean());
        assert_eq!(*seen.lock().unwrap(), vec![0]);
    }

    #[test]
    fn failing_observers_do_not_block_the_rest() {
        let log: Log = Arc::default();
        let mut bus = WorkshopEventBus::new();
        let erroring = bus.subscribe(|_: Workshop| -> Result<(), ObserverError> {
            Err(ObserverError::new("storage offline"))
        });
        let panicking = bus.subscribe(|_: Workshop| -> Result<(), ObserverError> {
            panic!("observer blew up")
        });
        bus.subscribe(recorder(&log, "survivor"));

        let report = bus.notify(&workshop());

        assert_eq!(report.delivered, 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].subscription, erroring);
        assert_eq!(
            report.failures[0].kind,
            FailureKind::Returned(ObserverError::new("storage offline"))
        );
        assert_eq!(report.failures[1].subscription, panicking);
        assert_eq!(
            report.failures[1].kind,
            FailureKind::Panicked("observer blew up".to_owned())
        );
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let log: Log = Arc::default();
        let mut bus = WorkshopEventBus::new();
        let first = bus.subscribe(recorder(&log, "first"));
        bus.subscribe(recorder(&log, "second"));

        assert!(bus.unsubscribe(first));
        assert!(!bus.unsubscribe(first));
        assert_eq!(bus.subscriber_count(), 1);

        bus.notify(&workshop());
        let names: Vec<&str> = log.lock().unwrap().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["second"]);
    }

    #[test]
    fn each_notify_delivers_once_per_observer() {
        let log: Log = Arc::default();
        let mut bus = WorkshopEventBus::new();
        bus.subscribe(recorder(&log, "only"));
        bus.notify(&workshop());
        bus.notify(&workshop());
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn history_is_bounded() {
        let mut bus = WorkshopEventBus::with_history_capacity(NonZeroUsize::new(2).unwrap());
        let mut w = workshop();
        for status in [
            WorkshopStatus::NotStarted,
            WorkshopStatus::InProgress,
            WorkshopStatus::Completed,
        ] {
            w.status = status;
            bus.notify(&w);
        }
        let statuses: Vec<WorkshopStatus> = bus.history().iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![WorkshopStatus::InProgress, WorkshopStatus::Completed]
        );
        assert_eq!(bus.history().latest().map(|r| r.delivered), Some(0));
    }
}
