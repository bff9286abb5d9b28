//! Workshop state machine.
//!
//! Step completion and status derivation are separate operations. Completing a
//! step never changes `status`; the caller derives (and optionally applies) the
//! status afterwards, so no transition happens behind its back.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use chrono::{DateTime, Utc};

use ebios_types::{StepId, Workshop, WorkshopNumber, WorkshopStatus};

/// Steps required per workshop when nothing else is configured.
pub const DEFAULT_STEPS_PER_WORKSHOP: NonZeroU32 = match NonZeroU32::new(5) {
    Some(n) => n,
    None => unreachable!(),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Recorded,
    /// Completing a step twice is a no-op, not an error.
    AlreadyCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Unchanged(WorkshopStatus),
    Changed {
        from: WorkshopStatus,
        to: WorkshopStatus,
    },
}

/// Required step count for each workshop number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkshopStepPlan {
    totals: BTreeMap<WorkshopNumber, NonZeroU32>,
}

impl Default for WorkshopStepPlan {
    fn default() -> Self {
        Self::uniform(DEFAULT_STEPS_PER_WORKSHOP)
    }
}

impl WorkshopStepPlan {
    #[must_use]
    pub fn uniform(total: NonZeroU32) -> Self {
        Self {
            totals: WorkshopNumber::all().map(|n| (n, total)).collect(),
        }
    }

    /// Override the total for one workshop.
    #[must_use]
    pub fn with_total(mut self, number: WorkshopNumber, total: NonZeroU32) -> Self {
        self.totals.insert(number, total);
        self
    }

    #[must_use]
    pub fn total_for(&self, number: WorkshopNumber) -> u32 {
        self.totals
            .get(&number)
            .copied()
            .unwrap_or(DEFAULT_STEPS_PER_WORKSHOP)
            .get()
    }
}

/// Append `step` to the workshop's completed steps.
///
/// Idempotent: a step already present yields [`StepOutcome::AlreadyCompleted`]
/// and leaves the workshop untouched. Does not change `status`.
pub fn complete_step(workshop: &mut Workshop, step: impl Into<StepId>) -> StepOutcome {
    complete_step_at(workshop, step, Utc::now())
}

/// [`complete_step`] with an explicit clock.
pub fn complete_step_at(
    workshop: &mut Workshop,
    step: impl Into<StepId>,
    now: DateTime<Utc>,
) -> StepOutcome {
    let step = step.into();
    if workshop.record_step(step.clone()) {
        workshop.updated_at = now;
        tracing::debug!(
            workshop = %workshop.id,
            number = workshop.number.get(),
            step = %step,
            completed = workshop.completed_steps().len(),
            "Workshop step completed"
        );
        StepOutcome::Recorded
    } else {
        tracing::trace!(workshop = %workshop.id, step = %step, "Step already completed");
        StepOutcome::AlreadyCompleted
    }
}

/// Status implied by the number of completed steps.
///
/// `completed` once at least `total_steps` are done, `in_progress` with at
/// least one, `not_started` otherwise.
#[must_use]
pub fn derive_status(workshop: &Workshop, total_steps: u32) -> WorkshopStatus {
    let done = workshop.completed_steps().len();
    if done >= total_steps as usize {
        WorkshopStatus::Completed
    } else if done > 0 {
        WorkshopStatus::InProgress
    } else {
        WorkshopStatus::NotStarted
    }
}

/// Write the derived status back onto the workshop.
///
/// Never regresses: if the derived status would move backwards (only possible
/// when the caller lowered its expectations about the total, or the UI
/// overwrote the status), the current status is kept.
pub fn apply_derived_status(workshop: &mut Workshop, total_steps: u32) -> StatusChange {
    apply_derived_status_at(workshop, total_steps, Utc::now())
}

/// [`apply_derived_status`] with an explicit clock.
pub fn apply_derived_status_at(
    workshop: &mut Workshop,
    total_steps: u32,
    now: DateTime<Utc>,
) -> StatusChange {
    let current = workshop.status;
    let derived = derive_status(workshop, total_steps);
    if derived == current || !current.can_transition_to(derived) {
        return StatusChange::Unchanged(current);
    }
    workshop.status = derived;
    workshop.updated_at = now;
    tracing::debug!(
        workshop = %workshop.id,
        number = workshop.number.get(),
        from = current.as_str(),
        to = derived.as_str(),
        "Workshop status changed"
    );
    StatusChange::Changed {
        from: current,
        to: derived,
    }
}
