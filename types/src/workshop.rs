//! Workshop entity: one of the five EBIOS RM workshops of a mission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{MissionId, StepId, WorkshopId};
use crate::proofs::{ValidationError, WorkshopNumber};

/// Linear workshop lifecycle: `not_started -> in_progress -> completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkshopStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl WorkshopStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    const fn rank(self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
        }
    }

    /// Forward-only transitions. Staying in place is allowed; going back is not.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        next.rank() >= self.rank()
    }
}

impl std::fmt::Display for WorkshopStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A workshop instance.
///
/// `mission_id` is a non-owning back-reference. `completed_steps` is
/// append-only and never holds duplicates; it is only reachable mutably
/// through [`Workshop::record_step`]. `status` stays public: the UI may
/// overwrite it directly, and the core does not forbid that.
///
/// Loading a record that lists a step twice fails with
/// [`ValidationError::DuplicateStep`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "WorkshopWire")]
pub struct Workshop {
    pub id: WorkshopId,
    pub mission_id: MissionId,
    pub number: WorkshopNumber,
    pub status: WorkshopStatus,
    completed_steps: Vec<StepId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkshopWire {
    id: WorkshopId,
    mission_id: MissionId,
    number: WorkshopNumber,
    status: WorkshopStatus,
    #[serde(default)]
    completed_steps: Vec<StepId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WorkshopWire> for Workshop {
    type Error = ValidationError;

    fn try_from(wire: WorkshopWire) -> Result<Self, Self::Error> {
        let mut workshop = Self::new(wire.id, wire.mission_id, wire.number, wire.created_at);
        for step in wire.completed_steps {
            if workshop.has_completed(&step) {
                return Err(ValidationError::DuplicateStep {
                    step: step.as_str().to_owned(),
                });
            }
            workshop.completed_steps.push(step);
        }
        workshop.status = wire.status;
        workshop.updated_at = wire.updated_at;
        Ok(workshop)
    }
}

impl Workshop {
    /// A fresh, not-started workshop. Callers own the clock.
    #[must_use]
    pub fn new(
        id: WorkshopId,
        mission_id: MissionId,
        number: WorkshopNumber,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            mission_id,
            number,
            status: WorkshopStatus::NotStarted,
            completed_steps: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn completed_steps(&self) -> &[StepId] {
        &self.completed_steps
    }

    #[must_use]
    pub fn has_completed(&self, step: &StepId) -> bool {
        self.completed_steps.contains(step)
    }

    /// Append `step` unless already present. Returns whether it was added.
    pub fn record_step(&mut self, step: StepId) -> bool {
        if self.has_completed(&step) {
            return false;
        }
        self.completed_steps.push(step);
        true
    }
}
