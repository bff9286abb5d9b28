//! Compliance gap tracking on a mission.
//!
//! All percentage bookkeeping lives in [`EbiosCompliance`]; the tracker adds
//! mission-level concerns (the `updatedAt` bump, lookups by workshop, logging)
//! on top of it.

use chrono::{DateTime, Utc};
use thiserror::Error;

use ebios_types::{
    ComplianceGap, ComplianceStatus, EbiosCompliance, Mission, MissionId, Percentage,
    SecurityMeasure, Workshop, WorkshopNumber, WorkshopStatus,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComplianceError {
    #[error("mission {mission} has no compliance gap for workshop {workshop}")]
    UnknownWorkshop {
        mission: MissionId,
        workshop: WorkshopNumber,
    },
}

/// Share of gaps whose current status meets the required status.
#[must_use]
pub fn completion_percentage(gaps: &[ComplianceGap]) -> Percentage {
    let closed = gaps.iter().filter(|gap| gap.is_closed()).count();
    Percentage::from_ratio(closed, gaps.len())
}

/// Weighted conformity of a set of measures: compliant counts fully, partial
/// counts half. No measures means nothing is covered.
#[must_use]
pub fn measure_coverage(measures: &[SecurityMeasure]) -> Percentage {
    if measures.is_empty() {
        return Percentage::ZERO;
    }
    let weight: f64 = measures.iter().map(|m| m.status.weight()).sum();
    let ratio = weight / measures.len() as f64;
    Percentage::new(ratio * 100.0).unwrap_or(Percentage::ZERO)
}

/// Mutating view over a mission's compliance record.
pub struct ComplianceGapTracker<'a> {
    mission: &'a mut Mission,
}

impl<'a> ComplianceGapTracker<'a> {
    pub fn new(mission: &'a mut Mission) -> Self {
        Self { mission }
    }

    fn compliance(&self) -> &EbiosCompliance {
        &self.mission.ebios_compliance
    }

    #[must_use]
    pub fn completion_percentage(&self) -> Percentage {
        self.compliance().completion_percentage()
    }

    fn require_workshop(&self, workshop: WorkshopNumber) -> Result<(), ComplianceError> {
        if self.compliance().has_gaps_for(workshop) {
            Ok(())
        } else {
            Err(ComplianceError::UnknownWorkshop {
                mission: self.mission.id.clone(),
                workshop,
            })
        }
    }

    fn touched(&mut self, now: DateTime<Utc>) {
        self.mission.updated_at = now;
        tracing::debug!(
            mission = %self.mission.id,
            completion = self.completion_percentage().value(),
            "Compliance recomputed"
        );
    }

    /// Set the current status of every gap for `workshop`. Returns the number
    /// of gaps updated.
    pub fn set_status(
        &mut self,
        workshop: WorkshopNumber,
        status: ComplianceStatus,
    ) -> Result<usize, ComplianceError> {
        self.set_status_at(workshop, status, Utc::now())
    }

    pub fn set_status_at(
        &mut self,
        workshop: WorkshopNumber,
        status: ComplianceStatus,
        now: DateTime<Utc>,
    ) -> Result<usize, ComplianceError> {
        self.require_workshop(workshop)?;
        let matched = self
            .mission
            .ebios_compliance
            .set_workshop_status(workshop, status);
        self.touched(now);
        Ok(matched)
    }

    /// Bring every gap of `workshop` to its required status.
    pub fn close_workshop_gaps(&mut self, workshop: WorkshopNumber) -> Result<usize, ComplianceError> {
        self.close_workshop_gaps_at(workshop, Utc::now())
    }

    pub fn close_workshop_gaps_at(
        &mut self,
        workshop: WorkshopNumber,
        now: DateTime<Utc>,
    ) -> Result<usize, ComplianceError> {
        self.require_workshop(workshop)?;
        let matched = self.mission.ebios_compliance.close_workshop(workshop);
        self.touched(now);
        Ok(matched)
    }

    pub fn record_gap(&mut self, gap: ComplianceGap) {
        self.record_gap_at(gap, Utc::now());
    }

    pub fn record_gap_at(&mut self, gap: ComplianceGap, now: DateTime<Utc>) {
        tracing::debug!(
            mission = %self.mission.id,
            workshop = gap.workshop.get(),
            priority = gap.priority.get(),
            "Compliance gap recorded"
        );
        self.mission.ebios_compliance.push_gap(gap);
        self.touched(now);
    }

    /// Gaps still below their required status, highest priority first, then
    /// by workshop number.
    #[must_use]
    pub fn open_gaps(&self) -> Vec<&ComplianceGap> {
        let mut open: Vec<&ComplianceGap> = self
            .compliance()
            .gaps()
            .iter()
            .filter(|gap| !gap.is_closed())
            .collect();
        open.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.workshop.cmp(&b.workshop))
        });
        open
    }

    /// Close the gaps of a completed workshop. Returns the number of gaps
    /// closed; workshops that are not completed, or have no gaps, change
    /// nothing.
    pub fn sync_with_workshop(&mut self, workshop: &Workshop) -> usize {
        self.sync_with_workshop_at(workshop, Utc::now())
    }

    pub fn sync_with_workshop_at(&mut self, workshop: &Workshop, now: DateTime<Utc>) -> usize {
        if workshop.status != WorkshopStatus::Completed
            || !self.compliance().has_gaps_for(workshop.number)
        {
            return 0;
        }
        let already_closed = self
            .compliance()
            .gaps()
            .iter()
            .filter(|gap| gap.workshop == workshop.number)
            .all(ComplianceGap::is_closed);
        if already_closed {
            return 0;
        }
        let closed = self.mission.ebios_compliance.close_workshop(workshop.number);
        self.touched(now);
        closed
    }
}
