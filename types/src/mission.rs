//! Mission aggregate: organization context, scope, and compliance tracking.
//!
//! A mission exclusively owns its compliance gaps. The completion percentage
//! is a derived value owned by [`EbiosCompliance`]: every mutation of the gap
//! list goes through it and recomputes the percentage, and deserialization
//! recomputes it from the loaded gaps instead of trusting the stored number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{MissionId, UserId};
use crate::proofs::{GapPriority, NonEmptyString, Percentage, ValidationError, WorkshopNumber};

// ── Statuses ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    #[default]
    Draft,
    InProgress,
    Completed,
}

/// Conformity of a requirement, a baseline, or a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    PartiallyCompliant,
    NonCompliant,
}

impl ComplianceStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::PartiallyCompliant => "partially_compliant",
            Self::NonCompliant => "non_compliant",
        }
    }

    /// Weight used when aggregating conformity (compliant = 1, partial = 0.5).
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::Compliant => 1.0,
            Self::PartiallyCompliant => 0.5,
            Self::NonCompliant => 0.0,
        }
    }
}

// ── Value objects ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationSize {
    Small,
    Medium,
    Large,
    VeryLarge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationContext {
    pub sector: String,
    pub size: OrganizationSize,
    #[serde(default)]
    pub regulatory_requirements: Vec<String>,
    #[serde(default)]
    pub security_objectives: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
}

impl OrganizationContext {
    /// Whether the context carries no usable information.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sector.trim().is_empty()
            && self.regulatory_requirements.is_empty()
            && self.security_objectives.is_empty()
            && self.constraints.is_empty()
    }
}

/// Analysis period. Invariant: `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TimeFrameWire")]
pub struct TimeFrame {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct TimeFrameWire {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<TimeFrameWire> for TimeFrame {
    type Error = ValidationError;

    fn try_from(wire: TimeFrameWire) -> Result<Self, Self::Error> {
        Self::new(wire.start, wire.end)
    }
}

impl TimeFrame {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvertedTimeFrame {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisScope {
    pub boundaries: String,
    #[serde(default)]
    pub inclusions: Vec<String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    pub time_frame: TimeFrame,
    #[serde(default)]
    pub geographical_scope: Vec<String>,
}

impl AnalysisScope {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boundaries.trim().is_empty()
            && self.inclusions.is_empty()
            && self.exclusions.is_empty()
            && self.geographical_scope.is_empty()
    }
}

// ── Compliance ───────────────────────────────────────────────

/// A tracked discrepancy between current and required status for one
/// workshop's methodology requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceGap {
    pub workshop: WorkshopNumber,
    pub requirement: NonEmptyString,
    pub current_status: ComplianceStatus,
    pub required_status: ComplianceStatus,
    pub priority: GapPriority,
}

impl ComplianceGap {
    /// A gap is closed once its current status equals the required one.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.current_status == self.required_status
    }
}

/// EBIOS RM conformity record of a mission.
///
/// Gaps are append-only: they can change status but are never removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "EbiosComplianceWire")]
pub struct EbiosCompliance {
    version: String,
    completion_percentage: Percentage,
    last_validation_date: Option<DateTime<Utc>>,
    compliance_gaps: Vec<ComplianceGap>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EbiosComplianceWire {
    version: String,
    // Stored value is ignored; the percentage is always re-derived.
    #[serde(default)]
    #[allow(dead_code)]
    completion_percentage: Option<f64>,
    #[serde(default)]
    last_validation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    compliance_gaps: Vec<ComplianceGap>,
}

impl From<EbiosComplianceWire> for EbiosCompliance {
    fn from(wire: EbiosComplianceWire) -> Self {
        let mut compliance = Self::new(wire.version, wire.compliance_gaps);
        compliance.last_validation_date = wire.last_validation_date;
        compliance
    }
}

impl EbiosCompliance {
    #[must_use]
    pub fn new(version: impl Into<String>, gaps: Vec<ComplianceGap>) -> Self {
        let mut compliance = Self {
            version: version.into(),
            completion_percentage: Percentage::ZERO,
            last_validation_date: None,
            compliance_gaps: gaps,
        };
        compliance.recompute();
        compliance
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn completion_percentage(&self) -> Percentage {
        self.completion_percentage
    }

    #[must_use]
    pub fn last_validation_date(&self) -> Option<DateTime<Utc>> {
        self.last_validation_date
    }

    #[must_use]
    pub fn gaps(&self) -> &[ComplianceGap] {
        &self.compliance_gaps
    }

    #[must_use]
    pub fn has_gaps_for(&self, workshop: WorkshopNumber) -> bool {
        self.compliance_gaps.iter().any(|gap| gap.workshop == workshop)
    }

    pub fn push_gap(&mut self, gap: ComplianceGap) {
        self.compliance_gaps.push(gap);
        self.recompute();
    }

    /// Set the current status of every gap attached to `workshop`.
    ///
    /// Returns how many gaps matched.
    pub fn set_workshop_status(&mut self, workshop: WorkshopNumber, status: ComplianceStatus) -> usize {
        let mut matched = 0;
        for gap in self
            .compliance_gaps
            .iter_mut()
            .filter(|gap| gap.workshop == workshop)
        {
            gap.current_status = status;
            matched += 1;
        }
        if matched > 0 {
            self.recompute();
        }
        matched
    }

    /// Set every gap of `workshop` to its required status. Returns how many
    /// gaps matched.
    pub fn close_workshop(&mut self, workshop: WorkshopNumber) -> usize {
        let mut matched = 0;
        for gap in self
            .compliance_gaps
            .iter_mut()
            .filter(|gap| gap.workshop == workshop)
        {
            gap.current_status = gap.required_status;
            matched += 1;
        }
        if matched > 0 {
            self.recompute();
        }
        matched
    }

    pub fn mark_validated(&mut self, at: DateTime<Utc>) {
        self.last_validation_date = Some(at);
    }

    fn recompute(&mut self) {
        let closed = self
            .compliance_gaps
            .iter()
            .filter(|gap| gap.is_closed())
            .count();
        self.completion_percentage = Percentage::from_ratio(closed, self.compliance_gaps.len());
    }
}

// ── Mission ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: MissionId,
    pub name: NonEmptyString,
    #[serde(default)]
    pub description: String,
    pub status: MissionStatus,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub assigned_to: Vec<UserId>,
    pub organization_context: OrganizationContext,
    pub scope: AnalysisScope,
    pub ebios_compliance: EbiosCompliance,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
