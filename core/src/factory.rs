//! Entity factories.
//!
//! Factories turn partial author input into fully-populated entities. Every
//! omitted field gets a documented default, every call assigns a fresh UUID
//! and current timestamps, and inputs are borrowed so they are never mutated.
//! Raw numeric ratings are validated here and rejected with a descriptive
//! [`ValidationError`].

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use ebios_types::{
    AnalysisScope, AttackPath, AttackPathId, BaselineGap, BaselineGapId, BaselineId,
    BusinessValue, BusinessValueCategory, BusinessValueId, ComplianceGap, ComplianceStatus,
    DreadedEvent, DreadedEventId, EbiosCompliance, GapPriority, MeasureId, Mission, MissionId,
    MissionStatus, NonEmptyString, OrganizationContext, OrganizationSize, Rating,
    SecurityBaseline, SecurityMeasure, TimeFrame, UserId, ValidationError, Workshop, WorkshopId,
    WorkshopNumber,
};

pub const DEFAULT_MISSION_NAME: &str = "New EBIOS RM mission";
pub const EBIOS_VERSION: &str = "1.5";
/// Days between creation and the default due date.
pub const DEFAULT_DUE_IN_DAYS: i64 = 90;
/// Length of the default analysis time frame.
pub const DEFAULT_TIME_FRAME_DAYS: i64 = 365;

/// Seeded gaps: (workshop, priority, requirement).
const DEFAULT_GAPS: [(u8, u8, &str); 3] = [
    (
        2,
        3,
        "Identify and characterize risk sources and their target objectives",
    ),
    (
        3,
        4,
        "Build strategic scenarios and map the stakeholder ecosystem",
    ),
    (
        5,
        3,
        "Define the risk treatment strategy and residual risk acceptance",
    ),
];

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

fn non_empty(value: &str, field: &'static str) -> Result<NonEmptyString, ValidationError> {
    NonEmptyString::new(value).map_err(|_| ValidationError::Empty { field })
}

fn rating(value: u8, field: &'static str) -> Result<Rating, ValidationError> {
    Rating::new(value).map_err(|err| err.for_field(field))
}

// ── Canonical template ───────────────────────────────────────

/// Organization context of the canonical generic financial-services template.
#[must_use]
pub fn default_organization_context() -> OrganizationContext {
    OrganizationContext {
        sector: "Financial services".to_owned(),
        size: OrganizationSize::Large,
        regulatory_requirements: to_strings(&["GDPR", "DORA", "PCI DSS"]),
        security_objectives: to_strings(&[
            "Protect customer financial data confidentiality",
            "Guarantee integrity of transactions",
            "Ensure availability of payment services",
        ]),
        constraints: to_strings(&[
            "Regulatory reporting deadlines",
            "Legacy core banking systems",
        ]),
    }
}

/// Analysis scope of the canonical template, starting at `now` for one year.
pub fn default_scope(now: DateTime<Utc>) -> Result<AnalysisScope, ValidationError> {
    let end = now + Duration::days(DEFAULT_TIME_FRAME_DAYS);
    Ok(AnalysisScope {
        boundaries: "Information system supporting retail banking and payment services"
            .to_owned(),
        inclusions: to_strings(&[
            "Online banking platform",
            "Payment processing",
            "Customer data management",
        ]),
        exclusions: to_strings(&["Physical branch security"]),
        time_frame: TimeFrame::new(now, end)?,
        geographical_scope: to_strings(&["France", "European Union"]),
    })
}

/// The three seeded gaps: workshops 2, 3, 5 with priorities 3, 4, 3.
pub fn default_compliance_gaps() -> Result<Vec<ComplianceGap>, ValidationError> {
    seeded_gaps(&DEFAULT_GAPS)
}

/// Partially compliant gaps that must become compliant, one per row.
fn seeded_gaps(rows: &[(u8, u8, &str)]) -> Result<Vec<ComplianceGap>, ValidationError> {
    rows.iter()
        .map(|&(workshop, priority, requirement)| {
            GapDraft {
                workshop,
                requirement: requirement.to_owned(),
                current_status: ComplianceStatus::PartiallyCompliant,
                required_status: ComplianceStatus::Compliant,
                priority,
            }
            .validate()
        })
        .collect()
}

// ── Mission ──────────────────────────────────────────────────

/// Author-supplied gap with unvalidated numbers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapDraft {
    pub workshop: u8,
    pub requirement: String,
    pub current_status: ComplianceStatus,
    pub required_status: ComplianceStatus,
    pub priority: u8,
}

impl GapDraft {
    pub fn validate(&self) -> Result<ComplianceGap, ValidationError> {
        Ok(ComplianceGap {
            workshop: WorkshopNumber::new(self.workshop)?,
            requirement: non_empty(&self.requirement, "requirement")?,
            current_status: self.current_status,
            required_status: self.required_status,
            priority: GapPriority::new(self.priority)?,
        })
    }
}

/// Partial mission input. Every `None` is filled with the template default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MissionDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<MissionStatus>,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Vec<UserId>>,
    pub organization_context: Option<OrganizationContext>,
    pub scope: Option<AnalysisScope>,
    pub compliance_gaps: Option<Vec<GapDraft>>,
}

pub struct MissionFactory;

impl MissionFactory {
    pub fn create(draft: &MissionDraft) -> Result<Mission, ValidationError> {
        Self::create_at(draft, Utc::now())
    }

    /// [`MissionFactory::create`] with an explicit clock.
    pub fn create_at(draft: &MissionDraft, now: DateTime<Utc>) -> Result<Mission, ValidationError> {
        let name = match draft.name.as_deref() {
            Some(name) => non_empty(name, "mission name")?,
            None => non_empty(DEFAULT_MISSION_NAME, "mission name")?,
        };
        let gaps = match &draft.compliance_gaps {
            Some(gaps) => gaps
                .iter()
                .map(GapDraft::validate)
                .collect::<Result<Vec<_>, _>>()?,
            None => default_compliance_gaps()?,
        };

        let mission = Mission {
            id: MissionId::new(new_id()),
            name,
            description: draft.description.clone().unwrap_or_default(),
            status: draft.status.unwrap_or_default(),
            due_date: draft
                .due_date
                .unwrap_or_else(|| now + Duration::days(DEFAULT_DUE_IN_DAYS)),
            assigned_to: draft.assigned_to.clone().unwrap_or_default(),
            organization_context: draft
                .organization_context
                .clone()
                .unwrap_or_else(default_organization_context),
            scope: match &draft.scope {
                Some(scope) => scope.clone(),
                None => default_scope(now)?,
            },
            ebios_compliance: EbiosCompliance::new(EBIOS_VERSION, gaps),
            created_at: now,
            updated_at: now,
        };

        tracing::debug!(
            mission = %mission.id,
            gaps = mission.ebios_compliance.gaps().len(),
            "Mission created"
        );
        Ok(mission)
    }
}

// ── Workshop ─────────────────────────────────────────────────

pub struct WorkshopFactory;

impl WorkshopFactory {
    /// A not-started workshop with no completed steps.
    pub fn create(mission_id: impl Into<MissionId>, number: u8) -> Result<Workshop, ValidationError> {
        Self::create_at(mission_id, number, Utc::now())
    }

    pub fn create_at(
        mission_id: impl Into<MissionId>,
        number: u8,
        now: DateTime<Utc>,
    ) -> Result<Workshop, ValidationError> {
        let number = WorkshopNumber::new(number)?;
        Ok(Workshop::new(
            WorkshopId::new(new_id()),
            mission_id.into(),
            number,
            now,
        ))
    }

    /// The five workshops of a mission, in methodology order.
    #[must_use]
    pub fn create_all(mission_id: &MissionId) -> Vec<Workshop> {
        let now = Utc::now();
        WorkshopNumber::all()
            .map(|number| Workshop::new(WorkshopId::new(new_id()), mission_id.clone(), number, now))
            .collect()
    }
}

// ── Business values ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreadedEventDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub impact: u8,
    pub likelihood: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessValueDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: BusinessValueCategory,
    #[serde(default)]
    pub supporting_assets: Vec<String>,
    #[serde(default)]
    pub dreaded_events: Vec<DreadedEventDraft>,
}

pub struct BusinessValueFactory;

impl BusinessValueFactory {
    pub fn create(
        mission_id: &MissionId,
        draft: &BusinessValueDraft,
    ) -> Result<BusinessValue, ValidationError> {
        let dreaded_events = draft
            .dreaded_events
            .iter()
            .map(|event| {
                Ok(DreadedEvent {
                    id: DreadedEventId::new(new_id()),
                    name: non_empty(&event.name, "dreaded event name")?,
                    description: event.description.clone(),
                    impact: rating(event.impact, "impact")?,
                    likelihood: rating(event.likelihood, "likelihood")?,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(BusinessValue {
            id: BusinessValueId::new(new_id()),
            mission_id: mission_id.clone(),
            name: non_empty(&draft.name, "business value name")?,
            description: draft.description.clone(),
            category: draft.category,
            supporting_assets: draft.supporting_assets.clone(),
            dreaded_events,
        })
    }
}

// ── Attack paths ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackPathDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub difficulty: u8,
    pub success_probability: u8,
}

pub struct AttackPathFactory;

impl AttackPathFactory {
    /// An unenriched attack path.
    pub fn create(
        mission_id: &MissionId,
        draft: &AttackPathDraft,
    ) -> Result<AttackPath, ValidationError> {
        Ok(AttackPath {
            id: AttackPathId::new(new_id()),
            mission_id: mission_id.clone(),
            name: non_empty(&draft.name, "attack path name")?,
            description: draft.description.clone(),
            difficulty: rating(draft.difficulty, "difficulty")?,
            success_probability: rating(draft.success_probability, "success probability")?,
            enrichment: None,
        })
    }
}

// ── Security baselines ───────────────────────────────────────

pub struct SecurityBaselineFactory;

impl SecurityBaselineFactory {
    pub fn create_baseline(
        mission_id: &MissionId,
        name: &str,
        description: &str,
        status: ComplianceStatus,
    ) -> Result<SecurityBaseline, ValidationError> {
        Ok(SecurityBaseline {
            id: BaselineId::new(new_id()),
            mission_id: mission_id.clone(),
            name: non_empty(name, "baseline name")?,
            description: description.to_owned(),
            status,
        })
    }

    pub fn create_measure(
        baseline: &SecurityBaseline,
        name: &str,
        description: &str,
        status: ComplianceStatus,
    ) -> Result<SecurityMeasure, ValidationError> {
        Ok(SecurityMeasure {
            id: MeasureId::new(new_id()),
            mission_id: baseline.mission_id.clone(),
            baseline_id: Some(baseline.id.clone()),
            name: non_empty(name, "measure name")?,
            description: description.to_owned(),
            status,
        })
    }

    pub fn create_gap(
        baseline: &SecurityBaseline,
        description: &str,
        priority: u8,
    ) -> Result<BaselineGap, ValidationError> {
        Ok(BaselineGap {
            id: BaselineGapId::new(new_id()),
            baseline_id: baseline.id.clone(),
            description: non_empty(description, "gap description")?,
            priority: GapPriority::new(priority)?,
            status: ComplianceStatus::NonCompliant,
        })
    }
}
