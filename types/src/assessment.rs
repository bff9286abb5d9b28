//! Business values, dreaded events, and attack paths.
//!
//! Business values and attack paths are siblings scoped by `mission_id`;
//! neither owns the other.

use serde::{Deserialize, Serialize};

use crate::ids::{AttackPathId, BusinessValueId, DreadedEventId, MissionId};
use crate::proofs::{NonEmptyString, Rating};

// ── Risk level ───────────────────────────────────────────────

/// Qualitative band of a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    /// Classify a score already normalized to `[0, 1]` over its scale.
    ///
    /// Thresholds sit at quarters of the scale: 0.25 moderate, 0.5 high,
    /// 0.75 critical. Values outside `[0, 1]` clamp to the nearest band.
    #[must_use]
    pub fn from_normalized(normalized: f64) -> Self {
        if normalized >= 0.75 {
            Self::Critical
        } else if normalized >= 0.5 {
            Self::High
        } else if normalized >= 0.25 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

// ── Business value ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessValueCategory {
    Primary,
    Support,
    Management,
    Essential,
}

/// An undesired outcome impacting a business value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreadedEvent {
    pub id: DreadedEventId,
    pub name: NonEmptyString,
    #[serde(default)]
    pub description: String,
    pub impact: Rating,
    pub likelihood: Rating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessValue {
    pub id: BusinessValueId,
    pub mission_id: MissionId,
    pub name: NonEmptyString,
    #[serde(default)]
    pub description: String,
    pub category: BusinessValueCategory,
    #[serde(default)]
    pub supporting_assets: Vec<String>,
    #[serde(default)]
    pub dreaded_events: Vec<DreadedEvent>,
}

// ── Attack path ──────────────────────────────────────────────

/// Fields derived by an enrichment pass. Never authored by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackPathEnrichment {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub path_complexity: f64,
    pub success_likelihood: f64,
    #[serde(default)]
    pub category_tags: Vec<String>,
    #[serde(default)]
    pub suggested_countermeasures: Vec<String>,
}

/// A modeled sequence of adversary actions.
///
/// Everything except `enrichment` is author-supplied and must survive
/// enrichment verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackPath {
    pub id: AttackPathId,
    pub mission_id: MissionId,
    pub name: NonEmptyString,
    #[serde(default)]
    pub description: String,
    pub difficulty: Rating,
    pub success_probability: Rating,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<AttackPathEnrichment>,
}

impl AttackPath {
    /// Copy of this path with enrichment stripped, i.e. the author's record.
    #[must_use]
    pub fn authored(&self) -> Self {
        Self {
            enrichment: None,
            ..self.clone()
        }
    }
}
