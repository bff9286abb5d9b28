//! Security baselines, measures, and baseline gaps.

use serde::{Deserialize, Serialize};

use crate::ids::{BaselineGapId, BaselineId, MeasureId, MissionId};
use crate::mission::ComplianceStatus;
use crate::proofs::{GapPriority, NonEmptyString};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityBaseline {
    pub id: BaselineId,
    pub mission_id: MissionId,
    pub name: NonEmptyString,
    #[serde(default)]
    pub description: String,
    pub status: ComplianceStatus,
}

/// A security measure, optionally attached to the baseline it implements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityMeasure {
    pub id: MeasureId,
    pub mission_id: MissionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_id: Option<BaselineId>,
    pub name: NonEmptyString,
    #[serde(default)]
    pub description: String,
    pub status: ComplianceStatus,
}

/// A gap found against a baseline, linked by `baseline_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineGap {
    pub id: BaselineGapId,
    pub baseline_id: BaselineId,
    pub description: NonEmptyString,
    pub priority: GapPriority,
    pub status: ComplianceStatus,
}
