//! Core domain types for EBIOS RM risk assessment.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Bounded values (ratings, workshop numbers, priorities, percentages) are
//! validated newtypes, so holding one is proof that it is in range.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod assessment;
mod bounded;
mod ids;
mod mission;
mod proofs;
mod security;
mod workshop;

pub use assessment::{
    AttackPath, AttackPathEnrichment, BusinessValue, BusinessValueCategory, DreadedEvent,
    RiskLevel,
};
pub use bounded::BoundedBuffer;
pub use ids::{
    AttackPathId, BaselineGapId, BaselineId, BusinessValueId, DreadedEventId, MeasureId,
    MissionId, StepId, UserId, WorkshopId,
};
pub use mission::{
    AnalysisScope, ComplianceGap, ComplianceStatus, EbiosCompliance, Mission, MissionStatus,
    OrganizationContext, OrganizationSize, TimeFrame,
};
pub use proofs::{
    EmptyStringError, GapPriority, NonEmptyString, Percentage, Rating, ValidationError,
    WorkshopNumber,
};
pub use security::{BaselineGap, SecurityBaseline, SecurityMeasure};
pub use workshop::{Workshop, WorkshopStatus};
