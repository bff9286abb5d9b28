//! Core EBIOS RM logic.
//!
//! Risk scoring, the workshop state machine, change notification, entity
//! factories, compliance tracking, and attack-path enrichment. Everything here
//! is synchronous and free of IO; persistence and presentation belong to the
//! caller.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

pub mod compliance;
pub mod enrichment;
pub mod events;
pub mod factory;
pub mod risk;
pub mod workflow;

pub use compliance::{ComplianceError, ComplianceGapTracker, completion_percentage, measure_coverage};
pub use enrichment::{
    AttackPathEnricher, EnrichmentContractError, HeuristicEnricher, check_enrichment_contract,
    enriched_level,
};
pub use events::{
    DEFAULT_HISTORY_CAPACITY, DeliveryRecord, FailureKind, NotifyReport, ObserverError,
    ObserverFailure, SubscriptionId, WorkshopEventBus, WorkshopObserver,
};
pub use factory::{
    AttackPathDraft, AttackPathFactory, BusinessValueDraft, BusinessValueFactory,
    DreadedEventDraft, GapDraft, MissionDraft, MissionFactory, SecurityBaselineFactory,
    WorkshopFactory,
};
pub use risk::{DreadedEventAssessment, RiskAssessment, RiskError, RiskEvaluator, RiskStrategy};
pub use workflow::{
    DEFAULT_STEPS_PER_WORKSHOP, StatusChange, StepOutcome, WorkshopStepPlan, apply_derived_status,
    apply_derived_status_at, complete_step, complete_step_at, derive_status,
};
