//! Mission creation, persistence round-trips, and compliance bookkeeping.

use ebios_core::{
    ComplianceError, ComplianceGapTracker, GapDraft, MissionDraft, MissionFactory,
};
use ebios_types::{ComplianceStatus, Mission, MissionStatus, Percentage, WorkshopNumber};

use crate::common::{at, default_mission};

#[test]
fn default_mission_matches_template() {
    let mission = default_mission();

    assert_eq!(mission.status, MissionStatus::Draft);
    assert_eq!(mission.organization_context.sector, "Financial services");
    assert_eq!(
        mission.organization_context.regulatory_requirements,
        vec!["GDPR", "DORA", "PCI DSS"]
    );
    assert_eq!(
        mission.scope.geographical_scope,
        vec!["France", "European Union"]
    );
    assert!(mission.scope.time_frame.end() > mission.scope.time_frame.start());

    let gaps = mission.ebios_compliance.gaps();
    assert_eq!(gaps.len(), 3);
    let layout: Vec<(u8, u8)> = gaps
        .iter()
        .map(|g| (g.workshop.get(), g.priority.get()))
        .collect();
    assert_eq!(layout, vec![(2, 3), (3, 4), (5, 3)]);
    assert!(gaps.iter().all(|g| {
        g.current_status == ComplianceStatus::PartiallyCompliant
            && g.required_status == ComplianceStatus::Compliant
    }));
}

#[test]
fn explicit_clock_drives_dates() {
    let now = at("2030-01-01T00:00:00Z");
    let mission = MissionFactory::create_at(&MissionDraft::default(), now).unwrap();
    assert_eq!(mission.created_at, now);
    assert_eq!(mission.updated_at, now);
    assert_eq!(mission.due_date, at("2030-04-01T00:00:00Z"));
    assert_eq!(mission.scope.time_frame.start(), now);
    assert_eq!(mission.scope.time_frame.end(), at("2031-01-01T00:00:00Z"));
}

#[test]
fn mission_round_trips_through_json() {
    let mission = default_mission();
    let json = serde_json::to_string(&mission).unwrap();
    let back: Mission = serde_json::from_str(&json).unwrap();
    assert_eq!(back, mission);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["status"], "draft");
    assert_eq!(value["organizationContext"]["size"], "large");
    assert_eq!(value["ebiosCompliance"]["version"], "1.5");
    assert_eq!(value["ebiosCompliance"]["completionPercentage"], 0.0);
    assert_eq!(
        value["ebiosCompliance"]["complianceGaps"][1]["currentStatus"],
        "partially_compliant"
    );
}

#[test]
fn loaded_percentage_is_recomputed() {
    let mut value = serde_json::to_value(default_mission()).unwrap();
    value["ebiosCompliance"]["completionPercentage"] = serde_json::json!(90);
    let mission: Mission = serde_json::from_value(value).unwrap();
    assert_eq!(
        mission.ebios_compliance.completion_percentage(),
        Percentage::ZERO
    );
}

#[test]
fn draft_from_json_with_custom_gaps() {
    let draft: MissionDraft = serde_json::from_str(
        r#"{
            "name": "Hospital information system",
            "complianceGaps": [
                {
                    "workshop": 1,
                    "requirement": "Define the study framework",
                    "currentStatus": "compliant",
                    "requiredStatus": "compliant",
                    "priority": 2
                },
                {
                    "workshop": 4,
                    "requirement": "Build operational scenarios",
                    "currentStatus": "non_compliant",
                    "requiredStatus": "compliant",
                    "priority": 5
                }
            ]
        }"#,
    )
    .unwrap();
    let mission = MissionFactory::create(&draft).unwrap();
    assert_eq!(mission.name.as_str(), "Hospital information system");
    assert_eq!(mission.ebios_compliance.completion_percentage().value(), 50.0);
    // The template context still applies.
    assert_eq!(mission.organization_context.sector, "Financial services");
}

#[test]
fn gap_draft_with_bad_priority_fails() {
    let draft = MissionDraft {
        compliance_gaps: Some(vec![GapDraft {
            workshop: 2,
            requirement: "Map risk sources".to_owned(),
            current_status: ComplianceStatus::NonCompliant,
            required_status: ComplianceStatus::Compliant,
            priority: 6,
        }]),
        ..MissionDraft::default()
    };
    let err = MissionFactory::create(&draft).unwrap_err();
    assert_eq!(err.to_string(), "priority must be between 1 and 5, got 6");
}

#[test]
fn tracker_reports_unknown_workshop() {
    let mut mission = default_mission();
    let workshop = WorkshopNumber::new(4).unwrap();
    let err = ComplianceGapTracker::new(&mut mission)
        .close_workshop_gaps(workshop)
        .unwrap_err();
    assert_eq!(
        err,
        ComplianceError::UnknownWorkshop {
            mission: mission.id.clone(),
            workshop,
        }
    );
}
