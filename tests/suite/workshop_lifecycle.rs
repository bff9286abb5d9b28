//! Workshop progression from creation to completion, with observers and
//! compliance tracking wired the way a session would wire them.

use std::sync::{Arc, Mutex};

use ebios_core::{
    ComplianceGapTracker, ObserverError, StatusChange, StepOutcome, WorkshopEventBus,
    WorkshopFactory, WorkshopStepPlan, apply_derived_status, complete_step, complete_step_at,
    derive_status,
};
use ebios_types::{Percentage, Workshop, WorkshopStatus};

use crate::common::{MISSION_ID, at, default_mission};

#[test]
fn five_steps_complete_workshop_three() {
    let mut workshop = WorkshopFactory::create(MISSION_ID, 3).unwrap();
    assert_eq!(workshop.mission_id.as_str(), MISSION_ID);
    assert_eq!(workshop.number.get(), 3);
    assert_eq!(workshop.status, WorkshopStatus::NotStarted);
    assert!(workshop.completed_steps().is_empty());

    for step in ["s1", "s2", "s3", "s4", "s5"] {
        assert_eq!(complete_step(&mut workshop, step), StepOutcome::Recorded);
    }

    assert_eq!(derive_status(&workshop, 5), WorkshopStatus::Completed);
    // Deriving does not write the status back.
    assert_eq!(workshop.status, WorkshopStatus::NotStarted);
}

#[test]
fn serialized_workshop_uses_wire_names() {
    let mut workshop = WorkshopFactory::create(MISSION_ID, 2).unwrap();
    complete_step(&mut workshop, "identify-risk-sources");

    let json = serde_json::to_value(&workshop).unwrap();
    assert_eq!(json["missionId"], MISSION_ID);
    assert_eq!(json["number"], 2);
    assert_eq!(json["status"], "not_started");
    assert_eq!(json["completedSteps"][0], "identify-risk-sources");

    let back: Workshop = serde_json::from_value(json).unwrap();
    assert_eq!(back, workshop);
}

#[test]
fn out_of_range_workshop_number_is_rejected_on_load() {
    let mut json = serde_json::to_value(WorkshopFactory::create(MISSION_ID, 1).unwrap()).unwrap();
    json["number"] = serde_json::json!(7);
    assert!(serde_json::from_value::<Workshop>(json).is_err());
}

#[test]
fn repeated_step_on_load_cannot_complete_a_workshop() {
    let mut workshop = WorkshopFactory::create(MISSION_ID, 2).unwrap();
    complete_step(&mut workshop, "a");
    let mut json = serde_json::to_value(&workshop).unwrap();

    json["completedSteps"] = serde_json::json!(["a", "a"]);
    assert!(serde_json::from_value::<Workshop>(json.clone()).is_err());

    json["completedSteps"] = serde_json::json!(["a"]);
    let loaded: Workshop = serde_json::from_value(json).unwrap();
    assert_eq!(derive_status(&loaded, 2), WorkshopStatus::InProgress);
}

#[test]
fn observers_follow_each_status_change() {
    let seen: Arc<Mutex<Vec<WorkshopStatus>>> = Arc::default();
    let mut bus = WorkshopEventBus::new();
    let sink = Arc::clone(&seen);
    bus.subscribe(move |snapshot: Workshop| -> Result<(), ObserverError> {
        sink.lock().unwrap().push(snapshot.status);
        Ok(())
    });

    let plan = WorkshopStepPlan::default();
    let mut workshop = WorkshopFactory::create(MISSION_ID, 1).unwrap();
    let total = plan.total_for(workshop.number);

    for step in ["a", "b", "c", "d", "e"] {
        complete_step(&mut workshop, step);
        if let StatusChange::Changed { .. } = apply_derived_status(&mut workshop, total) {
            assert!(bus.notify(&workshop).is_clean());
        }
    }

    assert_eq!(
        *seen.lock().unwrap(),
        vec![WorkshopStatus::InProgress, WorkshopStatus::Completed]
    );
    assert_eq!(bus.history().len(), 2);
}

#[test]
fn completed_workshops_close_mission_gaps() {
    let mut mission = default_mission();
    let plan = WorkshopStepPlan::default();
    let mut workshops = WorkshopFactory::create_all(&mission.id);

    for workshop in &mut workshops {
        let total = plan.total_for(workshop.number);
        for i in 0..total {
            complete_step(workshop, format!("step-{i}"));
        }
        apply_derived_status(workshop, total);
        assert_eq!(workshop.status, WorkshopStatus::Completed);

        ComplianceGapTracker::new(&mut mission).sync_with_workshop(workshop);
    }

    assert_eq!(
        mission.ebios_compliance.completion_percentage(),
        Percentage::FULL
    );
    assert!(ComplianceGapTracker::new(&mut mission).open_gaps().is_empty());
}

#[test]
fn partial_progress_leaves_gaps_open() {
    let mut mission = default_mission();
    let mut workshop = WorkshopFactory::create(mission.id.clone(), 2).unwrap();
    complete_step_at(&mut workshop, "a", at("2030-03-01T09:00:00Z"));
    apply_derived_status(&mut workshop, 5);
    assert_eq!(workshop.status, WorkshopStatus::InProgress);

    let mut tracker = ComplianceGapTracker::new(&mut mission);
    assert_eq!(tracker.sync_with_workshop(&workshop), 0);
    let open: Vec<u8> = tracker.open_gaps().iter().map(|g| g.workshop.get()).collect();
    assert_eq!(open, vec![3, 2, 5]);
}
