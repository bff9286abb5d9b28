//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};

use ebios_core::{MissionDraft, MissionFactory};
use ebios_types::{AttackPath, AttackPathId, Mission, MissionId, NonEmptyString, Rating};

pub const MISSION_ID: &str = "mission-1";

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn default_mission() -> Mission {
    MissionFactory::create(&MissionDraft::default()).unwrap()
}

pub fn attack_path(name: &str, difficulty: u8, success_probability: u8) -> AttackPath {
    AttackPath {
        id: AttackPathId::new(format!("ap-{difficulty}-{success_probability}")),
        mission_id: MissionId::new(MISSION_ID),
        name: NonEmptyString::new(name).unwrap(),
        description: String::new(),
        difficulty: Rating::new(difficulty).unwrap(),
        success_probability: Rating::new(success_probability).unwrap(),
        enrichment: None,
    }
}
