use ebios_core::{
    AttackPathEnricher, BusinessValueDraft, BusinessValueFactory, DreadedEventDraft,
    HeuristicEnricher, RiskError, RiskEvaluator, RiskStrategy, check_enrichment_contract,
};
use ebios_types::{BusinessValueCategory, MissionId, RiskLevel};

use crate::common::{MISSION_ID, attack_path};

fn payment_service() -> BusinessValueDraft {
    BusinessValueDraft {
        name: "Payment service".to_owned(),
        description: "Card payment authorization".to_owned(),
        category: BusinessValueCategory::Primary,
        supporting_assets: vec!["Payment gateway".to_owned(), "HSM".to_owned()],
        dreaded_events: vec![
            DreadedEventDraft {
                name: "Service outage".to_owned(),
                description: String::new(),
                impact: 4,
                likelihood: 3,
            },
            DreadedEventDraft {
                name: "Fraudulent transactions".to_owned(),
                description: String::new(),
                impact: 5,
                likelihood: 2,
            },
        ],
    }
}

#[test]
fn strategy_swap_affects_only_later_scores() {
    let value = BusinessValueFactory::create(&MissionId::new(MISSION_ID), &payment_service()).unwrap();
    let mut evaluator = RiskEvaluator::new(RiskStrategy::Simple);

    let simple = evaluator.assess_dreaded_events(&value).unwrap();
    let simple_scores: Vec<f64> = simple.iter().map(|a| a.assessment.score).collect();
    assert_eq!(simple_scores, vec![12.0, 10.0]);

    evaluator.set_strategy(RiskStrategy::Weighted);
    let weighted = evaluator.assess_dreaded_events(&value).unwrap();

    assert!((weighted[0].assessment.score - 3.7).abs() < 1e-9);
    assert!((weighted[1].assessment.score - 4.1).abs() < 1e-9);
    assert!(weighted.iter().all(|a| a.assessment.strategy == RiskStrategy::Weighted));
    // Earlier results are plain values.
    assert_eq!(simple[0].assessment.score, 12.0);
    assert_eq!(simple[0].event_id, value.dreaded_events[0].id);
}

#[test]
fn unconfigured_evaluator_reports_error() {
    let value = BusinessValueFactory::create(&MissionId::new(MISSION_ID), &payment_service()).unwrap();
    assert_eq!(
        RiskEvaluator::unconfigured().assess_dreaded_events(&value),
        Err(RiskError::StrategyNotConfigured)
    );
}

#[test]
fn assessment_serializes_flat() {
    let value = BusinessValueFactory::create(&MissionId::new(MISSION_ID), &payment_service()).unwrap();
    let assessments = RiskEvaluator::new(RiskStrategy::Simple)
        .assess_dreaded_events(&value)
        .unwrap();
    let json = serde_json::to_value(&assessments[0]).unwrap();
    assert_eq!(json["strategy"], "simple");
    assert_eq!(json["score"], 12.0);
    assert_eq!(json["level"], "moderate");
    assert!(json["eventId"].is_string());
}

#[test]
fn easier_paths_score_higher() {
    let evaluator = RiskEvaluator::new(RiskStrategy::Simple);
    let easy = evaluator
        .assess_attack_path(&attack_path("Phishing", 1, 3))
        .unwrap();
    let hard = evaluator
        .assess_attack_path(&attack_path("Phishing", 5, 3))
        .unwrap();
    assert!(easy.score > hard.score);
    assert_eq!(hard.level, RiskLevel::Low);
}

#[test]
fn enrichment_preserves_author_fields_and_is_idempotent() {
    for strategy in [RiskStrategy::Simple, RiskStrategy::Weighted] {
        let enricher = HeuristicEnricher::new(strategy);
        for path in [
            attack_path("Ransomware through third-party maintenance access", 3, 4),
            attack_path("Insider exfiltration of customer files", 2, 2),
            attack_path("SQL injection on the web portal", 4, 5),
        ] {
            check_enrichment_contract(&enricher, &path).unwrap();
            assert_eq!(enricher.enrich(&path).authored(), path);
        }
    }
}

#[test]
fn enriched_path_round_trips() {
    let enricher = HeuristicEnricher::new(RiskStrategy::Weighted);
    let enriched = enricher.enrich(&attack_path("Supplier compromise", 2, 3));
    let json = serde_json::to_value(&enriched).unwrap();

    assert_eq!(json["enrichment"]["pathComplexity"], 0.5);
    assert_eq!(json["enrichment"]["successLikelihood"], 0.75);
    let tags = json["enrichment"]["categoryTags"].as_array().unwrap();
    assert!(tags.iter().any(|t| t == "supply-chain"));

    let back: ebios_types::AttackPath = serde_json::from_value(json).unwrap();
    assert_eq!(back, enriched);
}
