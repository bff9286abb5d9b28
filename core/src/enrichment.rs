//! Attack-path enrichment.
//!
//! An enricher derives analysis fields from an author's attack path. The
//! contract every enricher must keep:
//!
//! - author fields (everything outside `enrichment`) come back verbatim;
//! - enriching an already-enriched path yields the same result as enriching
//!   it once.
//!
//! [`check_enrichment_contract`] verifies both for any implementation.

use thiserror::Error;

use ebios_types::{AttackPath, AttackPathEnrichment, AttackPathId, Rating, RiskLevel};

use crate::risk::RiskStrategy;

/// Scale factor mapping a 1..=5 rating onto `(0, 1.25]`.
const RATING_SCALE: f64 = 0.25;

pub trait AttackPathEnricher {
    fn enrich(&self, path: &AttackPath) -> AttackPath;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichmentContractError {
    #[error("enricher changed author field `{field}` of attack path {path}")]
    AuthorFieldChanged {
        path: AttackPathId,
        field: &'static str,
    },
    #[error("enricher produced no enrichment for attack path {path}")]
    MissingEnrichment { path: AttackPathId },
    #[error("re-enriching attack path {path} changed the result")]
    NotIdempotent { path: AttackPathId },
}

/// Run `enricher` twice over `path` and check it keeps the enrichment contract.
pub fn check_enrichment_contract(
    enricher: &dyn AttackPathEnricher,
    path: &AttackPath,
) -> Result<(), EnrichmentContractError> {
    let once = enricher.enrich(path);
    if let Some(field) = changed_author_field(path, &once) {
        return Err(EnrichmentContractError::AuthorFieldChanged {
            path: path.id.clone(),
            field,
        });
    }
    if once.enrichment.is_none() {
        return Err(EnrichmentContractError::MissingEnrichment {
            path: path.id.clone(),
        });
    }
    let twice = enricher.enrich(&once);
    if twice != once {
        return Err(EnrichmentContractError::NotIdempotent {
            path: path.id.clone(),
        });
    }
    Ok(())
}

fn changed_author_field(before: &AttackPath, after: &AttackPath) -> Option<&'static str> {
    if before.id != after.id {
        Some("id")
    } else if before.mission_id != after.mission_id {
        Some("missionId")
    } else if before.name != after.name {
        Some("name")
    } else if before.description != after.description {
        Some("description")
    } else if before.difficulty != after.difficulty {
        Some("difficulty")
    } else if before.success_probability != after.success_probability {
        Some("successProbability")
    } else {
        None
    }
}

// ── Heuristic enricher ───────────────────────────────────────

/// (tag, whole words or space-separated phrases matched against the
/// lowercased words of name and description)
const KEYWORD_TAGS: &[(&str, &[&str])] = &[
    (
        "phishing",
        &["phishing", "spear", "social engineering", "credential", "credentials"],
    ),
    ("ransomware", &["ransomware", "encryption", "encrypted", "extortion"]),
    (
        "supply-chain",
        &["supplier", "suppliers", "supply chain", "third party", "vendor", "vendors"],
    ),
    ("insider", &["insider", "employee", "employees", "privileged user"]),
    ("web", &["web", "injection", "xss", "api", "apis"]),
];

/// (tag, countermeasure)
const COUNTERMEASURES: &[(&str, &str)] = &[
    ("phishing", "Run phishing awareness campaigns"),
    ("phishing", "Enforce multi-factor authentication"),
    ("ransomware", "Keep offline, tested backups"),
    ("ransomware", "Segment the network to limit lateral movement"),
    ("supply-chain", "Audit supplier security commitments"),
    ("insider", "Apply least privilege and review access rights"),
    ("insider", "Log and monitor privileged actions"),
    ("web", "Put exposed services behind a web application firewall"),
    ("web", "Run regular penetration tests on exposed applications"),
    ("low-complexity", "Harden exposed entry points as a priority"),
    ("likely", "Strengthen detection and incident response"),
];

/// Derives enrichment from author fields only, so re-enrichment is a no-op.
///
/// Scores the path the way [`RiskEvaluator::assess_attack_path`] does:
/// inverted difficulty as impact, success probability as likelihood.
///
/// [`RiskEvaluator::assess_attack_path`]: crate::risk::RiskEvaluator::assess_attack_path
#[derive(Debug, Clone, Default)]
pub struct HeuristicEnricher {
    strategy: RiskStrategy,
}

impl HeuristicEnricher {
    #[must_use]
    pub const fn new(strategy: RiskStrategy) -> Self {
        Self { strategy }
    }

    #[must_use]
    pub const fn strategy(&self) -> RiskStrategy {
        self.strategy
    }

    fn derive(&self, path: &AttackPath) -> AttackPathEnrichment {
        let risk_score = self.strategy.evaluate(
            path.difficulty.inverted().as_f64(),
            path.success_probability.as_f64(),
        );
        let category_tags = category_tags(path);
        let suggested_countermeasures = countermeasures_for(&category_tags);
        AttackPathEnrichment {
            risk_score,
            risk_level: self.strategy.classify(risk_score),
            path_complexity: path.difficulty.as_f64() * RATING_SCALE,
            success_likelihood: path.success_probability.as_f64() * RATING_SCALE,
            category_tags,
            suggested_countermeasures,
        }
    }
}

impl AttackPathEnricher for HeuristicEnricher {
    fn enrich(&self, path: &AttackPath) -> AttackPath {
        let enrichment = self.derive(path);
        tracing::trace!(
            path = %path.id,
            strategy = self.strategy.as_str(),
            score = enrichment.risk_score,
            level = enrichment.risk_level.as_str(),
            "Attack path enriched"
        );
        AttackPath {
            enrichment: Some(enrichment),
            ..path.clone()
        }
    }
}

fn complexity_tag(difficulty: Rating) -> &'static str {
    match difficulty.get() {
        0..=2 => "low-complexity",
        3 => "moderate-complexity",
        _ => "high-complexity",
    }
}

fn likelihood_tag(probability: Rating) -> &'static str {
    match probability.get() {
        4.. => "likely",
        3 => "plausible",
        _ => "unlikely",
    }
}

fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Whether `phrase` occurs in `words` as consecutive whole words.
fn mentions(words: &[String], phrase: &str) -> bool {
    let needle: Vec<&str> = phrase.split(' ').collect();
    words
        .windows(needle.len())
        .any(|window| window.iter().zip(&needle).all(|(word, kw)| word == kw))
}

fn category_tags(path: &AttackPath) -> Vec<String> {
    let words = words(&format!("{} {}", path.name, path.description));
    let mut tags = vec![
        complexity_tag(path.difficulty).to_owned(),
        likelihood_tag(path.success_probability).to_owned(),
    ];
    tags.extend(
        KEYWORD_TAGS
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|kw| mentions(&words, kw)))
            .map(|(tag, _)| (*tag).to_owned()),
    );
    tags
}

fn countermeasures_for(tags: &[String]) -> Vec<String> {
    COUNTERMEASURES
        .iter()
        .filter(|(tag, _)| tags.iter().any(|t| t == tag))
        .map(|(_, measure)| (*measure).to_owned())
        .collect()
}

/// Level of an enriched path, if it has been enriched.
#[must_use]
pub fn enriched_level(path: &AttackPath) -> Option<RiskLevel> {
    path.enrichment.as_ref().map(|e| e.risk_level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebios_types::{MissionId, NonEmptyString};

    fn path(name: &str, difficulty: u8, probability: u8) -> AttackPath {
        AttackPath {
            id: AttackPathId::new("ap-1"),
            mission_id: MissionId::new("mission-1"),
            name: NonEmptyString::new(name).unwrap(),
            description: "Attacker targets the treasury team".to_owned(),
            difficulty: Rating::new(difficulty).unwrap(),
            success_probability: Rating::new(probability).unwrap(),
            enrichment: None,
        }
    }

    #[test]
    fn heuristic_enricher_keeps_the_contract() {
        let enricher = HeuristicEnricher::default();
        for p in [
            path("Spear phishing on treasury", 2, 4),
            path("Ransomware via supplier VPN", 4, 2),
            path("Plain intrusion", 3, 3),
        ] {
            check_enrichment_contract(&enricher, &p).unwrap();
        }
    }

    #[test]
    fn derived_fields() {
        let enricher = HeuristicEnricher::new(RiskStrategy::Simple);
        let enriched = enricher.enrich(&path("Spear phishing on treasury", 2, 4));
        let e = enriched.enrichment.as_ref().unwrap();

        // inverted difficulty 4 * probability 4
        assert_eq!(e.risk_score, 16.0);
        assert_eq!(e.risk_level, RiskLevel::High);
        assert_eq!(e.path_complexity, 0.5);
        assert_eq!(e.success_likelihood, 1.0);
        assert_eq!(e.category_tags, vec!["low-complexity", "likely", "phishing"]);
        assert!(
            e.suggested_countermeasures
                .contains(&"Enforce multi-factor authentication".to_owned())
        );
        assert_eq!(enriched_level(&enriched), Some(RiskLevel::High));
    }

    #[test]
    fn enrichment_overwrites_stale_derived_fields() {
        let enricher = HeuristicEnricher::default();
        let mut p = path("Plain intrusion", 5, 1);
        p.enrichment = Some(AttackPathEnrichment {
            risk_score: 99.0,
            risk_level: RiskLevel::Critical,
            path_complexity: 0.0,
            success_likelihood: 0.0,
            category_tags: vec!["stale".to_owned()],
            suggested_countermeasures: vec![],
        });
        let enriched = enricher.enrich(&p);
        let e = enriched.enrichment.unwrap();
        assert_eq!(e.risk_score, 1.0);
        assert_eq!(e.risk_level, RiskLevel::Low);
        assert_eq!(e.category_tags, vec!["high-complexity", "unlikely"]);
    }

    #[test]
    fn keywords_match_whole_words_only() {
        let enricher = HeuristicEnricher::new(RiskStrategy::Simple);
        let tags = |name: &str| {
            enricher
                .enrich(&path(name, 3, 3))
                .enrichment
                .unwrap()
                .category_tags
        };

        assert_eq!(
            tags("Capital markets desk intrusion"),
            vec!["moderate-complexity", "plausible"]
        );
        assert_eq!(
            tags("Stolen credentials on the public API"),
            vec!["moderate-complexity", "plausible", "phishing", "web"]
        );
        assert_eq!(
            tags("Third-party maintenance tunnel"),
            vec!["moderate-complexity", "plausible", "supply-chain"]
        );
        assert!(!tags("Webhook abuse").contains(&"web".to_owned()));
    }

    #[test]
    fn score_matches_the_evaluator() {
        let p = path("Plain intrusion", 2, 5);
        for strategy in [RiskStrategy::Simple, RiskStrategy::Weighted] {
            let assessed = crate::risk::RiskEvaluator::new(strategy)
                .assess_attack_path(&p)
                .unwrap();
            let e = HeuristicEnricher::new(strategy).enrich(&p).enrichment.unwrap();
            assert_eq!(e.risk_score, assessed.score);
            assert_eq!(e.risk_level, assessed.level);
        }
    }

    struct Renaming;

    impl AttackPathEnricher for Renaming {
        fn enrich(&self, path: &AttackPath) -> AttackPath {
            let mut out = HeuristicEnricher::default().enrich(path);
            out.name = NonEmptyString::new("renamed").unwrap();
            out
        }
    }

    struct Counting(std::cell::Cell<u32>);

    impl AttackPathEnricher for Counting {
        fn enrich(&self, path: &AttackPath) -> AttackPath {
            let calls = self.0.get() + 1;
            self.0.set(calls);
            let mut out = HeuristicEnricher::default().enrich(path);
            if let Some(e) = out.enrichment.as_mut() {
                e.risk_score += f64::from(calls);
            }
            out
        }
    }

    #[test]
    fn contract_checker_catches_violations() {
        let p = path("Plain intrusion", 3, 3);
        assert_eq!(
            check_enrichment_contract(&Renaming, &p),
            Err(EnrichmentContractError::AuthorFieldChanged {
                path: p.id.clone(),
                field: "name",
            })
        );
        assert_eq!(
            check_enrichment_contract(&Counting(std::cell::Cell::new(0)), &p),
            Err(EnrichmentContractError::NotIdempotent { path: p.id.clone() })
        );
    }
}
