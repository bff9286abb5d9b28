//! Risk scoring strategies and the evaluator that holds one.
//!
//! Strategies are pure and total over real numbers. Impact and likelihood are
//! expected on the 1..=5 scale, but that is the caller's precondition: the
//! raw [`RiskEvaluator::evaluate_risk`] does not validate. The typed entry
//! points ([`RiskEvaluator::assess`] and friends) take [`Rating`]s, so their
//! inputs are in range by construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ebios_types::{AttackPath, BusinessValue, DreadedEventId, Rating, RiskLevel};

const WEIGHTED_IMPACT: f64 = 0.7;
const WEIGHTED_LIKELIHOOD: f64 = 0.3;

/// Closed set of scoring algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskStrategy {
    /// `impact * likelihood`, range `[1, 25]`.
    #[default]
    Simple,
    /// `impact * 0.7 + likelihood * 0.3`, range `[1, 5]`.
    Weighted,
}

impl RiskStrategy {
    #[must_use]
    pub fn evaluate(self, impact: f64, likelihood: f64) -> f64 {
        match self {
            Self::Simple => impact * likelihood,
            Self::Weighted => impact * WEIGHTED_IMPACT + likelihood * WEIGHTED_LIKELIHOOD,
        }
    }

    /// Score for the lowest ratings on both axes.
    #[must_use]
    pub fn min_score(self) -> f64 {
        let min = f64::from(Rating::MIN);
        self.evaluate(min, min)
    }

    /// Score for the highest ratings on both axes.
    #[must_use]
    pub fn max_score(self) -> f64 {
        let max = f64::from(Rating::MAX);
        self.evaluate(max, max)
    }

    /// Position of `score` within this strategy's range, in `[0, 1]` for
    /// in-range scores.
    #[must_use]
    pub fn normalize(self, score: f64) -> f64 {
        let (min, max) = (self.min_score(), self.max_score());
        (score - min) / (max - min)
    }

    #[must_use]
    pub fn classify(self, score: f64) -> RiskLevel {
        RiskLevel::from_normalized(self.normalize(score))
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Weighted => "weighted",
        }
    }
}

impl std::str::FromStr for RiskStrategy {
    type Err = RiskError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "weighted" => Ok(Self::Weighted),
            other => Err(RiskError::UnknownStrategy {
                name: other.to_owned(),
            }),
        }
    }
}

impl std::fmt::Display for RiskStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiskError {
    #[error("no risk evaluation strategy configured")]
    StrategyNotConfigured,
    #[error("unknown risk evaluation strategy `{name}` (expected `simple` or `weighted`)")]
    UnknownStrategy { name: String },
}

/// Result of scoring one (impact, likelihood) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub strategy: RiskStrategy,
    pub score: f64,
    pub level: RiskLevel,
}

/// Assessment of one dreaded event of a business value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DreadedEventAssessment {
    pub event_id: DreadedEventId,
    #[serde(flatten)]
    pub assessment: RiskAssessment,
}

/// Holds the current scoring strategy.
///
/// Swapping the strategy only affects later calls; values already returned
/// are plain numbers and never recomputed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskEvaluator {
    strategy: Option<RiskStrategy>,
}

impl RiskEvaluator {
    #[must_use]
    pub const fn new(strategy: RiskStrategy) -> Self {
        Self {
            strategy: Some(strategy),
        }
    }

    /// An evaluator with no strategy. Every evaluation fails with
    /// [`RiskError::StrategyNotConfigured`] until one is set.
    #[must_use]
    pub const fn unconfigured() -> Self {
        Self { strategy: None }
    }

    #[must_use]
    pub const fn strategy(&self) -> Option<RiskStrategy> {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: RiskStrategy) {
        if self.strategy != Some(strategy) {
            tracing::debug!(
                from = self.strategy.map(RiskStrategy::as_str),
                to = strategy.as_str(),
                "Risk strategy changed"
            );
        }
        self.strategy = Some(strategy);
    }

    fn configured(&self) -> Result<RiskStrategy, RiskError> {
        self.strategy.ok_or(RiskError::StrategyNotConfigured)
    }

    /// Delegate to the held strategy. Inputs are not validated.
    pub fn evaluate_risk(&self, impact: f64, likelihood: f64) -> Result<f64, RiskError> {
        let strategy = self.configured()?;
        let score = strategy.evaluate(impact, likelihood);
        tracing::trace!(strategy = strategy.as_str(), impact, likelihood, score, "Risk evaluated");
        Ok(score)
    }

    pub fn assess(&self, impact: Rating, likelihood: Rating) -> Result<RiskAssessment, RiskError> {
        let strategy = self.configured()?;
        let score = self.evaluate_risk(impact.as_f64(), likelihood.as_f64())?;
        Ok(RiskAssessment {
            strategy,
            score,
            level: strategy.classify(score),
        })
    }

    /// One assessment per dreaded event, in declaration order.
    pub fn assess_dreaded_events(
        &self,
        value: &BusinessValue,
    ) -> Result<Vec<DreadedEventAssessment>, RiskError> {
        value
            .dreaded_events
            .iter()
            .map(|event| {
                Ok(DreadedEventAssessment {
                    event_id: event.id.clone(),
                    assessment: self.assess(event.impact, event.likelihood)?,
                })
            })
            .collect()
    }

    /// Score an attack path.
    ///
    /// Success probability plays the role of likelihood; the inverted
    /// difficulty plays the role of impact, so an easy path scores higher
    /// than a hard one with the same probability.
    pub fn assess_attack_path(&self, path: &AttackPath) -> Result<RiskAssessment, RiskError> {
        self.assess(path.difficulty.inverted(), path.success_probability)
    }
}
