mod composite;
mod data_quality;
pub mod evidence;
mod factors;

pub use composite::{compose, LeadScoreResult};
pub use data_quality::{
    default_lead_data_weights, resolve_weights, score_data_quality, LeadDataSignal,
    LeadDataWeight, SignalWeight,
};
pub use evidence::{
    summarize_evidence, AssessmentSource, ConfidenceLabel, EvidenceSummary, WeakestSignal,
};
pub use factors::{factor_breakdown, qualification_raw_score};

use serde::Serialize;

use super::domain::{LeadIdentity, QualificationFactorKind, QualificationFactors};

pub(crate) fn clamp_score(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

/// Stateless scorer holding the tenant's resolved data-quality weights.
#[derive(Debug, Clone)]
pub struct LeadScoringEngine {
    weights: Vec<SignalWeight>,
}

impl Default for LeadScoringEngine {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl LeadScoringEngine {
    pub fn new(configured: &[LeadDataWeight]) -> Self {
        Self {
            weights: resolve_weights(configured),
        }
    }

    pub fn weights(&self) -> &[SignalWeight] {
        &self.weights
    }

    pub fn score(&self, identity: &LeadIdentity, factors: &QualificationFactors) -> LeadScoreResult {
        compose(
            score_data_quality(identity, &self.weights),
            qualification_raw_score(factors),
        )
    }

    pub fn evaluate(&self, identity: &LeadIdentity, factors: &QualificationFactors) -> LeadEvaluation {
        LeadEvaluation {
            scores: self.score(identity, factors),
            breakdown: factor_breakdown(factors),
            evidence: summarize_evidence(factors),
        }
    }
}

/// Discrete contribution of one factor, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponent {
    pub factor: QualificationFactorKind,
    pub label: &'static str,
    pub score: u8,
    pub max_score: u8,
}

/// Everything the lead form shows after an edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadEvaluation {
    pub scores: LeadScoreResult,
    pub breakdown: Vec<ScoreComponent>,
    pub evidence: EvidenceSummary,
}
