//! Evidence tone classification and the confidence summary derived from it.
//!
//! The summary exists in two flavors: one recomputed locally from the current factor
//! selections, and one computed by the server when the lead was last saved. The server copy
//! is authoritative until the user edits a factor, see [`AssessmentSource::resolve`].

use serde::{Deserialize, Serialize};

use super::super::catalogue::EvidenceTone;
use super::super::domain::{FactorAssessment, QualificationFactorKind, QualificationFactors};

const HIGH_CONFIDENCE_AVERAGE: f32 = 2.6;
const MEDIUM_CONFIDENCE_AVERAGE: f32 = 1.6;
const MAX_SUGGESTIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLabel {
    High,
    Medium,
    Low,
    /// No factor carries a meaningful value yet.
    #[serde(rename = "Not available")]
    NotAvailable,
}

impl ConfidenceLabel {
    pub fn from_average_weight(average: f32) -> Self {
        if average >= HIGH_CONFIDENCE_AVERAGE {
            ConfidenceLabel::High
        } else if average >= MEDIUM_CONFIDENCE_AVERAGE {
            ConfidenceLabel::Medium
        } else {
            ConfidenceLabel::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ConfidenceLabel::High => "High",
            ConfidenceLabel::Medium => "Medium",
            ConfidenceLabel::Low => "Low",
            ConfidenceLabel::NotAvailable => "Not available",
        }
    }
}

/// Factor with the lowest tone weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakestSignal {
    pub factor: QualificationFactorKind,
    pub state: EvidenceTone,
}

impl WeakestSignal {
    pub fn describe(&self) -> String {
        format!("{} ({})", self.factor.label(), self.state.label())
    }
}

/// Epistemic summary of the six qualification factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceSummary {
    pub confidence_label: ConfidenceLabel,
    /// Average tone weight scaled to `0.0..=1.0`; zero when no factor is meaningful.
    pub qualification_confidence: f32,
    /// Share of the six factors in the verified tone.
    pub truth_coverage: f32,
    pub assumptions_outstanding: u8,
    pub weakest_signal: Option<WeakestSignal>,
    #[serde(default)]
    pub next_evidence_suggestions: Vec<String>,
    #[serde(default)]
    pub risk_flags: Vec<String>,
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

fn weakest(assessments: &[FactorAssessment]) -> Option<WeakestSignal> {
    let mut weakest: Option<&FactorAssessment> = None;
    for factor in assessments {
        match weakest {
            Some(current) if factor.tone.weight() >= current.tone.weight() => {}
            _ => weakest = Some(factor),
        }
    }
    weakest.map(|factor| WeakestSignal {
        factor: factor.kind,
        state: factor.tone,
    })
}

fn suggestion_for(kind: QualificationFactorKind) -> &'static str {
    match kind {
        QualificationFactorKind::BudgetAvailability => {
            "Confirm budget approval in writing with the economic buyer"
        }
        QualificationFactorKind::ReadinessToSpend => {
            "Ask what internal step remains before a purchase decision"
        }
        QualificationFactorKind::BuyingTimeline => {
            "Get the decision date confirmed against the buyer's internal plan"
        }
        QualificationFactorKind::ProblemSeverity => {
            "Quantify the business impact of the problem with the customer"
        }
        QualificationFactorKind::EconomicBuyer => {
            "Identify and meet the person who signs off on the spend"
        }
        QualificationFactorKind::IcpFit => "Check the account against the ideal customer profile",
    }
}

fn next_evidence(assessments: &[FactorAssessment]) -> Vec<String> {
    let mut open: Vec<&FactorAssessment> = assessments
        .iter()
        .filter(|factor| {
            matches!(
                factor.tone,
                EvidenceTone::Unknown | EvidenceTone::Assumed | EvidenceTone::Neutral
            )
        })
        .collect();
    // Stable: high-impact factors first, evaluation order otherwise.
    open.sort_by_key(|factor| !factor.kind.is_high_impact());
    open.into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|factor| suggestion_for(factor.kind).to_string())
        .collect()
}

fn risk_flags(assessments: &[FactorAssessment]) -> Vec<String> {
    let mut flags = Vec::new();
    for factor in assessments {
        match (factor.tone, factor.value) {
            (EvidenceTone::Invalid, Some(value)) => {
                flags.push(format!("{}: {}", factor.kind.label(), value));
            }
            (EvidenceTone::Verified, _) if !factor.has_evidence => {
                flags.push(format!(
                    "{} marked verified without evidence",
                    factor.kind.label()
                ));
            }
            _ => {}
        }
    }
    flags
}

/// Classify the factors' tones into a confidence summary.
pub fn summarize_evidence(factors: &QualificationFactors) -> EvidenceSummary {
    let assessments = factors.assessments();
    let count = assessments.len() as f32;
    let any_meaningful = assessments.iter().any(|factor| factor.meaningful);

    let (confidence_label, qualification_confidence) = if any_meaningful {
        let total: u32 = assessments
            .iter()
            .map(|factor| factor.tone.weight() as u32)
            .sum();
        let average = total as f32 / count;
        (
            ConfidenceLabel::from_average_weight(average),
            round2(average / EvidenceTone::Verified.weight() as f32),
        )
    } else {
        (ConfidenceLabel::NotAvailable, 0.0)
    };

    let verified = assessments
        .iter()
        .filter(|factor| factor.tone == EvidenceTone::Verified)
        .count();

    let assumptions_outstanding = assessments
        .iter()
        .filter(|factor| factor.kind.is_high_impact())
        .filter(|factor| matches!(factor.tone, EvidenceTone::Unknown | EvidenceTone::Assumed))
        .count() as u8;

    EvidenceSummary {
        confidence_label,
        qualification_confidence,
        truth_coverage: verified as f32 / count,
        assumptions_outstanding,
        weakest_signal: weakest(&assessments),
        next_evidence_suggestions: next_evidence(&assessments),
        risk_flags: risk_flags(&assessments),
    }
}

/// Which copy of the evidence summary is in effect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", content = "summary", rename_all = "camelCase")]
pub enum AssessmentSource {
    Local(EvidenceSummary),
    Server(EvidenceSummary),
}

impl AssessmentSource {
    /// The server copy wins until the user edits a factor; afterwards the local
    /// recomputation is authoritative.
    pub fn resolve(
        server: Option<&EvidenceSummary>,
        factors_edited: bool,
        factors: &QualificationFactors,
    ) -> Self {
        match server {
            Some(summary) if !factors_edited => AssessmentSource::Server(summary.clone()),
            _ => AssessmentSource::Local(summarize_evidence(factors)),
        }
    }

    pub fn summary(&self) -> &EvidenceSummary {
        match self {
            AssessmentSource::Local(summary) | AssessmentSource::Server(summary) => summary,
        }
    }

    pub fn is_server(&self) -> bool {
        matches!(self, AssessmentSource::Server(_))
    }
}
