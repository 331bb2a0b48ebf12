//! Threshold resolution and the conversion gate.

mod gate;
mod policy;
mod request;

pub use gate::{decide, ConversionDecision, ConversionState, QualificationBand};
pub use policy::{
    best_matching_rule, resolve_threshold, ModifierKey, QualificationPolicy, ThresholdModifier,
    ThresholdResolution, ThresholdRule, WILDCARD,
};
pub use request::{ConversionContext, ConversionOptions, Velocity};

use serde::Serialize;

/// Stateless evaluator binding a tenant policy to the threshold resolver and gate.
#[derive(Debug, Clone, Default)]
pub struct ConversionEvaluator {
    policy: QualificationPolicy,
}

impl ConversionEvaluator {
    pub fn new(policy: QualificationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &QualificationPolicy {
        &self.policy
    }

    pub fn evaluate(
        &self,
        score: u8,
        context: &ConversionContext,
        options: &ConversionOptions,
    ) -> ConversionOutcome {
        let resolution = resolve_threshold(&self.policy, context);
        let decision = decide(
            score,
            resolution.adjusted_threshold,
            &self.policy,
            context,
            options,
        );
        ConversionOutcome {
            resolution,
            decision,
        }
    }
}

/// Threshold audit trail plus the gate decision it fed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOutcome {
    pub resolution: ThresholdResolution,
    pub decision: ConversionDecision,
}
