use serde::{Deserialize, Serialize};

use super::request::{ConversionContext, Velocity};
use crate::workflows::leads::scoring::clamp_score;

pub const WILDCARD: &str = "All";

fn is_wildcard(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case(WILDCARD)
}

/// Tenant conversion policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QualificationPolicy {
    pub default_threshold: u8,
    pub manager_approval_below: u8,
    pub block_below: u8,
    pub allow_overrides: bool,
    pub require_override_reason: bool,
    pub threshold_rules: Vec<ThresholdRule>,
    pub modifiers: Vec<ThresholdModifier>,
}

impl Default for QualificationPolicy {
    fn default() -> Self {
        Self {
            default_threshold: 75,
            manager_approval_below: 50,
            block_below: 25,
            allow_overrides: true,
            require_override_reason: true,
            threshold_rules: Vec::new(),
            modifiers: vec![
                ThresholdModifier::new("competitive", 10),
                ThresholdModifier::new("executiveChampion", -15),
                ThresholdModifier::new("strategic", -15),
                ThresholdModifier::new("fastVelocity", -10),
                ThresholdModifier::new("slowVelocity", 10),
            ],
        }
    }
}

/// Threshold override for a segment / deal type / stage combination.
///
/// Each dimension is either a concrete value or the wildcard (`"All"` or empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdRule {
    #[serde(default)]
    pub segment: String,
    #[serde(default)]
    pub deal_type: String,
    #[serde(default)]
    pub stage: String,
    pub threshold: u8,
}

impl ThresholdRule {
    pub fn new(
        segment: impl Into<String>,
        deal_type: impl Into<String>,
        stage: impl Into<String>,
        threshold: u8,
    ) -> Self {
        Self {
            segment: segment.into(),
            deal_type: deal_type.into(),
            stage: stage.into(),
            threshold,
        }
    }

    /// Number of concrete dimensions when the rule matches the context, `None` otherwise.
    pub fn specificity_for(&self, context: &ConversionContext) -> Option<u8> {
        let dimensions = [
            (&self.segment, &context.segment),
            (&self.deal_type, &context.deal_type),
            (&self.stage, &context.stage),
        ];

        let mut specificity = 0;
        for (expected, actual) in dimensions {
            if is_wildcard(expected) {
                continue;
            }
            if !expected.trim().eq_ignore_ascii_case(actual.trim()) {
                return None;
            }
            specificity += 1;
        }
        Some(specificity)
    }
}

/// Additive threshold adjustment keyed by a deal attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdModifier {
    pub key: String,
    pub delta: i32,
}

impl ThresholdModifier {
    pub fn new(key: impl Into<String>, delta: i32) -> Self {
        Self {
            key: key.into(),
            delta,
        }
    }
}

/// Deal attributes a modifier can key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKey {
    Competitive,
    ExecutiveChampion,
    Strategic,
    FastVelocity,
    SlowVelocity,
}

impl ModifierKey {
    pub fn from_key(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "competitive" => Some(ModifierKey::Competitive),
            "executivechampion" => Some(ModifierKey::ExecutiveChampion),
            "strategic" => Some(ModifierKey::Strategic),
            "fastvelocity" => Some(ModifierKey::FastVelocity),
            "slowvelocity" => Some(ModifierKey::SlowVelocity),
            _ => None,
        }
    }

    pub fn is_active(self, context: &ConversionContext) -> bool {
        match self {
            ModifierKey::Competitive => context.is_competitive,
            ModifierKey::ExecutiveChampion => context.has_executive_champion,
            ModifierKey::Strategic => context.is_strategic,
            ModifierKey::FastVelocity => context.velocity == Velocity::Fast,
            ModifierKey::SlowVelocity => context.velocity == Velocity::Slow,
        }
    }
}

/// Audit trail of how the adjusted threshold was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdResolution {
    pub base_threshold: u8,
    /// `None` when no rule matched and the policy default applied.
    pub matched_rule: Option<ThresholdRule>,
    pub applied_modifiers: Vec<ThresholdModifier>,
    pub adjusted_threshold: u8,
}

/// Most specific matching rule; ties go to the higher threshold, then to the earlier rule.
pub fn best_matching_rule<'a>(
    rules: &'a [ThresholdRule],
    context: &ConversionContext,
) -> Option<&'a ThresholdRule> {
    let mut best: Option<(u8, &ThresholdRule)> = None;
    for rule in rules {
        let Some(specificity) = rule.specificity_for(context) else {
            continue;
        };
        let better = match best {
            None => true,
            Some((best_specificity, best_rule)) => {
                specificity > best_specificity
                    || (specificity == best_specificity && rule.threshold > best_rule.threshold)
            }
        };
        if better {
            best = Some((specificity, rule));
        }
    }
    best.map(|(_, rule)| rule)
}

pub fn resolve_threshold(
    policy: &QualificationPolicy,
    context: &ConversionContext,
) -> ThresholdResolution {
    let matched_rule = best_matching_rule(&policy.threshold_rules, context).cloned();
    let base_threshold = matched_rule
        .as_ref()
        .map(|rule| rule.threshold)
        .unwrap_or(policy.default_threshold);

    let applied_modifiers: Vec<ThresholdModifier> = policy
        .modifiers
        .iter()
        .filter(|modifier| {
            ModifierKey::from_key(&modifier.key)
                .map(|key| key.is_active(context))
                .unwrap_or(false)
        })
        .cloned()
        .collect();

    let delta: i64 = applied_modifiers
        .iter()
        .map(|modifier| modifier.delta as i64)
        .sum();

    ThresholdResolution {
        base_threshold,
        matched_rule,
        applied_modifiers,
        adjusted_threshold: clamp_score(base_threshold as i64 + delta),
    }
}
