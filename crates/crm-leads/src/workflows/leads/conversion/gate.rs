use serde::{Deserialize, Serialize};

use super::policy::QualificationPolicy;
use super::request::{ConversionContext, ConversionOptions};

/// Qualitative band of a score relative to the resolved threshold and policy floors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualificationBand {
    Strong,
    Moderate,
    Weak,
    Unqualified,
}

impl QualificationBand {
    pub fn classify(score: u8, adjusted_threshold: u8, policy: &QualificationPolicy) -> Self {
        if score >= adjusted_threshold {
            QualificationBand::Strong
        } else if score >= policy.manager_approval_below {
            QualificationBand::Moderate
        } else if score >= policy.block_below {
            QualificationBand::Weak
        } else {
            QualificationBand::Unqualified
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualificationBand::Strong => "Strong",
            QualificationBand::Moderate => "Moderate",
            QualificationBand::Weak => "Weak",
            QualificationBand::Unqualified => "Unqualified",
        }
    }
}

/// First unmet condition standing between the lead and conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionState {
    Blocked,
    NeedsApproval,
    NeedsOverrideReason,
    AccountRequired,
    Eligible,
}

impl ConversionState {
    pub fn summary(&self) -> String {
        match self {
            ConversionState::Blocked => {
                "conversion blocked by qualification policy".to_string()
            }
            ConversionState::NeedsApproval => "manager approval required".to_string(),
            ConversionState::NeedsOverrideReason => "override reason required".to_string(),
            ConversionState::AccountRequired => {
                "an opportunity requires an account to be created".to_string()
            }
            ConversionState::Eligible => "eligible for conversion".to_string(),
        }
    }
}

/// Structured gate outcome. Never an error: the caller decides how to surface it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionDecision {
    pub score: u8,
    pub adjusted_threshold: u8,
    pub band: QualificationBand,
    pub blocked: bool,
    pub requires_manager_approval: bool,
    pub below_threshold: bool,
    pub requires_override_reason: bool,
    pub can_convert: bool,
    pub state: ConversionState,
    pub message: String,
}

pub fn decide(
    score: u8,
    adjusted_threshold: u8,
    policy: &QualificationPolicy,
    context: &ConversionContext,
    options: &ConversionOptions,
) -> ConversionDecision {
    let blocked = score < policy.block_below && !policy.allow_overrides;
    let requires_manager_approval = score < policy.manager_approval_below;
    let below_threshold = score < adjusted_threshold;
    let requires_override_reason = policy.require_override_reason && below_threshold;

    let state = if blocked {
        ConversionState::Blocked
    } else if requires_manager_approval && !context.manager_approved {
        ConversionState::NeedsApproval
    } else if requires_override_reason && !context.has_override_reason() {
        ConversionState::NeedsOverrideReason
    } else if !options.is_consistent() {
        ConversionState::AccountRequired
    } else {
        ConversionState::Eligible
    };

    let message = if blocked {
        format!(
            "Score {score}/100 is below the minimum ({}); conversion is blocked",
            policy.block_below
        )
    } else if below_threshold {
        format!("Score {score}/100 is below the required threshold ({adjusted_threshold})")
    } else {
        format!("Score {score}/100 meets the required threshold ({adjusted_threshold})")
    };

    ConversionDecision {
        score,
        adjusted_threshold,
        band: QualificationBand::classify(score, adjusted_threshold, policy),
        blocked,
        requires_manager_approval,
        below_threshold,
        requires_override_reason,
        can_convert: state == ConversionState::Eligible,
        state,
        message,
    }
}
