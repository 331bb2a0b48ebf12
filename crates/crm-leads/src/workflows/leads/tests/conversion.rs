use super::common::*;
use crate::workflows::leads::conversion::{
    ConversionContext, ConversionEvaluator, ConversionOptions, ConversionState,
    QualificationBand, QualificationPolicy, ThresholdModifier, ThresholdRule, Velocity,
};
use crate::workflows::leads::domain::LeadRecord;
use crate::workflows::leads::lifecycle::LeadStatus;

fn segmented_policy() -> QualificationPolicy {
    QualificationPolicy {
        default_threshold: 55,
        manager_approval_below: 50,
        block_below: 25,
        allow_overrides: true,
        require_override_reason: true,
        threshold_rules: vec![
            ThresholdRule::new("Enterprise", "All", "All", 60),
            ThresholdRule::new("Enterprise", "Outbound", "All", 70),
            ThresholdRule::new("SMB", "All", "All", 40),
        ],
        modifiers: vec![
            ThresholdModifier::new("competitive", 10),
            ThresholdModifier::new("fastVelocity", -10),
            ThresholdModifier::new("executiveChampion", -15),
        ],
    }
}

#[test]
fn enterprise_outbound_lead_needs_override_reason_below_specific_rule() {
    let evaluator = ConversionEvaluator::new(segmented_policy());
    let mut context = ConversionContext::new("enterprise", "OUTBOUND", "Discovery");

    let outcome = evaluator.evaluate(65, &context, &ConversionOptions::default());
    assert_eq!(outcome.resolution.base_threshold, 70);
    assert_eq!(outcome.decision.state, ConversionState::NeedsOverrideReason);
    assert_eq!(outcome.decision.band, QualificationBand::Moderate);
    assert_eq!(
        outcome.decision.message,
        "Score 65/100 is below the required threshold (70)"
    );

    context.override_reason = Some("Partner-sourced, sponsor confirmed".to_string());
    let outcome = evaluator.evaluate(65, &context, &ConversionOptions::default());
    assert!(outcome.decision.can_convert);
}

#[test]
fn offsetting_modifiers_leave_segment_threshold() {
    let evaluator = ConversionEvaluator::new(segmented_policy());
    let context = ConversionContext {
        is_competitive: true,
        velocity: Velocity::Fast,
        ..ConversionContext::new("Enterprise", "Inbound", "Proposal")
    };

    let outcome = evaluator.evaluate(60, &context, &ConversionOptions::default());
    assert_eq!(outcome.resolution.base_threshold, 60);
    assert_eq!(outcome.resolution.adjusted_threshold, 60);
    assert_eq!(outcome.resolution.applied_modifiers.len(), 2);
    assert!(!outcome.decision.below_threshold);
    assert_eq!(outcome.decision.band, QualificationBand::Strong);
}

#[test]
fn unmatched_segment_uses_default_threshold() {
    let evaluator = ConversionEvaluator::new(segmented_policy());
    let outcome = evaluator.evaluate(
        58,
        &ConversionContext::new("Mid-Market", "Inbound", "Discovery"),
        &ConversionOptions::default(),
    );
    assert!(outcome.resolution.matched_rule.is_none());
    assert_eq!(outcome.resolution.adjusted_threshold, 55);
    assert!(outcome.decision.can_convert);
}

#[test]
fn strict_policy_blocks_low_scores_regardless_of_approval() {
    let policy = QualificationPolicy {
        allow_overrides: false,
        ..segmented_policy()
    };
    let context = ConversionContext {
        manager_approved: true,
        override_reason: Some("Quarter end".to_string()),
        ..ConversionContext::new("SMB", "Inbound", "Discovery")
    };

    let outcome = ConversionEvaluator::new(policy).evaluate(20, &context, &ConversionOptions::default());
    assert!(outcome.decision.blocked);
    assert!(!outcome.decision.can_convert);
    assert_eq!(outcome.decision.band, QualificationBand::Unqualified);
}

#[test]
fn lead_defaults_feed_the_gate() {
    let lead = LeadRecord {
        status: LeadStatus::Qualified,
        ..new_lead()
    };
    let mut options = ConversionOptions::for_lead(&lead);
    options.create_account = false;

    let outcome = ConversionEvaluator::default().evaluate(
        90,
        &ConversionContext::default(),
        &options,
    );
    assert_eq!(outcome.decision.state, ConversionState::AccountRequired);

    options.create_opportunity = false;
    let outcome = ConversionEvaluator::default().evaluate(
        90,
        &ConversionContext::default(),
        &options,
    );
    assert!(outcome.decision.can_convert);
}
