use super::super::catalogue::factor_max_points;
use super::super::domain::QualificationFactors;
use super::{clamp_score, ScoreComponent};

/// Raw qualification score: the sum of the six factor tables.
///
/// Returns `None` while no factor holds a meaningful value so that "not started" is never
/// confused with a legitimate zero.
pub fn qualification_raw_score(factors: &QualificationFactors) -> Option<u8> {
    let assessments = factors.assessments();
    if !assessments.iter().any(|factor| factor.meaningful) {
        return None;
    }

    let total: i64 = assessments.iter().map(|factor| factor.points as i64).sum();
    Some(clamp_score(total))
}

/// Per-factor points next to their maximum, in evaluation order.
pub fn factor_breakdown(factors: &QualificationFactors) -> Vec<ScoreComponent> {
    factors
        .assessments()
        .iter()
        .map(|factor| ScoreComponent {
            factor: factor.kind,
            label: factor.kind.label(),
            score: factor.points,
            max_score: factor_max_points(factor.kind),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::leads::catalogue::{
        BudgetAvailability, BuyingTimeline, EconomicBuyer, IcpFit, ProblemSeverity,
        ReadinessToSpend,
    };
    use crate::workflows::leads::domain::FactorSelection;

    fn unknown_factors() -> QualificationFactors {
        QualificationFactors {
            budget_availability: FactorSelection::new(BudgetAvailability::Unknown),
            readiness_to_spend: FactorSelection::new(ReadinessToSpend::Unknown),
            buying_timeline: FactorSelection::new(BuyingTimeline::Unknown),
            problem_severity: FactorSelection::new(ProblemSeverity::Unknown),
            economic_buyer: FactorSelection::new(EconomicBuyer::Unknown),
            icp_fit: FactorSelection::new(IcpFit::Unknown),
        }
    }

    #[test]
    fn unknown_or_empty_factors_are_not_started() {
        assert_eq!(qualification_raw_score(&QualificationFactors::default()), None);
        assert_eq!(qualification_raw_score(&unknown_factors()), None);
    }

    #[test]
    fn a_single_zero_point_factor_is_a_legitimate_zero() {
        let mut factors = unknown_factors();
        factors.budget_availability = FactorSelection::new(BudgetAvailability::ExplicitlyUnavailable);
        assert_eq!(qualification_raw_score(&factors), Some(0));
    }

    #[test]
    fn top_values_sum_to_one_hundred() {
        let factors = QualificationFactors {
            budget_availability: FactorSelection::new(BudgetAvailability::AllocatedAndApproved),
            readiness_to_spend: FactorSelection::new(ReadinessToSpend::ReadyPendingFinalStep),
            buying_timeline: FactorSelection::new(BuyingTimeline::DecisionDateConfirmed),
            problem_severity: FactorSelection::new(ProblemSeverity::ExecutivePriority),
            economic_buyer: FactorSelection::new(EconomicBuyer::VerballySupportive),
            icp_fit: FactorSelection::new(IcpFit::Strong),
        };
        assert_eq!(qualification_raw_score(&factors), Some(100));
    }

    #[test]
    fn mixed_values_add_their_table_points() {
        let mut factors = unknown_factors();
        factors.budget_availability = FactorSelection::new(BudgetAvailability::IndicativeRange);
        factors.readiness_to_spend = FactorSelection::new(ReadinessToSpend::InterestNoUrgency);
        factors.buying_timeline = FactorSelection::new(BuyingTimeline::RoughTimeline);
        factors.icp_fit = FactorSelection::new(IcpFit::Partial);
        assert_eq!(qualification_raw_score(&factors), Some(15 + 8 + 6 + 5));
    }

    #[test]
    fn breakdown_lists_every_factor_with_its_maximum() {
        let mut factors = unknown_factors();
        factors.problem_severity = FactorSelection::new(ProblemSeverity::OperationalProblem);
        let breakdown = factor_breakdown(&factors);

        assert_eq!(breakdown.len(), 6);
        assert_eq!(breakdown[3].label, "Problem severity");
        assert_eq!(breakdown[3].score, 8);
        assert_eq!(breakdown[3].max_score, 20);
        assert_eq!(
            breakdown.iter().map(|c| c.max_score as u32).sum::<u32>(),
            100
        );
    }
}
