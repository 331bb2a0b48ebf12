use super::domain::{LeadIdentity, LeadRecord, QualificationFactors, ScoreMode};
use super::repository::AiScoreResult;
use super::scoring::{AssessmentSource, LeadEvaluation, LeadScoringEngine};

/// Editable copy of a lead that keeps its score in step with edits.
///
/// Tracks whether qualification factors were touched since load, which decides whether the
/// server-computed assessment or the local one is shown.
#[derive(Debug, Clone)]
pub struct LeadWorksheet {
    engine: LeadScoringEngine,
    record: LeadRecord,
    factors_edited: bool,
}

impl LeadWorksheet {
    pub fn open(engine: LeadScoringEngine, record: LeadRecord) -> Self {
        Self {
            engine,
            record,
            factors_edited: false,
        }
    }

    pub fn record(&self) -> &LeadRecord {
        &self.record
    }

    pub fn into_record(self) -> LeadRecord {
        self.record
    }

    pub fn factors_edited(&self) -> bool {
        self.factors_edited
    }

    pub fn edit_identity(&mut self, identity: LeadIdentity) {
        self.record.identity = identity;
        if self.record.score_mode == ScoreMode::Auto {
            self.refresh_score();
        }
    }

    /// Any factor edit drops an AI score back to automatic scoring.
    pub fn edit_factors(&mut self, factors: QualificationFactors) {
        self.record.factors = factors;
        self.factors_edited = true;
        self.record.score_mode = ScoreMode::Auto;
        self.refresh_score();
    }

    pub fn apply_ai_score(&mut self, result: AiScoreResult) {
        self.record.score = result.score.min(100);
        self.record.score_mode = ScoreMode::Ai;
        self.record.ai_score = Some(result);
    }

    pub fn assessment(&self) -> AssessmentSource {
        AssessmentSource::resolve(
            self.record.server_assessment.as_ref(),
            self.factors_edited,
            &self.record.factors,
        )
    }

    /// Scores and breakdown from the current edits, with the evidence summary in effect.
    pub fn evaluation(&self) -> LeadEvaluation {
        let mut evaluation = self
            .engine
            .evaluate(&self.record.identity, &self.record.factors);
        evaluation.evidence = self.assessment().summary().clone();
        evaluation
    }

    fn refresh_score(&mut self) {
        self.record.score = self
            .engine
            .score(&self.record.identity, &self.record.factors)
            .final_lead_score;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::workflows::leads::catalogue::{BudgetAvailability, IcpFit};
    use crate::workflows::leads::domain::FactorSelection;
    use crate::workflows::leads::scoring::{summarize_evidence, ConfidenceLabel};

    fn named_identity() -> LeadIdentity {
        LeadIdentity {
            first_name: Some("Lin".to_string()),
            last_name: Some("Okafor".to_string()),
            email: Some("lin@okafor.io".to_string()),
            ..LeadIdentity::default()
        }
    }

    fn ai_result(score: u8) -> AiScoreResult {
        AiScoreResult {
            score,
            confidence: 0.8,
            rationale: "Engaged buyer with budget".to_string(),
            scored_at: Utc::now(),
        }
    }

    #[test]
    fn identity_edits_rescore_in_auto_mode() {
        let mut worksheet = LeadWorksheet::open(LeadScoringEngine::default(), LeadRecord::default());
        worksheet.edit_identity(named_identity());
        // name 16 + email 24 of a 100 total
        assert_eq!(worksheet.record().score, 40);
    }

    #[test]
    fn ai_score_is_frozen_until_factors_change() {
        let mut worksheet = LeadWorksheet::open(LeadScoringEngine::default(), LeadRecord::default());
        worksheet.apply_ai_score(ai_result(88));
        worksheet.edit_identity(named_identity());
        assert_eq!(worksheet.record().score, 88);
        assert_eq!(worksheet.record().score_mode, ScoreMode::Ai);

        worksheet.edit_factors(QualificationFactors {
            icp_fit: FactorSelection::new(IcpFit::Strong),
            ..QualificationFactors::default()
        });
        assert_eq!(worksheet.record().score_mode, ScoreMode::Auto);
        assert_eq!(worksheet.record().score, 40);
    }

    #[test]
    fn server_assessment_yields_after_factor_edit() {
        let mut server = summarize_evidence(&QualificationFactors::default());
        server.confidence_label = ConfidenceLabel::High;
        let record = LeadRecord {
            server_assessment: Some(server),
            ..LeadRecord::new(named_identity())
        };

        let mut worksheet = LeadWorksheet::open(LeadScoringEngine::default(), record);
        assert!(worksheet.assessment().is_server());
        assert_eq!(worksheet.evaluation().evidence.confidence_label, ConfidenceLabel::High);

        worksheet.edit_factors(QualificationFactors {
            budget_availability: FactorSelection::new(BudgetAvailability::IndicativeRange),
            ..QualificationFactors::default()
        });
        assert!(!worksheet.assessment().is_server());
        assert_ne!(worksheet.evaluation().evidence.confidence_label, ConfidenceLabel::High);
    }
}
