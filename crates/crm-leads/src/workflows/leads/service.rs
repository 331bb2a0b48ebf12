use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::conversion::{
    ConversionContext, ConversionDecision, ConversionEvaluator, ConversionOptions,
    ConversionOutcome, QualificationPolicy,
};
use super::domain::{LeadId, LeadIdentity, LeadRecord, QualificationFactors, ScoreMode};
use super::duplicates::{DuplicateCandidate, DuplicateChecker, DuplicateGuard, SaveGate, SaveSession};
use super::lifecycle::LeadStatus;
use super::repository::{
    AiScorer, CollaboratorError, ConversionResult, LeadRepository, RepositoryError, SaveError,
    TenantSettings,
};
use super::scoring::{summarize_evidence, LeadEvaluation, LeadScoringEngine};
use super::validation::{validate_identity, LeadValidationError};
use super::worksheet::LeadWorksheet;

static LEAD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_lead_id() -> LeadId {
    let id = LEAD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LeadId(format!("lead-{id:06}"))
}

/// Result of a save attempt that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SaveOutcome {
    Saved { lead: LeadRecord },
    /// Payload held in the session until [`LeadQualificationService::confirm_pending_save`].
    AwaitingConfirmation { matches: Vec<DuplicateCandidate> },
    Blocked { matches: Vec<DuplicateCandidate> },
}

impl SaveOutcome {
    pub fn summary(&self) -> String {
        match self {
            SaveOutcome::Saved { lead } => match &lead.id {
                Some(id) => format!("lead {id} saved"),
                None => "lead saved".to_string(),
            },
            SaveOutcome::AwaitingConfirmation { matches } => format!(
                "{} possible duplicate(s) found; confirm to save anyway",
                matches.len()
            ),
            SaveOutcome::Blocked { matches } => format!(
                "save blocked by existing lead(s): {}",
                matches
                    .iter()
                    .map(|candidate| candidate.lead_id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

/// Convert-form input. Options default from the lead when omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionRequest {
    pub context: ConversionContext,
    pub options: Option<ConversionOptions>,
}

/// Lead plus everything the form derives from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadView {
    pub lead: LeadRecord,
    pub evaluation: LeadEvaluation,
    pub conversion_defaults: ConversionOptions,
}

/// Service composing persistence, duplicate detection, tenant settings and AI scoring around
/// the scoring engine and conversion gate.
pub struct LeadQualificationService<R, D, S, A> {
    repository: Arc<R>,
    duplicates: DuplicateGuard<D>,
    settings: Arc<S>,
    ai: Arc<A>,
}

impl<R, D, S, A> LeadQualificationService<R, D, S, A>
where
    R: LeadRepository + 'static,
    D: DuplicateChecker + 'static,
    S: TenantSettings + 'static,
    A: AiScorer + 'static,
{
    pub fn new(repository: Arc<R>, duplicates: Arc<D>, settings: Arc<S>, ai: Arc<A>) -> Self {
        Self {
            repository,
            duplicates: DuplicateGuard::new(duplicates),
            settings,
            ai,
        }
    }

    /// Scoring engine built from the tenant's data weights, or the defaults when unavailable.
    pub fn scoring_engine(&self) -> LeadScoringEngine {
        match self.settings.lead_data_weights() {
            Ok(weights) => LeadScoringEngine::new(&weights),
            Err(error) => {
                warn!(%error, "lead data weights unavailable; using defaults");
                LeadScoringEngine::default()
            }
        }
    }

    pub fn qualification_policy(&self) -> QualificationPolicy {
        match self.settings.qualification_policy() {
            Ok(Some(policy)) => policy,
            Ok(None) => QualificationPolicy::default(),
            Err(error) => {
                warn!(%error, "qualification policy unavailable; using defaults");
                QualificationPolicy::default()
            }
        }
    }

    /// Score an unsaved lead form. Pure: nothing is persisted.
    pub fn evaluate(&self, identity: &LeadIdentity, factors: &QualificationFactors) -> LeadEvaluation {
        self.scoring_engine().evaluate(identity, factors)
    }

    /// Validate, run the duplicate guard, then persist.
    pub fn save(
        &self,
        session: &SaveSession,
        record: LeadRecord,
    ) -> Result<SaveOutcome, LeadServiceError> {
        validate_identity(&record.identity)?;
        let _saving = session.begin().ok_or(LeadServiceError::SaveInProgress)?;
        if session.take_pending().is_some() {
            debug!("earlier pending save superseded");
        }

        let previous = self.previous_version(&record)?;
        check_status_change(previous.as_ref(), record.status)?;
        let record = self.prepare(record, previous.as_ref());
        match self.duplicates.inspect(&record) {
            SaveGate::Proceed => {
                let lead = self.persist(record)?;
                Ok(SaveOutcome::Saved { lead })
            }
            SaveGate::Confirm(matches) => {
                info!(
                    lead = %record.display_name(),
                    matches = matches.len(),
                    "save held for duplicate confirmation"
                );
                session.hold(record);
                Ok(SaveOutcome::AwaitingConfirmation { matches })
            }
            SaveGate::Block(matches) => {
                info!(
                    lead = %record.display_name(),
                    matches = matches.len(),
                    "save blocked by duplicate"
                );
                Ok(SaveOutcome::Blocked { matches })
            }
        }
    }

    /// "Save anyway" after duplicate warnings.
    pub fn confirm_pending_save(&self, session: &SaveSession) -> Result<LeadRecord, LeadServiceError> {
        let _saving = session.begin().ok_or(LeadServiceError::SaveInProgress)?;
        let record = session.take_pending().ok_or(LeadServiceError::NothingPending)?;
        self.persist(record)
    }

    /// Drops the held payload; returns whether there was one.
    pub fn discard_pending_save(&self, session: &SaveSession) -> bool {
        let discarded = session.take_pending().is_some();
        if discarded {
            debug!("pending lead save discarded");
        }
        discarded
    }

    pub fn get(&self, lead_id: &LeadId) -> Result<LeadRecord, LeadServiceError> {
        let record = self
            .repository
            .fetch(lead_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn view(&self, lead_id: &LeadId) -> Result<LeadView, LeadServiceError> {
        let lead = self.get(lead_id)?;
        let worksheet = LeadWorksheet::open(self.scoring_engine(), lead);
        let evaluation = worksheet.evaluation();
        let lead = worksheet.into_record();
        let conversion_defaults = ConversionOptions::for_lead(&lead);
        Ok(LeadView {
            lead,
            evaluation,
            conversion_defaults,
        })
    }

    /// Resolve the threshold and gate decision for the stored lead's score.
    pub fn check_conversion(
        &self,
        lead_id: &LeadId,
        request: &ConversionRequest,
    ) -> Result<ConversionOutcome, LeadServiceError> {
        let record = self.get(lead_id)?;
        Ok(self.gate(&record, request))
    }

    /// Convert a qualified lead when the gate allows it.
    pub fn convert(
        &self,
        lead_id: &LeadId,
        request: &ConversionRequest,
    ) -> Result<ConversionResult, LeadServiceError> {
        let record = self.get(lead_id)?;
        if record.status == LeadStatus::Converted
            || !record.status.can_transition_to(LeadStatus::Converted)
        {
            return Err(LeadServiceError::InvalidStatus(record.status));
        }

        let outcome = self.gate(&record, request);
        if !outcome.decision.can_convert {
            info!(
                lead_id = %lead_id,
                state = ?outcome.decision.state,
                "conversion rejected"
            );
            return Err(LeadServiceError::ConversionRejected(outcome.decision));
        }

        let options = request
            .options
            .clone()
            .unwrap_or_else(|| ConversionOptions::for_lead(&record));
        let result = self.repository.convert(lead_id, &options)?;
        info!(lead_id = %lead_id, score = record.score, "lead converted");
        Ok(result)
    }

    /// Ask the AI scorer for a score. On failure the stored score is left untouched.
    pub fn ai_score(&self, lead_id: &LeadId) -> Result<LeadRecord, LeadServiceError> {
        let record = self.get(lead_id)?;
        let result = match self.ai.score(&record) {
            Ok(result) => result,
            Err(error) => {
                warn!(lead_id = %lead_id, %error, "AI scoring failed; keeping current score");
                return Err(LeadServiceError::AiScore(error));
            }
        };

        let mut worksheet = LeadWorksheet::open(self.scoring_engine(), record);
        worksheet.apply_ai_score(result);
        let stored = self.repository.save(worksheet.into_record())?;
        Ok(stored)
    }

    fn gate(&self, record: &LeadRecord, request: &ConversionRequest) -> ConversionOutcome {
        let options = request
            .options
            .clone()
            .unwrap_or_else(|| ConversionOptions::for_lead(record));
        let outcome = ConversionEvaluator::new(self.qualification_policy()).evaluate(
            record.score,
            &request.context,
            &options,
        );
        debug!(
            score = record.score,
            threshold = outcome.resolution.adjusted_threshold,
            band = outcome.decision.band.label(),
            "conversion gate evaluated"
        );
        outcome
    }

    fn previous_version(&self, record: &LeadRecord) -> Result<Option<LeadRecord>, LeadServiceError> {
        match &record.id {
            Some(id) => Ok(self.repository.fetch(id)?),
            None => Ok(None),
        }
    }

    /// Recompute the auto score and the server-side assessment stored with the lead.
    /// Editing the factors of an AI-scored lead hands scoring back to the engine.
    fn prepare(&self, mut record: LeadRecord, previous: Option<&LeadRecord>) -> LeadRecord {
        if let Some(previous) = previous {
            if record.score_mode == ScoreMode::Ai && previous.factors != record.factors {
                debug!(lead = %record.display_name(), "factors edited; leaving AI score mode");
                record.score_mode = ScoreMode::Auto;
            }
        }
        if record.score_mode == ScoreMode::Auto {
            record.score = self
                .scoring_engine()
                .score(&record.identity, &record.factors)
                .final_lead_score;
        }
        record.server_assessment = Some(summarize_evidence(&record.factors));
        record
    }

    fn persist(&self, mut record: LeadRecord) -> Result<LeadRecord, LeadServiceError> {
        if record.id.is_none() {
            record.id = Some(next_lead_id());
        }
        match self.repository.save(record) {
            Ok(stored) => {
                info!(lead_id = ?stored.id, score = stored.score, "lead saved");
                Ok(stored)
            }
            Err(error) => {
                warn!(%error, "lead save failed");
                Err(error.into())
            }
        }
    }
}

/// Saves may move a lead along its lifecycle but never into Converted; that only happens
/// through [`LeadQualificationService::convert`]. New leads start from New.
fn check_status_change(
    previous: Option<&LeadRecord>,
    requested: LeadStatus,
) -> Result<(), LeadServiceError> {
    let from = previous.map_or(LeadStatus::New, |lead| lead.status);
    let entering_converted = requested == LeadStatus::Converted && from != LeadStatus::Converted;
    if entering_converted || !from.can_transition_to(requested) {
        return Err(LeadServiceError::InvalidTransition {
            from,
            to: requested,
        });
    }
    Ok(())
}

/// Error raised by the lead qualification service.
#[derive(Debug, thiserror::Error)]
pub enum LeadServiceError {
    #[error(transparent)]
    Validation(#[from] LeadValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error("AI scoring failed: {0}")]
    AiScore(#[source] CollaboratorError),
    #[error("a save is already in progress")]
    SaveInProgress,
    #[error("no save is awaiting confirmation")]
    NothingPending,
    #[error("lead in status {} cannot be converted", .0.label())]
    InvalidStatus(LeadStatus),
    #[error("lead status cannot change from {} to {}", .from.label(), .to.label())]
    InvalidTransition { from: LeadStatus, to: LeadStatus },
    #[error("conversion rejected: {}", .0.message)]
    ConversionRejected(ConversionDecision),
}

impl LeadServiceError {
    /// Text suitable for the user; collaborator transport details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            LeadServiceError::Save(error) => error.user_message(),
            LeadServiceError::AiScore(_) => "AI scoring is unavailable right now.".to_string(),
            LeadServiceError::ConversionRejected(decision) => {
                format!("{}: {}", decision.state.summary(), decision.message)
            }
            other => other.to_string(),
        }
    }
}
