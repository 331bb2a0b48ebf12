use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::workflows::leads::catalogue::{
    BudgetAvailability, BuyingTimeline, EconomicBuyer, IcpFit, ProblemSeverity,
    ReadinessToSpend,
};
use crate::workflows::leads::conversion::{ConversionOptions, QualificationPolicy};
use crate::workflows::leads::domain::{
    FactorSelection, LeadId, LeadIdentity, LeadRecord, QualificationFactors,
};
use crate::workflows::leads::duplicates::{
    DuplicateCandidate, DuplicateCheckRequest, DuplicateCheckResult, DuplicateChecker,
    MatchLevel,
};
use crate::workflows::leads::lifecycle::LeadStatus;
use crate::workflows::leads::repository::{
    AiScoreResult, AiScorer, CollaboratorError, ConversionResult, LeadRepository, ProblemDetails,
    RepositoryError, SaveError, TenantSettings,
};
use crate::workflows::leads::scoring::LeadDataWeight;
use crate::workflows::leads::service::LeadQualificationService;

pub(super) type TestService =
    LeadQualificationService<MemoryRepository, ScriptedDuplicates, StaticSettings, FixedAiScorer>;

pub(super) fn identity() -> LeadIdentity {
    LeadIdentity {
        first_name: Some("Priya".to_string()),
        last_name: Some("Raman".to_string()),
        email: Some("priya@harbor-freight.example".to_string()),
        phone: Some("+1 515 555 0199".to_string()),
        company_name: Some("Harbor Freight Co".to_string()),
        job_title: Some("VP Operations".to_string()),
        source: None,
    }
}

pub(super) fn strong_factors() -> QualificationFactors {
    QualificationFactors {
        budget_availability: FactorSelection::new(BudgetAvailability::AllocatedAndApproved)
            .with_evidence("Budget line confirmed by CFO"),
        readiness_to_spend: FactorSelection::new(ReadinessToSpend::DecisionInProgress)
            .with_evidence("Procurement engaged"),
        buying_timeline: FactorSelection::new(BuyingTimeline::DecisionDateConfirmed)
            .with_evidence("Board meeting on the 12th"),
        problem_severity: FactorSelection::new(ProblemSeverity::CriticalImpact)
            .with_evidence("Losing two shipments a week"),
        economic_buyer: FactorSelection::new(EconomicBuyer::EngagedInDiscussion)
            .with_evidence("CFO on last call"),
        icp_fit: FactorSelection::new(IcpFit::Strong).with_evidence("Mid-market logistics"),
    }
}

pub(super) fn new_lead() -> LeadRecord {
    LeadRecord {
        factors: strong_factors(),
        ..LeadRecord::new(identity())
    }
}

pub(super) fn stored_lead(id: &str, status: LeadStatus, score: u8) -> LeadRecord {
    LeadRecord {
        id: Some(LeadId(id.to_string())),
        status,
        score,
        ..new_lead()
    }
}

pub(super) fn candidate(id: &str, level: MatchLevel) -> DuplicateCandidate {
    DuplicateCandidate {
        lead_id: LeadId(id.to_string()),
        name: "Priya Raman".to_string(),
        company_name: Some("Harbor Freight Co".to_string()),
        match_level: level,
        matched_on: vec!["email".to_string()],
    }
}

pub(super) fn ai_result(score: u8) -> AiScoreResult {
    AiScoreResult {
        score,
        confidence: 0.72,
        rationale: "Budget and timeline confirmed".to_string(),
        scored_at: Utc
            .with_ymd_and_hms(2026, 3, 2, 14, 30, 0)
            .single()
            .expect("valid timestamp"),
    }
}

pub(super) fn build_service() -> (TestService, Arc<MemoryRepository>, Arc<ScriptedDuplicates>) {
    build_service_with(
        ScriptedDuplicates::clear(),
        StaticSettings::default(),
        FixedAiScorer::returning(ai_result(81)),
    )
}

pub(super) fn build_service_with(
    duplicates: ScriptedDuplicates,
    settings: StaticSettings,
    ai: FixedAiScorer,
) -> (TestService, Arc<MemoryRepository>, Arc<ScriptedDuplicates>) {
    let repository = Arc::new(MemoryRepository::default());
    let duplicates = Arc::new(duplicates);
    let service = LeadQualificationService::new(
        repository.clone(),
        duplicates.clone(),
        Arc::new(settings),
        Arc::new(ai),
    );
    (service, repository, duplicates)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<LeadId, LeadRecord>>>,
    saves: Arc<AtomicUsize>,
}

impl MemoryRepository {
    pub(super) fn insert(&self, record: LeadRecord) {
        let id = record.id.clone().expect("seeded lead has an id");
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(id, record);
    }

    pub(super) fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub(super) fn stored(&self, id: &str) -> Option<LeadRecord> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(&LeadId(id.to_string()))
            .cloned()
    }
}

impl LeadRepository for MemoryRepository {
    fn save(&self, record: LeadRecord) -> Result<LeadRecord, SaveError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let id = record
            .id
            .clone()
            .ok_or_else(|| SaveError::Problem(ProblemDetails::titled("Lead id missing")))?;
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn convert(
        &self,
        id: &LeadId,
        options: &ConversionOptions,
    ) -> Result<ConversionResult, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.status = LeadStatus::Converted;
        Ok(ConversionResult {
            lead_id: id.clone(),
            account_id: options.create_account.then(|| format!("acct-{}", id.0)),
            contact_id: options.create_contact.then(|| format!("cont-{}", id.0)),
            opportunity_id: options.create_opportunity.then(|| format!("opp-{}", id.0)),
        })
    }
}

/// Repository whose saves fail with a structured problem body.
pub(super) struct RejectingRepository {
    pub(super) problem: ProblemDetails,
}

impl LeadRepository for RejectingRepository {
    fn save(&self, _record: LeadRecord) -> Result<LeadRecord, SaveError> {
        Err(SaveError::Problem(self.problem.clone()))
    }

    fn fetch(&self, _id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        Ok(None)
    }

    fn convert(
        &self,
        _id: &LeadId,
        _options: &ConversionOptions,
    ) -> Result<ConversionResult, RepositoryError> {
        Err(RepositoryError::NotFound)
    }
}

/// Duplicate checker that replays scripted answers in order, repeating the last one, and
/// counts calls.
pub(super) struct ScriptedDuplicates {
    answers: Mutex<VecDeque<Result<DuplicateCheckResult, String>>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<DuplicateCheckRequest>>,
}

impl ScriptedDuplicates {
    pub(super) fn clear() -> Self {
        Self::answering(Ok(DuplicateCheckResult::clear()))
    }

    pub(super) fn blocked(id: &str) -> Self {
        Self::answering(Ok(DuplicateCheckResult {
            is_blocked: true,
            has_warnings: false,
            matches: vec![candidate(id, MatchLevel::Block)],
        }))
    }

    pub(super) fn warning(id: &str) -> Self {
        Self::answering(Ok(DuplicateCheckResult {
            is_blocked: false,
            has_warnings: true,
            matches: vec![candidate(id, MatchLevel::Warning)],
        }))
    }

    pub(super) fn failing() -> Self {
        Self::answering(Err("duplicate service timed out".to_string()))
    }

    /// Answers with `self` first, then with `next`.
    pub(super) fn followed_by(self, next: ScriptedDuplicates) -> Self {
        let following = next
            .answers
            .into_inner()
            .expect("duplicate mutex poisoned");
        self.answers
            .lock()
            .expect("duplicate mutex poisoned")
            .extend(following);
        self
    }

    fn answering(answer: Result<DuplicateCheckResult, String>) -> Self {
        Self {
            answers: Mutex::new(VecDeque::from([answer])),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn last_request(&self) -> Option<DuplicateCheckRequest> {
        self.last_request
            .lock()
            .expect("duplicate mutex poisoned")
            .clone()
    }
}

impl DuplicateChecker for ScriptedDuplicates {
    fn check(
        &self,
        request: &DuplicateCheckRequest,
    ) -> Result<DuplicateCheckResult, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().expect("duplicate mutex poisoned") = Some(request.clone());
        let mut answers = self.answers.lock().expect("duplicate mutex poisoned");
        let answer = if answers.len() > 1 {
            answers.pop_front()
        } else {
            answers.front().cloned()
        };
        answer
            .unwrap_or_else(|| Ok(DuplicateCheckResult::clear()))
            .map_err(CollaboratorError::Unavailable)
    }
}

#[derive(Default)]
pub(super) struct StaticSettings {
    pub(super) policy: Option<QualificationPolicy>,
    pub(super) weights: Vec<LeadDataWeight>,
    pub(super) unavailable: bool,
}

impl StaticSettings {
    pub(super) fn with_policy(policy: QualificationPolicy) -> Self {
        Self {
            policy: Some(policy),
            ..Self::default()
        }
    }

    pub(super) fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }
}

impl TenantSettings for StaticSettings {
    fn qualification_policy(&self) -> Result<Option<QualificationPolicy>, CollaboratorError> {
        if self.unavailable {
            return Err(CollaboratorError::Unavailable("settings offline".to_string()));
        }
        Ok(self.policy.clone())
    }

    fn lead_data_weights(&self) -> Result<Vec<LeadDataWeight>, CollaboratorError> {
        if self.unavailable {
            return Err(CollaboratorError::Unavailable("settings offline".to_string()));
        }
        Ok(self.weights.clone())
    }
}

pub(super) struct FixedAiScorer {
    answer: Option<AiScoreResult>,
}

impl FixedAiScorer {
    pub(super) fn returning(result: AiScoreResult) -> Self {
        Self {
            answer: Some(result),
        }
    }

    pub(super) fn failing() -> Self {
        Self { answer: None }
    }
}

impl AiScorer for FixedAiScorer {
    fn score(&self, _record: &LeadRecord) -> Result<AiScoreResult, CollaboratorError> {
        self.answer
            .clone()
            .ok_or_else(|| CollaboratorError::Unavailable("model endpoint down".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
