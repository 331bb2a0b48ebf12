use crm_leads::workflows::leads::{
    AiScoreResult, AiScorer, CollaboratorError, ConversionOptions, ConversionResult,
    DuplicateCandidate, DuplicateCheckRequest, DuplicateCheckResult, DuplicateChecker, LeadId,
    LeadRecord, LeadRepository, LeadStatus, MatchLevel, RepositoryError, SaveError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

const MIN_PHONE_DIGITS: usize = 7;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
pub(crate) struct InMemoryLeadRepository {
    records: Mutex<HashMap<LeadId, LeadRecord>>,
    sequence: AtomicU64,
}

impl InMemoryLeadRepository {
    pub(crate) fn snapshot(&self) -> Vec<LeadRecord> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        guard.values().cloned().collect()
    }

    fn next_id(&self, prefix: &str) -> String {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{id:06}")
    }
}

impl LeadRepository for InMemoryLeadRepository {
    fn save(&self, record: LeadRecord) -> Result<LeadRecord, SaveError> {
        let id = record.id.clone().ok_or(RepositoryError::NotFound)?;
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(id, record.clone());
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
        if record.status == LeadStatus::Converted {
            return Err(RepositoryError::Conflict);
        }
        record.status = LeadStatus::Converted;

        Ok(ConversionResult {
            lead_id: id.clone(),
            account_id: options.create_account.then(|| self.next_id("acct")),
            contact_id: options.create_contact.then(|| self.next_id("cont")),
            opportunity_id: options.create_opportunity.then(|| self.next_id("opp")),
        })
    }
}

/// Matches against the leads held by the in-memory repository.
///
/// Same email blocks; same phone, or same name at the same company, warns.
pub(crate) struct InMemoryDuplicateChecker {
    repository: Arc<InMemoryLeadRepository>,
}

impl InMemoryDuplicateChecker {
    pub(crate) fn new(repository: Arc<InMemoryLeadRepository>) -> Self {
        Self { repository }
    }
}

fn normalized(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(|raw| raw.trim().to_lowercase())
        .filter(|raw| !raw.is_empty())
}

fn phone_digits(value: &Option<String>) -> Option<String> {
    let digits: String = value
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    (digits.len() >= MIN_PHONE_DIGITS).then_some(digits)
}

fn same(left: Option<String>, right: Option<String>) -> bool {
    matches!((left, right), (Some(left), Some(right)) if left == right)
}

impl DuplicateChecker for InMemoryDuplicateChecker {
    fn check(
        &self,
        request: &DuplicateCheckRequest,
    ) -> Result<DuplicateCheckResult, CollaboratorError> {
        let mut matches = Vec::new();

        for record in self.repository.snapshot() {
            let Some(id) = record.id.clone() else {
                continue;
            };
            if request.exclude_lead_id.as_ref() == Some(&id) {
                continue;
            }
            let identity = &record.identity;

            let mut matched_on = Vec::new();
            let mut level = MatchLevel::Warning;
            if same(normalized(&request.email), normalized(&identity.email)) {
                matched_on.push("email".to_string());
                level = MatchLevel::Block;
            }
            if same(phone_digits(&request.phone), phone_digits(&identity.phone)) {
                matched_on.push("phone".to_string());
            }
            if same(normalized(&request.first_name), normalized(&identity.first_name))
                && same(normalized(&request.last_name), normalized(&identity.last_name))
                && same(
                    normalized(&request.company_name),
                    normalized(&identity.company_name),
                )
            {
                matched_on.push("name and company".to_string());
            }

            if !matched_on.is_empty() {
                matches.push(DuplicateCandidate {
                    lead_id: id,
                    name: record.display_name(),
                    company_name: identity.company_name.clone(),
                    match_level: level,
                    matched_on,
                });
            }
        }

        Ok(DuplicateCheckResult {
            is_blocked: matches
                .iter()
                .any(|candidate| candidate.match_level == MatchLevel::Block),
            has_warnings: matches
                .iter()
                .any(|candidate| candidate.match_level == MatchLevel::Warning),
            matches,
        })
    }
}

/// Placeholder scorer used until an AI scoring endpoint is wired in.
pub(crate) struct UnconfiguredAiScorer;

impl AiScorer for UnconfiguredAiScorer {
    fn score(&self, _record: &LeadRecord) -> Result<AiScoreResult, CollaboratorError> {
        Err(CollaboratorError::Unavailable(
            "no AI scoring endpoint configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_leads::workflows::leads::LeadIdentity;

    fn stored(id: &str, email: &str, phone: &str) -> LeadRecord {
        LeadRecord {
            id: Some(LeadId(id.to_string())),
            ..LeadRecord::new(LeadIdentity {
                first_name: Some("Tomas".to_string()),
                last_name: Some("Brandt".to_string()),
                email: Some(email.to_string()),
                phone: Some(phone.to_string()),
                company_name: Some("Brandt Mills".to_string()),
                ..LeadIdentity::default()
            })
        }
    }

    fn checker_with(records: Vec<LeadRecord>) -> InMemoryDuplicateChecker {
        let repository = Arc::new(InMemoryLeadRepository::default());
        for record in records {
            repository.save(record).expect("seed");
        }
        InMemoryDuplicateChecker::new(repository)
    }

    #[test]
    fn email_match_blocks() {
        let checker = checker_with(vec![stored("lead-1", "tomas@brandt.example", "555 0100")]);
        let result = checker
            .check(&DuplicateCheckRequest {
                email: Some(" Tomas@Brandt.example ".to_string()),
                ..DuplicateCheckRequest::default()
            })
            .expect("check");
        assert!(result.is_blocked);
        assert_eq!(result.matches[0].matched_on, vec!["email"]);
    }

    #[test]
    fn phone_match_warns_and_own_record_is_excluded() {
        let checker = checker_with(vec![stored("lead-1", "a@brandt.example", "+1 (515) 555-0100")]);
        let request = DuplicateCheckRequest {
            phone: Some("1.515.555.0100".to_string()),
            ..DuplicateCheckRequest::default()
        };
        let result = checker.check(&request).expect("check");
        assert!(!result.is_blocked);
        assert!(result.has_warnings);

        let result = checker
            .check(&DuplicateCheckRequest {
                exclude_lead_id: Some(LeadId("lead-1".to_string())),
                ..request
            })
            .expect("check");
        assert_eq!(result, DuplicateCheckResult::clear());
    }

    #[test]
    fn convert_assigns_ids_once() {
        let repository = InMemoryLeadRepository::default();
        repository
            .save(stored("lead-9", "x@brandt.example", ""))
            .expect("seed");
        let id = LeadId("lead-9".to_string());

        let result = repository
            .convert(&id, &ConversionOptions::default())
            .expect("converted");
        assert_eq!(result.account_id.as_deref(), Some("acct-000001"));
        assert_eq!(result.opportunity_id.as_deref(), Some("opp-000003"));
        assert!(matches!(
            repository.convert(&id, &ConversionOptions::default()),
            Err(RepositoryError::Conflict)
        ));
    }
}
