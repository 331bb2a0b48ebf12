//! Duplicate guard that runs before every lead save.
//!
//! The checker is a soft dependency: its failures never stop a save. [`gate_save`] is the
//! single place that maps a check result (or error) onto proceed / confirm / block.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{LeadId, LeadRecord};
use super::repository::CollaboratorError;

/// Identity fields sent to the duplicate checker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCheckRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    /// Set on update so the lead does not match itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_lead_id: Option<LeadId>,
}

impl DuplicateCheckRequest {
    pub fn for_record(record: &LeadRecord) -> Self {
        let identity = &record.identity;
        Self {
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            email: identity.email.clone(),
            phone: identity.phone.clone(),
            company_name: identity.company_name.clone(),
            exclude_lead_id: record.id.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchLevel {
    Block,
    Warning,
}

/// Existing lead that resembles the one being saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCandidate {
    pub lead_id: LeadId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub match_level: MatchLevel,
    #[serde(default)]
    pub matched_on: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCheckResult {
    pub is_blocked: bool,
    pub has_warnings: bool,
    #[serde(default)]
    pub matches: Vec<DuplicateCandidate>,
}

impl DuplicateCheckResult {
    pub fn clear() -> Self {
        Self::default()
    }

    pub fn blocking_matches(&self) -> Vec<DuplicateCandidate> {
        self.matches_at(MatchLevel::Block)
    }

    pub fn warning_matches(&self) -> Vec<DuplicateCandidate> {
        self.matches_at(MatchLevel::Warning)
    }

    fn matches_at(&self, level: MatchLevel) -> Vec<DuplicateCandidate> {
        let selected: Vec<_> = self
            .matches
            .iter()
            .filter(|candidate| candidate.match_level == level)
            .cloned()
            .collect();
        // Checkers may flag the result without tagging individual matches.
        if selected.is_empty() {
            self.matches.clone()
        } else {
            selected
        }
    }
}

/// Outbound duplicate detection service.
pub trait DuplicateChecker: Send + Sync {
    fn check(&self, request: &DuplicateCheckRequest)
        -> Result<DuplicateCheckResult, CollaboratorError>;
}

/// What the save flow should do after the duplicate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveGate {
    Proceed,
    /// Hold the payload until the user confirms "save anyway".
    Confirm(Vec<DuplicateCandidate>),
    /// Abort; the user must resolve the existing record first.
    Block(Vec<DuplicateCandidate>),
}

impl SaveGate {
    pub fn summary(&self) -> String {
        match self {
            SaveGate::Proceed => "no duplicates found".to_string(),
            SaveGate::Confirm(matches) => {
                format!("{} possible duplicate(s) need confirmation", matches.len())
            }
            SaveGate::Block(matches) => format!("blocked by {} duplicate(s)", matches.len()),
        }
    }
}

/// Fail-open policy: a checker error always maps to [`SaveGate::Proceed`].
pub fn gate_save(result: Result<DuplicateCheckResult, CollaboratorError>) -> SaveGate {
    match result {
        Ok(result) if result.is_blocked => SaveGate::Block(result.blocking_matches()),
        Ok(result) if result.has_warnings => SaveGate::Confirm(result.warning_matches()),
        Ok(_) => SaveGate::Proceed,
        Err(error) => {
            warn!(%error, "duplicate check failed; saving without it");
            SaveGate::Proceed
        }
    }
}

/// Runs the checker and applies [`gate_save`].
pub struct DuplicateGuard<D> {
    checker: Arc<D>,
}

impl<D> DuplicateGuard<D>
where
    D: DuplicateChecker,
{
    pub fn new(checker: Arc<D>) -> Self {
        Self { checker }
    }

    pub fn inspect(&self, record: &LeadRecord) -> SaveGate {
        let request = DuplicateCheckRequest::for_record(record);
        gate_save(self.checker.check(&request))
    }
}

/// Per-form save state: the in-flight flag and the payload awaiting duplicate confirmation.
#[derive(Debug, Default)]
pub struct SaveSession {
    saving: AtomicBool,
    pending: Mutex<Option<LeadRecord>>,
}

impl SaveSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the session for one save; `None` while another save is running.
    pub fn begin(&self) -> Option<SavingGuard<'_>> {
        self.saving
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SavingGuard { session: self })
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    pub fn hold(&self, record: LeadRecord) {
        *self.pending.lock().expect("pending save mutex poisoned") = Some(record);
    }

    pub fn take_pending(&self) -> Option<LeadRecord> {
        self.pending.lock().expect("pending save mutex poisoned").take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .expect("pending save mutex poisoned")
            .is_some()
    }
}

/// Clears the saving flag on drop, including on early returns.
#[derive(Debug)]
pub struct SavingGuard<'a> {
    session: &'a SaveSession,
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.session.saving.store(false, Ordering::Release);
    }
}
