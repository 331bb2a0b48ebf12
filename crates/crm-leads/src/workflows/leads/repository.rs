use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::conversion::{ConversionOptions, QualificationPolicy};
use super::domain::{LeadId, LeadRecord};
use super::scoring::LeadDataWeight;

const GENERIC_SAVE_FAILURE: &str = "Unable to save lead.";

/// Persistence boundary for leads. Authentication and storage live behind it.
pub trait LeadRepository: Send + Sync {
    /// Create (no id) or update (with id) a lead, returning the stored copy.
    fn save(&self, record: LeadRecord) -> Result<LeadRecord, SaveError>;
    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError>;
    /// Create the requested account / contact / opportunity and mark the lead converted.
    fn convert(
        &self,
        id: &LeadId,
        options: &ConversionOptions,
    ) -> Result<ConversionResult, RepositoryError>;
}

/// Source of the per-tenant qualification policy and data weights.
pub trait TenantSettings: Send + Sync {
    fn qualification_policy(&self) -> Result<Option<QualificationPolicy>, CollaboratorError>;
    fn lead_data_weights(&self) -> Result<Vec<LeadDataWeight>, CollaboratorError>;
}

/// Remote scorer producing an AI-derived lead score.
pub trait AiScorer: Send + Sync {
    fn score(&self, record: &LeadRecord) -> Result<AiScoreResult, CollaboratorError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Failure of an outbound collaborator call (duplicate check, settings, AI scoring).
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    #[error("collaborator rejected the request: {0}")]
    Rejected(String),
}

/// Structured error body returned by the persistence collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Field name to validation messages.
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ProblemDetails {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            errors: BTreeMap::new(),
        }
    }

    pub fn with_field_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    /// First field-level message, then the title.
    pub fn most_specific(&self) -> Option<&str> {
        self.errors
            .values()
            .flat_map(|messages| messages.iter())
            .map(|message| message.trim())
            .find(|message| !message.is_empty())
            .or_else(|| {
                self.title
                    .as_deref()
                    .map(str::trim)
                    .filter(|title| !title.is_empty())
            })
    }
}

/// Save failure. Transport details are logged, never shown.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("save rejected: {}", .0.most_specific().unwrap_or(GENERIC_SAVE_FAILURE))]
    Problem(ProblemDetails),
    #[error("save transport failure: {0}")]
    Transport(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SaveError {
    /// Message safe to show the user: field error, then title, then a generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            SaveError::Problem(problem) => problem
                .most_specific()
                .unwrap_or(GENERIC_SAVE_FAILURE)
                .to_string(),
            SaveError::Repository(RepositoryError::NotFound) => "Lead not found.".to_string(),
            SaveError::Transport(_) | SaveError::Repository(_) => {
                GENERIC_SAVE_FAILURE.to_string()
            }
        }
    }
}

/// Ids of the records created by a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub lead_id: LeadId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity_id: Option<String>,
}

/// Output of the AI scoring collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiScoreResult {
    pub score: u8,
    pub confidence: f32,
    pub rationale: String,
    #[serde(rename = "scoredAtUtc")]
    pub scored_at: DateTime<Utc>,
}
