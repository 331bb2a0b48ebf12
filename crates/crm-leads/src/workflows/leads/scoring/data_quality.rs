use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::super::domain::{present, LeadIdentity};
use super::clamp_score;

/// Tenant-configurable weight of one identity signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadDataWeight {
    pub key: String,
    pub weight: f64,
}

impl LeadDataWeight {
    pub fn new(key: impl Into<String>, weight: f64) -> Self {
        Self {
            key: key.into(),
            weight,
        }
    }
}

/// Identity signals that earn data-quality weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadDataSignal {
    /// Earned only when both first and last name are present.
    FirstNameLastName,
    Email,
    Phone,
    CompanyName,
    JobTitle,
    Source,
}

impl LeadDataSignal {
    pub const ALL: [LeadDataSignal; 6] = [
        LeadDataSignal::FirstNameLastName,
        LeadDataSignal::Email,
        LeadDataSignal::Phone,
        LeadDataSignal::CompanyName,
        LeadDataSignal::JobTitle,
        LeadDataSignal::Source,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            LeadDataSignal::FirstNameLastName => "firstNameLastName",
            LeadDataSignal::Email => "email",
            LeadDataSignal::Phone => "phone",
            LeadDataSignal::CompanyName => "companyName",
            LeadDataSignal::JobTitle => "jobTitle",
            LeadDataSignal::Source => "source",
        }
    }

    pub const fn default_weight(self) -> f64 {
        match self {
            LeadDataSignal::FirstNameLastName => 16.0,
            LeadDataSignal::Email => 24.0,
            LeadDataSignal::Phone => 24.0,
            LeadDataSignal::CompanyName => 16.0,
            LeadDataSignal::JobTitle => 12.0,
            LeadDataSignal::Source => 8.0,
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|signal| signal.key().eq_ignore_ascii_case(raw))
    }

    fn is_present(self, identity: &LeadIdentity) -> bool {
        match self {
            LeadDataSignal::FirstNameLastName => {
                present(&identity.first_name) && present(&identity.last_name)
            }
            LeadDataSignal::Email => present(&identity.email),
            LeadDataSignal::Phone => present(&identity.phone),
            LeadDataSignal::CompanyName => present(&identity.company_name),
            LeadDataSignal::JobTitle => present(&identity.job_title),
            LeadDataSignal::Source => present(&identity.source),
        }
    }
}

/// Resolved weight for one signal after tenant overrides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalWeight {
    pub signal: LeadDataSignal,
    pub weight: f64,
}

pub fn default_lead_data_weights() -> Vec<LeadDataWeight> {
    LeadDataSignal::ALL
        .into_iter()
        .map(|signal| LeadDataWeight::new(signal.key(), signal.default_weight()))
        .collect()
}

fn default_signal_weights() -> Vec<SignalWeight> {
    LeadDataSignal::ALL
        .into_iter()
        .map(|signal| SignalWeight {
            signal,
            weight: signal.default_weight(),
        })
        .collect()
}

/// Overlay tenant weights onto the defaults.
///
/// Unknown keys are ignored, negative or non-finite weights count as zero, later entries win
/// over earlier ones for the same key, and a configuration whose total is not positive falls
/// back to the full default set.
pub fn resolve_weights(configured: &[LeadDataWeight]) -> Vec<SignalWeight> {
    let mut overrides = HashMap::new();
    for item in configured {
        if let Some(signal) = LeadDataSignal::from_key(&item.key) {
            let weight = if item.weight.is_finite() {
                item.weight.max(0.0)
            } else {
                0.0
            };
            overrides.insert(signal, weight);
        }
    }

    let resolved: Vec<SignalWeight> = LeadDataSignal::ALL
        .into_iter()
        .map(|signal| SignalWeight {
            signal,
            weight: overrides
                .get(&signal)
                .copied()
                .unwrap_or_else(|| signal.default_weight()),
        })
        .collect();

    let total: f64 = resolved.iter().map(|item| item.weight).sum();
    if total <= 0.0 {
        return default_signal_weights();
    }
    resolved
}

/// Completeness of the lead's identity data, normalized against the total weight.
pub fn score_data_quality(identity: &LeadIdentity, weights: &[SignalWeight]) -> u8 {
    if !identity.has_any_signal() {
        return 0;
    }

    let total: f64 = weights.iter().map(|item| item.weight).sum();
    if total <= 0.0 {
        return 0;
    }

    let earned: f64 = weights
        .iter()
        .filter(|item| item.signal.is_present(identity))
        .map(|item| item.weight)
        .sum();

    clamp_score(((earned / total) * 100.0).round() as i64)
}
