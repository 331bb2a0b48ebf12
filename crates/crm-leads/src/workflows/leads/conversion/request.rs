use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::super::domain::LeadRecord;

/// Deal velocity signal selected on the convert form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Velocity {
    Fast,
    #[default]
    Normal,
    Slow,
}

impl Velocity {
    /// Case-insensitive; anything unrecognized reads as `Normal`.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(raw) if raw.eq_ignore_ascii_case("fast") => Velocity::Fast,
            Some(raw) if raw.eq_ignore_ascii_case("slow") => Velocity::Slow,
            _ => Velocity::Normal,
        }
    }
}

impl<'de> Deserialize<'de> for Velocity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::parse_or_default(raw.as_deref()))
    }
}

/// Transient deal attributes used to pick the conversion threshold. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionContext {
    pub segment: String,
    pub deal_type: String,
    pub stage: String,
    pub is_competitive: bool,
    pub has_executive_champion: bool,
    pub is_strategic: bool,
    pub velocity: Velocity,
    pub manager_approved: bool,
    pub override_reason: Option<String>,
}

impl ConversionContext {
    pub fn new(
        segment: impl Into<String>,
        deal_type: impl Into<String>,
        stage: impl Into<String>,
    ) -> Self {
        Self {
            segment: segment.into(),
            deal_type: deal_type.into(),
            stage: stage.into(),
            ..Self::default()
        }
    }

    pub fn has_override_reason(&self) -> bool {
        self.override_reason
            .as_deref()
            .map(|reason| !reason.trim().is_empty())
            .unwrap_or(false)
    }
}

/// What the conversion creates from the lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionOptions {
    pub create_account: bool,
    pub account_name: String,
    pub create_contact: bool,
    pub create_opportunity: bool,
    pub opportunity_name: String,
    pub amount: f64,
    pub expected_close_date: Option<NaiveDate>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            create_account: true,
            account_name: String::new(),
            create_contact: true,
            create_opportunity: true,
            opportunity_name: String::new(),
            amount: 0.0,
            expected_close_date: None,
        }
    }
}

impl ConversionOptions {
    /// Defaults prefilled from the lead: account named after the company (or the lead itself).
    pub fn for_lead(record: &LeadRecord) -> Self {
        let account_name = record
            .identity
            .company()
            .map(str::to_string)
            .unwrap_or_else(|| record.display_name());
        let opportunity_name = format!("{account_name} Opportunity");

        Self {
            account_name,
            opportunity_name,
            ..Self::default()
        }
    }

    /// An opportunity cannot be created without an account to hang it on.
    pub fn is_consistent(&self) -> bool {
        !(self.create_opportunity && !self.create_account)
    }
}
