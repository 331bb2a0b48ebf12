use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::workflows::leads::conversion::QualificationPolicy;
use crate::workflows::leads::repository::{CollaboratorError, TenantSettings};
use crate::workflows::leads::scoring::LeadDataWeight;

/// Tenant settings as stored by the workspace settings pages.
///
/// Both members are optional: an absent policy means the built-in default policy applies, and
/// an empty weight list means the built-in lead data weights apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantSettingsDocument {
    pub qualification_policy: Option<QualificationPolicy>,
    pub lead_data_weights: Vec<LeadDataWeight>,
}

impl TenantSettingsDocument {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| ConfigError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// A loaded document serves as a static settings source.
impl TenantSettings for TenantSettingsDocument {
    fn qualification_policy(&self) -> Result<Option<QualificationPolicy>, CollaboratorError> {
        Ok(self.qualification_policy.clone())
    }

    fn lead_data_weights(&self) -> Result<Vec<LeadDataWeight>, CollaboratorError> {
        Ok(self.lead_data_weights.clone())
    }
}
