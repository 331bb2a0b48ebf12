use serde::{Deserialize, Serialize};

/// Reported lead scores, all in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadScoreResult {
    pub buyer_data_quality_score100: u8,
    /// `None` while qualification has not started.
    pub qualification_raw_score100: Option<u8>,
    pub qualification_score100: u8,
    pub lead_contribution_score100: u8,
    pub qualification_contribution_score100: u8,
    /// The number persisted as the lead's score. This is the data-quality score alone;
    /// qualification is reported but not folded in.
    pub final_lead_score: u8,
}

pub fn compose(data_quality: u8, qualification_raw: Option<u8>) -> LeadScoreResult {
    let qualification = qualification_raw.unwrap_or(0);

    LeadScoreResult {
        buyer_data_quality_score100: data_quality,
        qualification_raw_score100: qualification_raw,
        qualification_score100: qualification,
        lead_contribution_score100: data_quality,
        qualification_contribution_score100: qualification,
        final_lead_score: data_quality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_score_is_data_quality_only() {
        let result = compose(40, Some(90));
        assert_eq!(result.final_lead_score, 40);
        assert_eq!(result.qualification_score100, 90);
        assert_eq!(result.qualification_contribution_score100, 90);
        assert_eq!(result.lead_contribution_score100, 40);
    }

    #[test]
    fn missing_qualification_reports_zero_but_keeps_raw_null() {
        let result = compose(72, None);
        assert_eq!(result.qualification_raw_score100, None);
        assert_eq!(result.qualification_score100, 0);

        let json = serde_json::to_value(result).expect("serializes");
        assert!(json["qualificationRawScore100"].is_null());
        assert_eq!(json["buyerDataQualityScore100"], 72);
    }
}
