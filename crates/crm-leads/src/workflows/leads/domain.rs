use serde::{Deserialize, Serialize};

use super::catalogue::{
    BudgetAvailability, BuyingTimeline, EconomicBuyer, EvidenceTone, FactorOption, IcpFit,
    ProblemSeverity, ReadinessToSpend,
};
use super::lifecycle::LeadStatus;
use super::repository::AiScoreResult;
use super::scoring::evidence::EvidenceSummary;

/// Identifier wrapper for persisted leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeadId(pub String);

impl std::fmt::Display for LeadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity and contact fields captured on the lead form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadIdentity {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub source: Option<String>,
}

pub(crate) fn present(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map(|raw| !raw.trim().is_empty())
        .unwrap_or(false)
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|raw| !raw.is_empty())
}

impl LeadIdentity {
    /// True when at least one identity field carries non-whitespace content.
    pub fn has_any_signal(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.company_name,
            &self.job_title,
            &self.source,
        ]
        .into_iter()
        .any(present)
    }

    pub fn full_name(&self) -> String {
        [trimmed(&self.first_name), trimmed(&self.last_name)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn company(&self) -> Option<&str> {
        trimmed(&self.company_name)
    }
}

/// The six sales-qualification factors, in their fixed evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QualificationFactorKind {
    BudgetAvailability,
    ReadinessToSpend,
    BuyingTimeline,
    ProblemSeverity,
    EconomicBuyer,
    IcpFit,
}

impl QualificationFactorKind {
    pub const ORDERED: [QualificationFactorKind; 6] = [
        QualificationFactorKind::BudgetAvailability,
        QualificationFactorKind::ReadinessToSpend,
        QualificationFactorKind::BuyingTimeline,
        QualificationFactorKind::ProblemSeverity,
        QualificationFactorKind::EconomicBuyer,
        QualificationFactorKind::IcpFit,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            QualificationFactorKind::BudgetAvailability => "Budget availability",
            QualificationFactorKind::ReadinessToSpend => "Readiness to spend",
            QualificationFactorKind::BuyingTimeline => "Buying timeline",
            QualificationFactorKind::ProblemSeverity => "Problem severity",
            QualificationFactorKind::EconomicBuyer => "Economic buyer",
            QualificationFactorKind::IcpFit => "ICP fit",
        }
    }

    /// Budget, timeline and economic buyer drive the outstanding-assumption count.
    pub const fn is_high_impact(self) -> bool {
        matches!(
            self,
            QualificationFactorKind::BudgetAvailability
                | QualificationFactorKind::BuyingTimeline
                | QualificationFactorKind::EconomicBuyer
        )
    }

    pub const fn cqvs_group(self) -> CqvsGroup {
        match self {
            QualificationFactorKind::IcpFit => CqvsGroup::CompanyFit,
            QualificationFactorKind::BudgetAvailability
            | QualificationFactorKind::ReadinessToSpend
            | QualificationFactorKind::BuyingTimeline => CqvsGroup::QualificationReadiness,
            QualificationFactorKind::ProblemSeverity => CqvsGroup::ValueProblem,
            QualificationFactorKind::EconomicBuyer => CqvsGroup::StakeholderAccess,
        }
    }
}

/// Display grouping of the factors (Company fit, Qualification readiness, Value, Stakeholders).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CqvsGroup {
    CompanyFit,
    QualificationReadiness,
    ValueProblem,
    StakeholderAccess,
}

impl CqvsGroup {
    pub const fn code(self) -> char {
        match self {
            CqvsGroup::CompanyFit => 'C',
            CqvsGroup::QualificationReadiness => 'Q',
            CqvsGroup::ValueProblem => 'V',
            CqvsGroup::StakeholderAccess => 'S',
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CqvsGroup::CompanyFit => "Company fit",
            CqvsGroup::QualificationReadiness => "Qualification readiness",
            CqvsGroup::ValueProblem => "Value / problem severity",
            CqvsGroup::StakeholderAccess => "Stakeholder access",
        }
    }
}

/// Selected option plus the free-text evidence backing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorSelection<T> {
    pub value: Option<T>,
    pub evidence: Option<String>,
}

impl<T> Default for FactorSelection<T> {
    fn default() -> Self {
        Self {
            value: None,
            evidence: None,
        }
    }
}

impl<T: FactorOption> FactorSelection<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Some(value),
            evidence: None,
        }
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }

    pub fn is_meaningful(&self) -> bool {
        self.value.map(FactorOption::is_meaningful).unwrap_or(false)
    }

    pub fn points(&self) -> u8 {
        self.value.map(FactorOption::points).unwrap_or(0)
    }

    pub fn assess(&self) -> FactorAssessment {
        FactorAssessment {
            kind: T::KIND,
            value: self.value.map(FactorOption::label),
            tone: self
                .value
                .map(FactorOption::tone)
                .unwrap_or(EvidenceTone::Neutral),
            points: self.points(),
            meaningful: self.is_meaningful(),
            has_evidence: present(&self.evidence),
        }
    }
}

/// Flattened view of one factor used by the scorers and the tone classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorAssessment {
    pub kind: QualificationFactorKind,
    pub value: Option<&'static str>,
    pub tone: EvidenceTone,
    pub points: u8,
    pub meaningful: bool,
    pub has_evidence: bool,
}

/// The six qualification factor selections of a lead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QualificationFactors {
    pub budget_availability: FactorSelection<BudgetAvailability>,
    pub readiness_to_spend: FactorSelection<ReadinessToSpend>,
    pub buying_timeline: FactorSelection<BuyingTimeline>,
    pub problem_severity: FactorSelection<ProblemSeverity>,
    pub economic_buyer: FactorSelection<EconomicBuyer>,
    pub icp_fit: FactorSelection<IcpFit>,
}

impl QualificationFactors {
    /// Assessments in [`QualificationFactorKind::ORDERED`] order.
    pub fn assessments(&self) -> [FactorAssessment; 6] {
        [
            self.budget_availability.assess(),
            self.readiness_to_spend.assess(),
            self.buying_timeline.assess(),
            self.problem_severity.assess(),
            self.economic_buyer.assess(),
            self.icp_fit.assess(),
        ]
    }

    pub fn any_meaningful(&self) -> bool {
        self.assessments().iter().any(|factor| factor.meaningful)
    }

    pub fn meaningful_count(&self) -> usize {
        self.assessments()
            .iter()
            .filter(|factor| factor.meaningful)
            .count()
    }
}

/// How the persisted score is currently produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreMode {
    /// Score follows the composite lead score on every edit.
    #[default]
    Auto,
    /// Score was written by the AI scoring collaborator and is frozen until factors change.
    Ai,
}

/// Lead as loaded from and saved to the persistence collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LeadId>,
    #[serde(flatten)]
    pub identity: LeadIdentity,
    #[serde(flatten)]
    pub factors: QualificationFactors,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default)]
    pub score: u8,
    #[serde(default)]
    pub score_mode: ScoreMode,
    /// Confidence metrics computed by the server when the record was last saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_assessment: Option<EvidenceSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_score: Option<AiScoreResult>,
}

impl LeadRecord {
    pub fn new(identity: LeadIdentity) -> Self {
        Self {
            identity,
            ..Self::default()
        }
    }

    pub fn display_name(&self) -> String {
        let name = self.identity.full_name();
        if name.is_empty() {
            self.identity.company().unwrap_or("Unnamed lead").to_string()
        } else {
            name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_signal_ignores_whitespace() {
        let mut identity = LeadIdentity {
            first_name: Some("   ".to_string()),
            source: Some("\t".to_string()),
            ..LeadIdentity::default()
        };
        assert!(!identity.has_any_signal());

        identity.job_title = Some("CFO".to_string());
        assert!(identity.has_any_signal());
    }

    #[test]
    fn unselected_factor_is_neutral_and_not_meaningful() {
        let selection = FactorSelection::<BudgetAvailability>::default();
        let assessment = selection.assess();
        assert_eq!(assessment.tone, EvidenceTone::Neutral);
        assert!(!assessment.meaningful);
        assert_eq!(assessment.points, 0);
        assert_eq!(assessment.kind, QualificationFactorKind::BudgetAvailability);
    }

    #[test]
    fn record_round_trips_through_flat_json() {
        let json = r#"{
            "id": "lead-1",
            "firstName": "Nora",
            "lastName": "Quist",
            "companyName": "Quist Foods",
            "budgetAvailability": { "value": "Budget allocated and approved", "evidence": "PO 4471" },
            "icpFit": { "value": "unknown / not assessed" },
            "status": "Qualified",
            "score": 64
        }"#;

        let record: LeadRecord = serde_json::from_str(json).expect("record parses");
        assert_eq!(record.id, Some(LeadId("lead-1".to_string())));
        assert_eq!(
            record.factors.budget_availability.value,
            Some(BudgetAvailability::AllocatedAndApproved)
        );
        assert_eq!(record.factors.icp_fit.value, Some(IcpFit::Unknown));
        assert_eq!(record.factors.meaningful_count(), 1);
        assert_eq!(record.status, LeadStatus::Qualified);
        assert_eq!(record.display_name(), "Nora Quist");
    }

    #[test]
    fn empty_selection_parses_as_unselected() {
        let selection: FactorSelection<EconomicBuyer> =
            serde_json::from_str("{}").expect("selection parses");
        assert_eq!(selection, FactorSelection::default());

        let selection: FactorSelection<EconomicBuyer> =
            serde_json::from_str(r#"{ "evidence": "Met the CFO" }"#).expect("selection parses");
        assert_eq!(selection.value, None);
        assert_eq!(selection.evidence.as_deref(), Some("Met the CFO"));
    }

    #[test]
    fn record_rejects_unrecognized_factor_values() {
        let json = r#"{ "firstName": "Nora", "buyingTimeline": { "value": "Soonish" } }"#;
        let error = serde_json::from_str::<LeadRecord>(json).expect_err("rejected");
        assert!(error.to_string().contains("Soonish"));
    }

    #[test]
    fn factor_groups_cover_all_cqvs_codes() {
        let codes: String = QualificationFactorKind::ORDERED
            .iter()
            .map(|kind| kind.cqvs_group().code())
            .collect();
        assert_eq!(codes, "QQQVSC");
    }
}
