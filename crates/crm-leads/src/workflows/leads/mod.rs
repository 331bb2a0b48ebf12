//! Lead qualification: data-quality and factor scoring, evidence confidence, conversion
//! threshold resolution and gating, and the duplicate guard that runs before every save.
//!
//! Scoring and gating are pure functions of their inputs. Persistence, duplicate detection,
//! tenant settings and AI scoring are collaborators behind the traits in [`repository`] and
//! [`duplicates`].

pub mod catalogue;
pub mod conversion;
pub mod domain;
pub mod duplicates;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub(crate) mod validation;
pub mod worksheet;

#[cfg(test)]
mod tests;

pub use catalogue::{
    factor_max_points, BudgetAvailability, BuyingTimeline, EconomicBuyer, EvidenceTone,
    FactorOption, IcpFit, ProblemSeverity, ReadinessToSpend, UnrecognizedOption,
};
pub use conversion::{
    ConversionContext, ConversionDecision, ConversionEvaluator, ConversionOptions,
    ConversionOutcome, ConversionState, QualificationBand, QualificationPolicy,
    ThresholdModifier, ThresholdResolution, ThresholdRule, Velocity,
};
pub use domain::{
    CqvsGroup, FactorAssessment, FactorSelection, LeadId, LeadIdentity, LeadRecord,
    QualificationFactorKind, QualificationFactors, ScoreMode,
};
pub use duplicates::{
    gate_save, DuplicateCandidate, DuplicateCheckRequest, DuplicateCheckResult,
    DuplicateChecker, DuplicateGuard, MatchLevel, SaveGate, SaveSession,
};
pub use lifecycle::LeadStatus;
pub use repository::{
    AiScoreResult, AiScorer, CollaboratorError, ConversionResult, LeadRepository,
    ProblemDetails, RepositoryError, SaveError, TenantSettings,
};
pub use router::{lead_router, SaveLeadRequest};
pub use scoring::{
    AssessmentSource, ConfidenceLabel, EvidenceSummary, LeadDataWeight, LeadEvaluation,
    LeadScoreResult, LeadScoringEngine, ScoreComponent, WeakestSignal,
};
pub use service::{
    ConversionRequest, LeadQualificationService, LeadServiceError, LeadView, SaveOutcome,
};
pub use validation::{validate_identity, LeadValidationError};
pub use worksheet::LeadWorksheet;
