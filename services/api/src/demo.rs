use crate::infra::{InMemoryDuplicateChecker, InMemoryLeadRepository, UnconfiguredAiScorer};
use clap::Args;
use crm_leads::config::{AppConfig, TenantSettingsDocument};
use crm_leads::error::AppError;
use crm_leads::telemetry::{self, LogSink};
use crm_leads::workflows::leads::{
    BudgetAvailability, BuyingTimeline, ConversionContext, ConversionRequest, EconomicBuyer,
    FactorSelection, IcpFit, LeadEvaluation, LeadIdentity, LeadQualificationService, LeadRecord,
    LeadScoringEngine, LeadStatus, ProblemSeverity, QualificationFactors, ReadinessToSpend,
    SaveOutcome, SaveSession, Velocity,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Lead JSON document (identity fields plus factor selections)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Tenant settings JSON; defaults to CRM_TENANT_SETTINGS, then the built-in policy
    #[arg(long)]
    pub(crate) settings: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Tenant settings JSON; defaults to CRM_TENANT_SETTINGS, then the built-in policy
    #[arg(long)]
    pub(crate) settings: Option<PathBuf>,
    /// Skip the conversion portion of the demo.
    #[arg(long)]
    pub(crate) skip_conversion: bool,
}

/// Loads configuration, installs logging on `sink` and reads the tenant settings.
///
/// An explicit `--settings` path wins over `CRM_TENANT_SETTINGS`.
fn prepare(settings: Option<PathBuf>, sink: LogSink) -> Result<TenantSettingsDocument, AppError> {
    let mut config = AppConfig::load()?;
    telemetry::init_with_sink(&config.telemetry, sink)?;
    if settings.is_some() {
        config.tenant.settings_path = settings;
    }
    Ok(config.tenant.load_settings()?)
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let settings = prepare(args.settings, LogSink::Stderr)?;
    let raw = fs::read_to_string(&args.input)?;
    let lead: LeadRecord = serde_json::from_str(&raw)?;

    let engine = LeadScoringEngine::new(&settings.lead_data_weights);
    let evaluation = engine.evaluate(&lead.identity, &lead.factors);
    println!("{}", serde_json::to_string_pretty(&evaluation)?);
    Ok(())
}

fn sample_lead() -> LeadRecord {
    LeadRecord {
        status: LeadStatus::Qualified,
        factors: QualificationFactors {
            budget_availability: FactorSelection::new(BudgetAvailability::IdentifiedUnapproved)
                .with_evidence("Range shared on discovery call"),
            readiness_to_spend: FactorSelection::new(ReadinessToSpend::ActivelyEvaluating),
            buying_timeline: FactorSelection::new(BuyingTimeline::TargetDateVerbal),
            problem_severity: FactorSelection::new(ProblemSeverity::CriticalImpact)
                .with_evidence("Cold-chain losses reported by ops"),
            economic_buyer: FactorSelection::new(EconomicBuyer::IdentifiedNotEngaged),
            icp_fit: FactorSelection::new(IcpFit::Strong),
        },
        ..LeadRecord::new(LeadIdentity {
            first_name: Some("Elena".to_string()),
            last_name: Some("Vasquez".to_string()),
            email: Some("elena.vasquez@northwind-cold.example".to_string()),
            phone: Some("+1 515 555 0142".to_string()),
            company_name: Some("Northwind Cold Storage".to_string()),
            job_title: Some("Director of Operations".to_string()),
            source: Some("Trade show".to_string()),
        })
    }
}

fn render_evaluation(evaluation: &LeadEvaluation) {
    let scores = &evaluation.scores;
    println!(
        "  Lead score {}/100 (data quality {}, qualification {})",
        scores.final_lead_score,
        scores.buyer_data_quality_score100,
        scores
            .qualification_raw_score100
            .map(|score| score.to_string())
            .unwrap_or_else(|| "not started".to_string())
    );
    for component in &evaluation.breakdown {
        println!(
            "    - {}: {}/{}",
            component.label, component.score, component.max_score
        );
    }

    let evidence = &evaluation.evidence;
    println!(
        "  Confidence {} ({:.0}%), truth coverage {:.0}%, {} assumption(s) outstanding",
        evidence.confidence_label.label(),
        evidence.qualification_confidence * 100.0,
        evidence.truth_coverage * 100.0,
        evidence.assumptions_outstanding
    );
    if let Some(weakest) = &evidence.weakest_signal {
        println!("  Weakest signal: {}", weakest.describe());
    }
    for suggestion in &evidence.next_evidence_suggestions {
        println!("    next: {suggestion}");
    }
    for flag in &evidence.risk_flags {
        println!("    risk: {flag}");
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let settings = prepare(args.settings, LogSink::Stdout)?;
    let repository = Arc::new(InMemoryLeadRepository::default());
    let service = LeadQualificationService::new(
        repository.clone(),
        Arc::new(InMemoryDuplicateChecker::new(repository)),
        Arc::new(settings),
        Arc::new(UnconfiguredAiScorer),
    );

    println!("Lead qualification demo");
    let lead = sample_lead();
    println!("\nScoring {}", lead.display_name());
    render_evaluation(&service.evaluate(&lead.identity, &lead.factors));

    println!("\nDuplicate guard");
    let session = SaveSession::new();
    let outcome = service.save(&session, lead.clone())?;
    println!("  first save: {}", outcome.summary());
    let SaveOutcome::Saved { lead: stored } = outcome else {
        return Ok(());
    };

    let mut same_email = lead.clone();
    same_email.identity.first_name = Some("Ellie".to_string());
    println!(
        "  same email: {}",
        service.save(&session, same_email)?.summary()
    );

    let mut same_phone = lead;
    same_phone.identity.email = Some("ops@northwind-cold.example".to_string());
    let outcome = service.save(&session, same_phone)?;
    println!("  same phone: {}", outcome.summary());
    if matches!(outcome, SaveOutcome::AwaitingConfirmation { .. }) {
        service.discard_pending_save(&session);
        println!("  pending save discarded");
    }

    if args.skip_conversion {
        return Ok(());
    }

    let Some(lead_id) = stored.id.clone() else {
        return Ok(());
    };
    println!("\nConversion gate for score {}/100", stored.score);
    let scenarios = [
        ("Enterprise, competitive", ConversionContext {
            is_competitive: true,
            ..ConversionContext::new("Enterprise", "New Business", "Proposal")
        }),
        ("Mid-market, executive champion, fast", ConversionContext {
            has_executive_champion: true,
            velocity: Velocity::Fast,
            ..ConversionContext::new("Mid-Market", "New Business", "Proposal")
        }),
        ("Enterprise, competitive, override reason", ConversionContext {
            is_competitive: true,
            manager_approved: true,
            override_reason: Some("Replacing a failing incumbent this quarter".to_string()),
            ..ConversionContext::new("Enterprise", "New Business", "Proposal")
        }),
    ];

    let mut approved = None;
    for (label, context) in scenarios {
        let request = ConversionRequest {
            context,
            options: None,
        };
        let outcome = service.check_conversion(&lead_id, &request)?;
        let decision = &outcome.decision;
        println!(
            "  {label}: threshold {} -> {} [{}] {}; {}",
            outcome.resolution.base_threshold,
            decision.adjusted_threshold,
            decision.band.label(),
            decision.message,
            decision.state.summary()
        );
        if decision.can_convert && approved.is_none() {
            approved = Some(request);
        }
    }

    match approved {
        Some(request) => {
            let result = service.convert(&lead_id, &request)?;
            println!(
                "  converted: account {}, contact {}, opportunity {}",
                result.account_id.as_deref().unwrap_or("-"),
                result.contact_id.as_deref().unwrap_or("-"),
                result.opportunity_id.as_deref().unwrap_or("-")
            );
        }
        None => println!("  no scenario cleared the gate"),
    }

    if let Err(error) = service.ai_score(&lead_id) {
        println!("\nAI score: {}", error.user_message());
    }

    Ok(())
}
