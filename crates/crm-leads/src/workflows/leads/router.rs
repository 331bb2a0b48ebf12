use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{LeadId, LeadRecord};
use super::duplicates::{DuplicateChecker, SaveSession};
use super::repository::{AiScorer, LeadRepository, RepositoryError, SaveError, TenantSettings};
use super::service::{ConversionRequest, LeadQualificationService, LeadServiceError, SaveOutcome};

type SharedService<R, D, S, A> = Arc<LeadQualificationService<R, D, S, A>>;

/// Save payload; `confirmDuplicates` saves through duplicate warnings in one call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLeadRequest {
    pub lead: LeadRecord,
    #[serde(default)]
    pub confirm_duplicates: bool,
}

/// Router builder exposing the lead scoring, save and conversion endpoints.
pub fn lead_router<R, D, S, A>(service: SharedService<R, D, S, A>) -> Router
where
    R: LeadRepository + 'static,
    D: DuplicateChecker + 'static,
    S: TenantSettings + 'static,
    A: AiScorer + 'static,
{
    Router::new()
        .route("/api/v1/leads/score", post(score_handler::<R, D, S, A>))
        .route("/api/v1/leads", post(save_handler::<R, D, S, A>))
        .route("/api/v1/leads/:lead_id", get(view_handler::<R, D, S, A>))
        .route(
            "/api/v1/leads/:lead_id/conversion-check",
            post(conversion_check_handler::<R, D, S, A>),
        )
        .route(
            "/api/v1/leads/:lead_id/convert",
            post(convert_handler::<R, D, S, A>),
        )
        .route(
            "/api/v1/leads/:lead_id/ai-score",
            post(ai_score_handler::<R, D, S, A>),
        )
        .with_state(service)
}

pub(crate) async fn score_handler<R, D, S, A>(
    State(service): State<SharedService<R, D, S, A>>,
    axum::Json(lead): axum::Json<LeadRecord>,
) -> Response
where
    R: LeadRepository + 'static,
    D: DuplicateChecker + 'static,
    S: TenantSettings + 'static,
    A: AiScorer + 'static,
{
    let evaluation = service.evaluate(&lead.identity, &lead.factors);
    (StatusCode::OK, axum::Json(evaluation)).into_response()
}

pub(crate) async fn save_handler<R, D, S, A>(
    State(service): State<SharedService<R, D, S, A>>,
    axum::Json(request): axum::Json<SaveLeadRequest>,
) -> Response
where
    R: LeadRepository + 'static,
    D: DuplicateChecker + 'static,
    S: TenantSettings + 'static,
    A: AiScorer + 'static,
{
    let session = SaveSession::new();
    let outcome = match service.save(&session, request.lead) {
        Ok(SaveOutcome::AwaitingConfirmation { .. }) if request.confirm_duplicates => service
            .confirm_pending_save(&session)
            .map(|lead| SaveOutcome::Saved { lead }),
        other => other,
    };

    match outcome {
        Ok(outcome @ SaveOutcome::Saved { .. }) => {
            (StatusCode::CREATED, axum::Json(outcome)).into_response()
        }
        Ok(outcome @ SaveOutcome::AwaitingConfirmation { .. }) => {
            (StatusCode::OK, axum::Json(outcome)).into_response()
        }
        Ok(outcome @ SaveOutcome::Blocked { .. }) => {
            (StatusCode::CONFLICT, axum::Json(outcome)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn view_handler<R, D, S, A>(
    State(service): State<SharedService<R, D, S, A>>,
    Path(lead_id): Path<String>,
) -> Response
where
    R: LeadRepository + 'static,
    D: DuplicateChecker + 'static,
    S: TenantSettings + 'static,
    A: AiScorer + 'static,
{
    match service.view(&LeadId(lead_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn conversion_check_handler<R, D, S, A>(
    State(service): State<SharedService<R, D, S, A>>,
    Path(lead_id): Path<String>,
    axum::Json(request): axum::Json<ConversionRequest>,
) -> Response
where
    R: LeadRepository + 'static,
    D: DuplicateChecker + 'static,
    S: TenantSettings + 'static,
    A: AiScorer + 'static,
{
    match service.check_conversion(&LeadId(lead_id), &request) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn convert_handler<R, D, S, A>(
    State(service): State<SharedService<R, D, S, A>>,
    Path(lead_id): Path<String>,
    axum::Json(request): axum::Json<ConversionRequest>,
) -> Response
where
    R: LeadRepository + 'static,
    D: DuplicateChecker + 'static,
    S: TenantSettings + 'static,
    A: AiScorer + 'static,
{
    match service.convert(&LeadId(lead_id), &request) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn ai_score_handler<R, D, S, A>(
    State(service): State<SharedService<R, D, S, A>>,
    Path(lead_id): Path<String>,
) -> Response
where
    R: LeadRepository + 'static,
    D: DuplicateChecker + 'static,
    S: TenantSettings + 'static,
    A: AiScorer + 'static,
{
    match service.ai_score(&LeadId(lead_id)) {
        Ok(lead) => (StatusCode::OK, axum::Json(lead)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: LeadServiceError) -> Response {
    let status = match &error {
        LeadServiceError::Validation(_) | LeadServiceError::Save(SaveError::Problem(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LeadServiceError::Repository(RepositoryError::NotFound)
        | LeadServiceError::Save(SaveError::Repository(RepositoryError::NotFound)) => {
            StatusCode::NOT_FOUND
        }
        LeadServiceError::ConversionRejected(decision) => {
            let payload = json!({
                "error": error.user_message(),
                "decision": decision,
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
        LeadServiceError::Repository(RepositoryError::Conflict)
        | LeadServiceError::SaveInProgress
        | LeadServiceError::NothingPending
        | LeadServiceError::InvalidStatus(_)
        | LeadServiceError::InvalidTransition { .. } => StatusCode::CONFLICT,
        LeadServiceError::AiScore(_) | LeadServiceError::Save(_) => StatusCode::BAD_GATEWAY,
        LeadServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    let payload = json!({
        "error": error.user_message(),
    });
    (status, axum::Json(payload)).into_response()
}
