//! Indicator route handlers.
//!
//! Writes run inside a database transaction that is committed only when the
//! whole operation succeeds; any error drops it, which rolls back.

use crate::{
    core::{
        evaluation::{EvaluationStatus, evaluate_indicator, store_evaluation},
        indicator,
        lookup::FormOptions,
    },
    entities::IndicatorModel,
    errors::{Error, Result},
    web::{
        AppState,
        forms::{IndicatorEditForm, IndicatorForm},
        response::ApiResponse,
    },
};
use axum::{
    Form, Json,
    extract::{Path, State, rejection::FormRejection},
    http::StatusCode,
    response::Redirect,
};
use sea_orm::TransactionTrait;
use serde::Serialize;
use tracing::{debug, info, instrument};

type ApiResult<T> = Result<Json<ApiResponse<T>>>;

/// An indicator together with the option lists its edit form needs.
#[derive(Debug, Serialize)]
pub struct IndicatorWithOptions {
    /// The indicator being edited
    pub indicator: IndicatorModel,
    /// Select options
    pub options: FormOptions,
}

/// Result of an on-demand evaluation.
#[derive(Debug, Serialize)]
pub struct EvaluationResult {
    /// Evaluated indicator
    pub indicator_id: i64,
    /// Computed status
    pub status: EvaluationStatus,
    /// False when automatic evaluation is off and the status was not cached
    pub stored: bool,
}

async fn require_indicator(state: &AppState, id: i64) -> Result<IndicatorModel> {
    indicator::get_indicator(&state.db, id)
        .await?
        .ok_or(Error::IndicatorNotFound { id })
}

fn form_error(rejection: FormRejection) -> Error {
    Error::validation(format!("Invalid form submission: {}", rejection.body_text()))
}

/// `GET /`
pub async fn index() -> Redirect {
    Redirect::to("/kpis")
}

/// `GET /kpis`
#[instrument(skip(state))]
pub async fn list_indicators(State(state): State<AppState>) -> ApiResult<Vec<IndicatorModel>> {
    let indicators = indicator::list_indicators(&state.db).await?;
    debug!("Listing {} indicators", indicators.len());
    Ok(Json(ApiResponse::success(
        indicators,
        "Indicators retrieved successfully",
    )))
}

/// `GET /kpi/create`
#[instrument(skip(state))]
pub async fn create_form(State(state): State<AppState>) -> ApiResult<FormOptions> {
    let options = FormOptions::load(&state.db).await?;
    Ok(Json(ApiResponse::success(options, "Form options loaded")))
}

/// `POST /kpi/create`
#[instrument(skip(state, form))]
pub async fn create_indicator(
    State(state): State<AppState>,
    form: std::result::Result<Form<IndicatorForm>, FormRejection>,
) -> Result<(StatusCode, Json<ApiResponse<IndicatorModel>>)> {
    let Form(form) = form.map_err(form_error)?;
    let new = form.into_new_indicator()?;

    let txn = state.db.begin().await?;
    let created = indicator::create_indicator(&txn, new).await?;
    txn.commit().await?;

    info!("Indicator '{}' created via web form", created.code);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created, "Indicator created successfully")),
    ))
}

/// `GET /kpi/edit/{id}`
#[instrument(skip(state))]
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<IndicatorWithOptions> {
    let indicator = require_indicator(&state, id).await?;
    let options = FormOptions::load(&state.db).await?;
    Ok(Json(ApiResponse::success(
        IndicatorWithOptions { indicator, options },
        "Indicator loaded",
    )))
}

/// `POST /kpi/edit/{id}`
#[instrument(skip(state, form))]
pub async fn edit_indicator(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    form: std::result::Result<Form<IndicatorEditForm>, FormRejection>,
) -> ApiResult<IndicatorModel> {
    let Form(form) = form.map_err(form_error)?;
    let changes = form.into_changes()?;

    let txn = state.db.begin().await?;
    let updated = indicator::update_indicator(&txn, id, changes).await?;
    txn.commit().await?;

    Ok(Json(ApiResponse::success(
        updated,
        "Indicator updated successfully",
    )))
}

/// `POST /kpi/{id}/evaluate`
#[instrument(skip(state))]
pub async fn evaluate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<EvaluationResult> {
    let indicator = require_indicator(&state, id).await?;
    let status = evaluate_indicator(&state.db, &indicator).await;
    let stored = indicator.automatic_evaluation;
    if stored {
        store_evaluation(&state.db, indicator, &status).await?;
    }

    Ok(Json(ApiResponse::success(
        EvaluationResult {
            indicator_id: id,
            status,
            stored,
        },
        "Indicator evaluated",
    )))
}

/// `GET /kpi/{id}/children`
#[instrument(skip(state))]
pub async fn children(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<IndicatorModel>> {
    let children = indicator::children(&state.db, id).await?;
    Ok(Json(ApiResponse::success(
        children,
        "Child indicators retrieved successfully",
    )))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> ApiResult<&'static str> {
    state.db.ping().await?;
    Ok(Json(ApiResponse::success("OK", "Health check passed")))
}
