//! Sidecar-backed insight endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/risk-analysis` | Most recent stored analysis; 404 if none |
//! | `POST` | `/risk-analysis` | Computes via the sidecar, persists, returns |
//! | `GET`  | `/forecasts` | Most recent stored forecast; 404 if none |
//! | `POST` | `/forecasts` | Body: optional `{"horizon"}` |
//! | `GET`  | `/ai-advisor/insights` | Computed fresh, not persisted |
//! | `GET`  | `/financial-news` | Relayed verbatim from the sidecar |
//! | `GET`  | `/market-summary` | Relayed verbatim from the sidecar |
//! | `GET`  | `/stocks/{ticker}` | Relayed verbatim from the sidecar |
//!
//! Computed risk analyses and forecasts follow the compute-once pattern:
//! POST invokes the sidecar and persists the report; GET replays the stored
//! record without re-invoking it.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use finwise_bridge::{ChatContext, InsightSource, Method, Relayed};
use finwise_core::{
  RecordId,
  insight::{Forecast, ForecastHorizon, RiskAnalysis},
  store::FinanceStore,
};
use serde::Deserialize;

use crate::{AppState, auth::CurrentUser, error::ApiError};

/// How many prior turns insight computations see as context.
const CONTEXT_TURNS: usize = 10;

/// Assemble the sidecar context from store reads.
pub async fn build_context<S>(
  store: &Arc<S>,
  user_id: RecordId,
  turns: usize,
) -> Result<ChatContext, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = store
    .get_user(user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;
  let snapshot = store.get_snapshot(user_id).await.map_err(ApiError::store)?;
  let history = store
    .list_chat_messages(user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(ChatContext::assemble(&user, snapshot, &history, turns))
}

// ─── Risk analysis ───────────────────────────────────────────────────────────

/// `GET /risk-analysis` — the most recent stored analysis.
pub async fn latest_risk_analysis<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
) -> Result<Json<RiskAnalysis>, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let latest = state
    .store
    .list_risk_analyses(user.user_id)
    .await
    .map_err(ApiError::store)?
    .pop()
    .ok_or_else(|| ApiError::NotFound("no risk analysis yet".to_string()))?;
  Ok(Json(latest))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRequest {
  /// If set, the analysis is scoped to this (owned) document.
  pub document_id: Option<RecordId>,
}

/// `POST /risk-analysis` — body: optional `{"documentId"}`.
pub async fn compute_risk_analysis<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
  body: Option<Json<RiskRequest>>,
) -> Result<Json<RiskAnalysis>, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let request = body.map(|Json(b)| b).unwrap_or_default();

  // A referenced document must exist and be the caller's.
  if let Some(document_id) = request.document_id {
    let document = state
      .store
      .get_document(document_id)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| {
        ApiError::NotFound(format!("document {document_id} not found"))
      })?;
    if document.owner_id != user.user_id {
      return Err(ApiError::Forbidden);
    }
  }

  let context =
    build_context(&state.store, user.user_id, CONTEXT_TURNS).await?;
  let report = state
    .bridge
    .risk_analysis(&context)
    .await
    .map_err(ApiError::Upstream)?;

  let stored = state
    .store
    .append_risk_analysis(user.user_id, report)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(stored))
}

// ─── Forecasts ───────────────────────────────────────────────────────────────

/// `GET /forecasts` — the most recent stored forecast.
pub async fn latest_forecast<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
) -> Result<Json<Forecast>, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let latest = state
    .store
    .list_forecasts(user.user_id)
    .await
    .map_err(ApiError::store)?
    .pop()
    .ok_or_else(|| ApiError::NotFound("no forecast yet".to_string()))?;
  Ok(Json(latest))
}

#[derive(Debug, Default, Deserialize)]
pub struct ForecastRequest {
  pub horizon: Option<ForecastHorizon>,
}

/// `POST /forecasts` — body: optional `{"horizon":"short_term"|...}`.
pub async fn compute_forecast<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
  body: Option<Json<ForecastRequest>>,
) -> Result<Json<Forecast>, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let horizon = body
    .map(|Json(b)| b)
    .unwrap_or_default()
    .horizon
    .unwrap_or_default();

  let context =
    build_context(&state.store, user.user_id, CONTEXT_TURNS).await?;
  let report = state
    .bridge
    .forecast(&context, horizon)
    .await
    .map_err(ApiError::Upstream)?;

  let stored = state
    .store
    .append_forecast(user.user_id, report)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(stored))
}

// ─── Advisor insights ────────────────────────────────────────────────────────

/// `GET /ai-advisor/insights` — computed fresh on every read.
pub async fn advisor_insights<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let context =
    build_context(&state.store, user.user_id, CONTEXT_TURNS).await?;
  let insights = state
    .bridge
    .advisor_insights(&context)
    .await
    .map_err(ApiError::Upstream)?;
  Ok(Json(insights))
}

// ─── Verbatim relays ─────────────────────────────────────────────────────────

fn relay(relayed: Relayed) -> Response {
  (
    StatusCode::from_u16(relayed.status).unwrap_or(StatusCode::BAD_GATEWAY),
    [(header::CONTENT_TYPE, "application/json")],
    relayed.body,
  )
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct NewsParams {
  pub query: Option<String>,
}

/// `GET /financial-news[?query=...]` — relayed verbatim.
pub async fn financial_news<S, B>(
  State(state): State<AppState<S, B>>,
  _user: CurrentUser,
  Query(params): Query<NewsParams>,
) -> Result<Response, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let query = params
    .query
    .unwrap_or_else(|| "Indian stock market".to_string());
  let relayed = state
    .bridge
    .forward(
      Method::GET,
      "/financial-news",
      &[("query".to_string(), query)],
    )
    .await
    .map_err(ApiError::Upstream)?;
  Ok(relay(relayed))
}

/// `GET /stocks/{ticker}` — relayed verbatim.
pub async fn stock_lookup<S, B>(
  State(state): State<AppState<S, B>>,
  _user: CurrentUser,
  Path(ticker): Path<String>,
) -> Result<Response, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let path = format!("/finance/stock/{ticker}");
  let relayed = state
    .bridge
    .forward(Method::GET, &path, &[])
    .await
    .map_err(ApiError::Upstream)?;
  Ok(relay(relayed))
}

/// `GET /market-summary` — relayed verbatim.
pub async fn market_summary<S, B>(
  State(state): State<AppState<S, B>>,
  _user: CurrentUser,
) -> Result<Response, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let relayed = state
    .bridge
    .forward(Method::GET, "/market-summary", &[])
    .await
    .map_err(ApiError::Upstream)?;
  Ok(relay(relayed))
}
