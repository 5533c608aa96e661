//! Investment endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/investments` | The caller's holdings, oldest first |
//! | `POST`   | `/investments` | 201 |
//! | `GET`    | `/investments/{id}` | 403 if another owner's, 404 if absent |
//! | `PUT`    | `/investments/{id}` | Merge-update |
//! | `DELETE` | `/investments/{id}` | 204 |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use finwise_bridge::InsightSource;
use finwise_core::{
  RecordId,
  investment::{Investment, InvestmentUpdate, NewInvestment},
  store::FinanceStore,
};

use crate::{
  AppState,
  auth::CurrentUser,
  error::{ApiError, Violations},
};

async fn fetch_owned<S>(
  store: &S,
  user: &CurrentUser,
  id: RecordId,
) -> Result<Investment, ApiError>
where
  S: FinanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let investment = store
    .get_investment(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("investment {id} not found")))?;
  if investment.owner_id != user.user_id {
    return Err(ApiError::Forbidden);
  }
  Ok(investment)
}

/// `GET /investments`
pub async fn list<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
) -> Result<Json<Vec<Investment>>, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let investments = state
    .store
    .list_investments(user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(investments))
}

/// `POST /investments`
pub async fn create<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
  Json(input): Json<NewInvestment>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let mut v = Violations::default();
  v.require(!input.name.trim().is_empty(), "name: must not be empty");
  v.require(input.value >= 0.0, "value: must be >= 0");
  v.require(input.quantity >= 0.0, "quantity: must be >= 0");
  v.finish()?;

  let investment = state
    .store
    .create_investment(user.user_id, input)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(investment)))
}

/// `GET /investments/{id}`
pub async fn get<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
  Path(id): Path<RecordId>,
) -> Result<Json<Investment>, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let investment = fetch_owned(state.store.as_ref(), &user, id).await?;
  Ok(Json(investment))
}

/// `PUT /investments/{id}`
pub async fn update<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
  Path(id): Path<RecordId>,
  Json(update): Json<InvestmentUpdate>,
) -> Result<Json<Investment>, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  fetch_owned(state.store.as_ref(), &user, id).await?;

  let mut v = Violations::default();
  if let Some(name) = &update.name {
    v.require(!name.trim().is_empty(), "name: must not be empty");
  }
  if let Some(value) = update.value {
    v.require(value >= 0.0, "value: must be >= 0");
  }
  if let Some(quantity) = update.quantity {
    v.require(quantity >= 0.0, "quantity: must be >= 0");
  }
  v.finish()?;

  let updated = state
    .store
    .update_investment(id, update)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated))
}

/// `DELETE /investments/{id}`
pub async fn delete<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
  Path(id): Path<RecordId>,
) -> Result<StatusCode, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  fetch_owned(state.store.as_ref(), &user, id).await?;
  state
    .store
    .delete_investment(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
