//! Budget endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/budgets` | The caller's budgets, oldest first |
//! | `POST`   | `/budgets` | 201 |
//! | `GET`    | `/budgets/{id}` | 403 if another owner's, 404 if absent |
//! | `PUT`    | `/budgets/{id}` | Merge-update |
//! | `DELETE` | `/budgets/{id}` | 204 |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use finwise_bridge::InsightSource;
use finwise_core::{
  RecordId,
  budget::{Budget, BudgetUpdate, NewBudget},
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
) -> Result<Budget, ApiError>
where
  S: FinanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let budget = store
    .get_budget(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("budget {id} not found")))?;
  if budget.owner_id != user.user_id {
    return Err(ApiError::Forbidden);
  }
  Ok(budget)
}

/// `GET /budgets`
pub async fn list<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
) -> Result<Json<Vec<Budget>>, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let budgets = state
    .store
    .list_budgets(user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(budgets))
}

/// `POST /budgets`
pub async fn create<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
  Json(input): Json<NewBudget>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let mut v = Violations::default();
  v.require(!input.name.trim().is_empty(), "name: must not be empty");
  v.require(input.total >= 0.0, "total: must be >= 0");
  for category in &input.categories {
    v.require(
      !category.name.trim().is_empty(),
      "categories: names must not be empty",
    );
    v.require(
      category.allocated >= 0.0,
      "categories: allocated must be >= 0",
    );
  }
  v.finish()?;

  let budget = state
    .store
    .create_budget(user.user_id, input)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(budget)))
}

/// `GET /budgets/{id}`
pub async fn get<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
  Path(id): Path<RecordId>,
) -> Result<Json<Budget>, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let budget = fetch_owned(state.store.as_ref(), &user, id).await?;
  Ok(Json(budget))
}

/// `PUT /budgets/{id}`
pub async fn update<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
  Path(id): Path<RecordId>,
  Json(update): Json<BudgetUpdate>,
) -> Result<Json<Budget>, ApiError>
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
  if let Some(total) = update.total {
    v.require(total >= 0.0, "total: must be >= 0");
  }
  v.finish()?;

  let updated = state
    .store
    .update_budget(id, update)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated))
}

/// `DELETE /budgets/{id}`
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
    .delete_budget(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
