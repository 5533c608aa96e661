//! Onboarding, financial-data, and profile endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/onboarding` | Body: financial profile; seeds the snapshot |
//! | `GET`  | `/financial-data` | 404 until onboarding has run |
//! | `GET`  | `/profile` | The authenticated user |
//! | `PUT`  | `/profile` | Merge-update of profile fields |

use axum::{Json, extract::State, response::IntoResponse};
use finwise_bridge::InsightSource;
use finwise_core::{
  snapshot::{FinancialSnapshot, SnapshotData},
  store::FinanceStore,
  user::{FinancialProfile, ProfileUpdate, User},
};
use serde_json::json;

use crate::{
  AppState,
  auth::CurrentUser,
  error::{ApiError, Violations},
};

/// `POST /onboarding` — persists the profile, flips the onboarding flag,
/// and seeds the financial snapshot, treated as one unit. The snapshot seed
/// is idempotent, so a retried onboarding converges.
pub async fn complete_onboarding<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
  Json(profile): Json<FinancialProfile>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let mut v = Violations::default();
  v.require(profile.annual_income >= 0.0, "annualIncome: must be >= 0");
  v.require(
    profile.monthly_expenses >= 0.0,
    "monthlyExpenses: must be >= 0",
  );
  v.require(profile.savings_goal >= 0.0, "savingsGoal: must be >= 0");
  v.require(
    !profile.employment_status.trim().is_empty(),
    "employmentStatus: must not be empty",
  );
  v.finish()?;

  state
    .store
    .complete_onboarding(user.user_id, profile)
    .await
    .map_err(ApiError::store)?;

  state
    .store
    .create_snapshot(user.user_id, SnapshotData::onboarding_defaults())
    .await
    .map_err(ApiError::store)?;

  tracing::info!(user_id = user.user_id, "onboarding completed");
  Ok(Json(json!({ "message": "onboarding completed" })))
}

/// `GET /financial-data`
pub async fn financial_data<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
) -> Result<Json<FinancialSnapshot>, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let snapshot = state
    .store
    .get_snapshot(user.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("no financial data yet".to_string()))?;
  Ok(Json(snapshot))
}

/// `GET /profile`
pub async fn get_profile<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
) -> Result<Json<User>, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let user = state
    .store
    .get_user(user.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;
  Ok(Json(user))
}

/// `PUT /profile` — merge-update; absent fields keep their prior values.
pub async fn update_profile<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
  Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let mut v = Violations::default();
  if let Some(name) = &update.display_name {
    v.require(!name.trim().is_empty(), "displayName: must not be empty");
  }
  if let Some(email) = &update.email {
    v.require(email.contains('@'), "email: must contain '@'");
  }
  if let Some(profile) = &update.financial_profile {
    v.require(profile.annual_income >= 0.0, "annualIncome: must be >= 0");
    v.require(
      profile.monthly_expenses >= 0.0,
      "monthlyExpenses: must be >= 0",
    );
    v.require(profile.savings_goal >= 0.0, "savingsGoal: must be >= 0");
  }
  v.finish()?;

  let updated = state
    .store
    .update_profile(user.user_id, update)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated))
}
