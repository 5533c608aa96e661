//! User — the aggregation root every other record hangs off.
//!
//! All access control is keyed on the owning user's id. Users are created at
//! registration and never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RecordId;

/// Self-reported appetite for investment risk.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
  Low,
  #[default]
  Medium,
  High,
}

/// The financial-profile document collected by the onboarding wizard and
/// embedded on the user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialProfile {
  pub annual_income:     f64,
  pub monthly_expenses:  f64,
  pub employment_status: String,
  pub savings_goal:      f64,
  pub risk_tolerance:    RiskTolerance,
}

/// A registered user.
///
/// `password_hash` is an argon2 PHC string and is never serialised out;
/// JSON views of a user are safe to return to that user verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:       RecordId,
  pub username: String,
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub display_name: Option<String>,
  pub email:        Option<String>,
  pub phone:        Option<String>,
  pub avatar_url:   Option<String>,
  pub financial_profile: Option<FinancialProfile>,
  pub onboarding_completed: bool,
  pub created_at: DateTime<Utc>,
}

/// Input for [`crate::store::FinanceStore::create_user`]. The password has
/// already been hashed by the caller; the store never sees plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub password_hash: String,
}

/// Merge-update for the user's profile fields. Absent fields keep their
/// prior values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
  pub display_name: Option<String>,
  pub email:        Option<String>,
  pub phone:        Option<String>,
  pub avatar_url:   Option<String>,
  pub financial_profile: Option<FinancialProfile>,
}

impl User {
  /// Apply a merge-update in place.
  pub fn apply(&mut self, update: ProfileUpdate) {
    if let Some(v) = update.display_name {
      self.display_name = Some(v);
    }
    if let Some(v) = update.email {
      self.email = Some(v);
    }
    if let Some(v) = update.phone {
      self.phone = Some(v);
    }
    if let Some(v) = update.avatar_url {
      self.avatar_url = Some(v);
    }
    if let Some(v) = update.financial_profile {
      self.financial_profile = Some(v);
    }
  }
}
