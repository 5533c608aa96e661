//! Budget records — full create/update/delete lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{RecordId, snapshot::BudgetCategory};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
  #[default]
  Draft,
  Active,
  Completed,
}

/// A named budget owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
  pub id:       RecordId,
  pub owner_id: RecordId,
  pub name:     String,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
  pub total:      f64,
  pub categories: Vec<BudgetCategory>,
  pub status:     BudgetStatus,
  pub created_at: DateTime<Utc>,
}

/// Input for [`crate::store::FinanceStore::create_budget`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
  pub name: String,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
  pub total:      f64,
  #[serde(default)]
  pub categories: Vec<BudgetCategory>,
  #[serde(default)]
  pub status: BudgetStatus,
}

/// Merge-update for a budget. Absent fields keep their prior values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUpdate {
  pub name:       Option<String>,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
  pub total:      Option<f64>,
  pub categories: Option<Vec<BudgetCategory>>,
  pub status:     Option<BudgetStatus>,
}

impl Budget {
  pub fn apply(&mut self, update: BudgetUpdate) {
    if let Some(v) = update.name {
      self.name = v;
    }
    if let Some(v) = update.start_date {
      self.start_date = Some(v);
    }
    if let Some(v) = update.end_date {
      self.end_date = Some(v);
    }
    if let Some(v) = update.total {
      self.total = v;
    }
    if let Some(v) = update.categories {
      self.categories = v;
    }
    if let Some(v) = update.status {
      self.status = v;
    }
  }
}
