//! Investment records — full create/update/delete lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::RecordId;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentKind {
  Stock,
  Bond,
  MutualFund,
  Etf,
  RealEstate,
  Crypto,
  Cash,
  #[default]
  Other,
}

/// A single holding owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
  pub id:       RecordId,
  pub owner_id: RecordId,
  pub name:     String,
  pub kind:     InvestmentKind,
  /// Current monetary value of the whole position.
  pub value: f64,
  pub purchase_date:  Option<NaiveDate>,
  pub purchase_price: Option<f64>,
  pub current_price:  f64,
  pub quantity:       f64,
  pub notes:          Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input for [`crate::store::FinanceStore::create_investment`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvestment {
  pub name: String,
  #[serde(default)]
  pub kind: InvestmentKind,
  pub value: f64,
  pub purchase_date:  Option<NaiveDate>,
  pub purchase_price: Option<f64>,
  #[serde(default)]
  pub current_price: f64,
  #[serde(default)]
  pub quantity: f64,
  pub notes: Option<String>,
}

/// Merge-update for an investment. Absent fields keep their prior values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentUpdate {
  pub name:  Option<String>,
  pub kind:  Option<InvestmentKind>,
  pub value: Option<f64>,
  pub purchase_date:  Option<NaiveDate>,
  pub purchase_price: Option<f64>,
  pub current_price:  Option<f64>,
  pub quantity:       Option<f64>,
  pub notes:          Option<String>,
}

impl Investment {
  pub fn apply(&mut self, update: InvestmentUpdate) {
    if let Some(v) = update.name {
      self.name = v;
    }
    if let Some(v) = update.kind {
      self.kind = v;
    }
    if let Some(v) = update.value {
      self.value = v;
    }
    if let Some(v) = update.purchase_date {
      self.purchase_date = Some(v);
    }
    if let Some(v) = update.purchase_price {
      self.purchase_price = Some(v);
    }
    if let Some(v) = update.current_price {
      self.current_price = v;
    }
    if let Some(v) = update.quantity {
      self.quantity = v;
    }
    if let Some(v) = update.notes {
      self.notes = Some(v);
    }
  }
}
