//! Financial snapshot — the one-per-user dashboard summary.
//!
//! Created once when onboarding completes, seeded with fixed defaults. The
//! design defines no update path beyond re-creation; `create_snapshot` is
//! idempotent per owner.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RecordId;

/// A named budget line with its allocation and what has been spent against
/// it. Shared between the snapshot's monthly budget and [`crate::budget`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategory {
  pub name:      String,
  pub allocated: f64,
  pub spent:     f64,
}

/// A bill due within the next few weeks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingBill {
  pub name:        String,
  pub amount:      f64,
  pub due_in_days: u32,
}

/// A single line of the expense breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItem {
  pub name:   String,
  pub amount: f64,
}

/// The payload portion of a snapshot, without store-assigned fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotData {
  pub net_worth:   f64,
  pub assets:      f64,
  pub liabilities: f64,
  /// Percentages per asset class, conceptually summing to 100.
  pub portfolio_allocation: BTreeMap<String, f64>,
  pub monthly_budget:    Vec<BudgetCategory>,
  pub upcoming_bills:    Vec<UpcomingBill>,
  pub expense_breakdown: Vec<ExpenseItem>,
}

/// The stored snapshot record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSnapshot {
  pub id:       RecordId,
  pub owner_id: RecordId,
  #[serde(flatten)]
  pub data: SnapshotData,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl SnapshotData {
  /// The fixed seed values written when onboarding completes.
  pub fn onboarding_defaults() -> Self {
    let cat = |name: &str, allocated: f64, spent: f64| BudgetCategory {
      name: name.to_string(),
      allocated,
      spent,
    };
    let bill = |name: &str, amount: f64, due_in_days: u32| UpcomingBill {
      name: name.to_string(),
      amount,
      due_in_days,
    };
    let expense = |name: &str, amount: f64| ExpenseItem {
      name: name.to_string(),
      amount,
    };

    Self {
      net_worth:   124_500.0,
      assets:      189_300.0,
      liabilities: 64_800.0,
      portfolio_allocation: BTreeMap::from([
        ("stocks".to_string(), 45.0),
        ("bonds".to_string(), 25.0),
        ("realEstate".to_string(), 15.0),
        ("cash".to_string(), 10.0),
        ("alternatives".to_string(), 5.0),
      ]),
      monthly_budget: vec![
        cat("Housing", 2000.0, 1800.0),
        cat("Transportation", 500.0, 450.0),
        cat("Food & Dining", 600.0, 620.0),
        cat("Entertainment", 300.0, 180.0),
      ],
      upcoming_bills: vec![
        bill("Mortgage", 1450.0, 5),
        bill("Auto Loan", 350.0, 12),
        bill("Credit Card", 680.0, 18),
      ],
      expense_breakdown: vec![
        expense("Housing", 1800.0),
        expense("Food", 620.0),
        expense("Transport", 450.0),
        expense("Utilities", 280.0),
        expense("Entertainment", 180.0),
        expense("Subscriptions", 87.0),
      ],
    }
  }
}
