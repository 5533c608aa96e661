//! Sidecar-derived insight records: risk analyses and forecasts.
//!
//! Both are append-only per user; the most recent record is what default
//! reads return. The report payloads double as the sidecar's response DTOs,
//! so a computed result is persisted exactly as received.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RecordId;

// ─── Risk analysis ───────────────────────────────────────────────────────────

/// Qualitative assessment of overall portfolio health.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PortfolioHealth {
  Excellent,
  #[default]
  Good,
  Fair,
  Poor,
}

/// The payload of a risk analysis, as produced by the sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
  pub risk_score:            f64,
  pub portfolio_health:      PortfolioHealth,
  pub diversification_score: f64,
  #[serde(default)]
  pub volatility_metrics: Value,
  #[serde(default)]
  pub recommendations: Vec<String>,
  #[serde(default)]
  pub scenario_analysis: Value,
}

/// A stored risk analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAnalysis {
  pub id:       RecordId,
  pub owner_id: RecordId,
  #[serde(flatten)]
  pub report: RiskReport,
  pub created_at: DateTime<Utc>,
}

// ─── Forecasts ───────────────────────────────────────────────────────────────

/// Forecast time-range classification.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ForecastHorizon {
  ShortTerm,
  #[default]
  MediumTerm,
  LongTerm,
}

/// Best / worst / most-likely scenario projections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioProjections {
  #[serde(default)]
  pub best_case: Value,
  #[serde(default)]
  pub worst_case: Value,
  #[serde(default)]
  pub most_likely: Value,
}

/// The payload of a forecast, as produced by the sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastReport {
  pub horizon:   ForecastHorizon,
  #[serde(default)]
  pub scenarios: ScenarioProjections,
  #[serde(default)]
  pub assumptions: Value,
  #[serde(default)]
  pub projections: Value,
}

/// A stored forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
  pub id:       RecordId,
  pub owner_id: RecordId,
  #[serde(flatten)]
  pub report: ForecastReport,
  pub created_at: DateTime<Utc>,
}
