//! The `InsightSource` trait and its reqwest-backed sidecar client.
//!
//! Call sites needing a synchronous answer (chat, risk, forecast, document
//! insights) use the typed methods and persist the result; news and
//! market-summary reads go through [`InsightSource::forward`], which relays
//! the sidecar's status and body verbatim.

use std::{future::Future, time::Duration};

use bytes::Bytes;
use finwise_core::{
  chat::ChatMessage,
  insight::{ForecastHorizon, ForecastReport, RiskReport},
  snapshot::FinancialSnapshot,
  user::{FinancialProfile, User},
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  config::SidecarConfig,
  error::{BridgeError, Result},
};

// ─── Chat context ────────────────────────────────────────────────────────────

/// One prior conversation turn, as the sidecar expects it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextTurn {
  pub from_user: bool,
  pub content:   String,
}

/// Everything the sidecar needs to personalise an answer: the user's
/// financial profile, their snapshot, and the recent conversation.
///
/// Assembled by the API layer from the record store; the sidecar itself is
/// stateless.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
  pub financial_profile: Option<FinancialProfile>,
  pub snapshot:          Option<FinancialSnapshot>,
  pub history:           Vec<ContextTurn>,
}

impl ChatContext {
  /// Build a context from store reads. `history` is truncated to the most
  /// recent `history_limit` turns, oldest first.
  pub fn assemble(
    user: &User,
    snapshot: Option<FinancialSnapshot>,
    history: &[ChatMessage],
    history_limit: usize,
  ) -> Self {
    let skip = history.len().saturating_sub(history_limit);
    Self {
      financial_profile: user.financial_profile.clone(),
      snapshot,
      history: history[skip..]
        .iter()
        .map(|m| ContextTurn {
          from_user: m.from_user,
          content:   m.content.clone(),
        })
        .collect(),
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A verbatim relay of a sidecar response.
#[derive(Debug, Clone)]
pub struct Relayed {
  pub status: u16,
  pub body:   Bytes,
}

/// Abstraction over the insight sidecar, implemented by [`SidecarClient`]
/// and by test stubs.
pub trait InsightSource: Send + Sync {
  /// Ask the advisor for a reply to `message` given `context`.
  fn chat_reply<'a>(
    &'a self,
    context: &'a ChatContext,
    message: &'a str,
  ) -> impl Future<Output = Result<String>> + Send + 'a;

  /// Compute a fresh risk analysis for the user described by `context`.
  fn risk_analysis<'a>(
    &'a self,
    context: &'a ChatContext,
  ) -> impl Future<Output = Result<RiskReport>> + Send + 'a;

  /// Compute a forecast over `horizon`.
  fn forecast<'a>(
    &'a self,
    context: &'a ChatContext,
    horizon: ForecastHorizon,
  ) -> impl Future<Output = Result<ForecastReport>> + Send + 'a;

  /// Extract insights from an uploaded document.
  fn document_insights<'a>(
    &'a self,
    filename: &'a str,
    content: Option<&'a str>,
  ) -> impl Future<Output = Result<Value>> + Send + 'a;

  /// Dashboard advisor insights for the user described by `context`.
  fn advisor_insights<'a>(
    &'a self,
    context: &'a ChatContext,
  ) -> impl Future<Output = Result<Value>> + Send + 'a;

  /// Reissue a request to the sidecar and relay its status and body
  /// verbatim. Only network-level failures surface as errors; the
  /// sidecar's own non-success statuses pass through inside [`Relayed`].
  fn forward<'a>(
    &'a self,
    method: Method,
    path: &'a str,
    query: &'a [(String, String)],
  ) -> impl Future<Output = Result<Relayed>> + Send + 'a;
}

// ─── Sidecar client ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatQueryBody<'a> {
  message: &'a str,
  context: &'a ChatContext,
}

#[derive(Debug, Deserialize)]
struct ChatQueryResponse {
  response: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentInsightsBody<'a> {
  filename: &'a str,
  content:  Option<&'a str>,
}

/// Async HTTP client for the insight sidecar.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct SidecarClient {
  http:     reqwest::Client,
  base_url: String,
}

impl SidecarClient {
  pub fn new(config: &SidecarConfig) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.request_timeout_secs))
      .build()
      .map_err(BridgeError::Client)?;
    Ok(Self {
      http,
      base_url: config.base_url.trim_end_matches('/').to_string(),
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  /// POST `body` to `path`, expect a successful JSON response.
  async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
    &self,
    path: &str,
    body: &B,
  ) -> Result<T> {
    let response = self
      .http
      .post(self.url(path))
      .json(body)
      .send()
      .await
      .map_err(BridgeError::Unreachable)?;

    let status = response.status();
    if !status.is_success() {
      return Err(BridgeError::Upstream {
        status: status.as_u16(),
      });
    }
    response.json().await.map_err(BridgeError::Decode)
  }
}

impl InsightSource for SidecarClient {
  async fn chat_reply(
    &self,
    context: &ChatContext,
    message: &str,
  ) -> Result<String> {
    let reply: ChatQueryResponse = self
      .post_json("/chat/query", &ChatQueryBody { message, context })
      .await?;
    Ok(reply.response)
  }

  async fn risk_analysis(&self, context: &ChatContext) -> Result<RiskReport> {
    self.post_json("/risk-analysis", context).await
  }

  async fn forecast(
    &self,
    context: &ChatContext,
    horizon: ForecastHorizon,
  ) -> Result<ForecastReport> {
    #[derive(Serialize)]
    struct Body<'a> {
      horizon: ForecastHorizon,
      context: &'a ChatContext,
    }
    self.post_json("/forecasts", &Body { horizon, context }).await
  }

  async fn document_insights(
    &self,
    filename: &str,
    content: Option<&str>,
  ) -> Result<Value> {
    self
      .post_json(
        "/documents/insights",
        &DocumentInsightsBody { filename, content },
      )
      .await
  }

  async fn advisor_insights(&self, context: &ChatContext) -> Result<Value> {
    self.post_json("/ai-advisor/insights", context).await
  }

  async fn forward(
    &self,
    method: Method,
    path: &str,
    query: &[(String, String)],
  ) -> Result<Relayed> {
    let response = self
      .http
      .request(method, self.url(path))
      .query(query)
      .send()
      .await
      .map_err(BridgeError::Unreachable)?;

    let status = response.status().as_u16();
    let body = response.bytes().await.map_err(BridgeError::Decode)?;
    Ok(Relayed { status, body })
  }
}
