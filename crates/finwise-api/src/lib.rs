//! HTTP layer for the FinWise server.
//!
//! Exposes an axum [`Router`] over any [`FinanceStore`] backend and any
//! [`InsightSource`] sidecar client. Handlers own validation, session
//! checks, and ownership enforcement; the store stays mechanical and the
//! sidecar stateless.

pub mod auth;
pub mod budgets;
pub mod chat;
pub mod documents;
pub mod error;
pub mod insights;
pub mod investments;
pub mod profile;

pub use error::ApiError;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use finwise_bridge::{InsightSource, SidecarConfig};
use finwise_core::store::FinanceStore;
use tower_http::trace::TraceLayer;

use auth::Sessions;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// `FINWISE_*` environment.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,
  /// Signs session cookies. When unset, a random per-process secret is
  /// generated and sessions do not survive a restart.
  #[serde(default)]
  pub session_secret: Option<String>,
  #[serde(default)]
  pub sidecar: SidecarConfig,
}

fn default_host() -> String {
  "127.0.0.1".to_string()
}
fn default_port() -> u16 {
  5170
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:           default_host(),
      port:           default_port(),
      session_secret: None,
      sidecar:        SidecarConfig::default(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, B> {
  pub store:    Arc<S>,
  pub bridge:   Arc<B>,
  pub sessions: Arc<Sessions>,
}

// Derived Clone would demand S: Clone and B: Clone.
impl<S, B> Clone for AppState<S, B> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      bridge:   Arc::clone(&self.bridge),
      sessions: Arc::clone(&self.sessions),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] serving the full API surface.
pub fn router<S, B>(state: AppState<S, B>) -> Router
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  Router::new()
    .route("/auth/register", post(auth::register::<S, B>))
    .route("/auth/login", post(auth::login::<S, B>))
    .route("/auth/logout", post(auth::logout::<S, B>))
    .route("/auth/status", get(auth::status::<S, B>))
    .route("/onboarding", post(profile::complete_onboarding::<S, B>))
    .route("/financial-data", get(profile::financial_data::<S, B>))
    .route(
      "/profile",
      get(profile::get_profile::<S, B>).put(profile::update_profile::<S, B>),
    )
    .route("/chat/history", get(chat::history::<S, B>))
    .route("/chat/query", post(chat::query::<S, B>))
    .route(
      "/documents",
      get(documents::list::<S, B>).post(documents::create::<S, B>),
    )
    .route(
      "/documents/{id}",
      get(documents::get::<S, B>)
        .put(documents::update::<S, B>)
        .delete(documents::delete::<S, B>),
    )
    .route(
      "/investments",
      get(investments::list::<S, B>).post(investments::create::<S, B>),
    )
    .route(
      "/investments/{id}",
      get(investments::get::<S, B>)
        .put(investments::update::<S, B>)
        .delete(investments::delete::<S, B>),
    )
    .route(
      "/budgets",
      get(budgets::list::<S, B>).post(budgets::create::<S, B>),
    )
    .route(
      "/budgets/{id}",
      get(budgets::get::<S, B>)
        .put(budgets::update::<S, B>)
        .delete(budgets::delete::<S, B>),
    )
    .route(
      "/risk-analysis",
      get(insights::latest_risk_analysis::<S, B>)
        .post(insights::compute_risk_analysis::<S, B>),
    )
    .route(
      "/forecasts",
      get(insights::latest_forecast::<S, B>)
        .post(insights::compute_forecast::<S, B>),
    )
    .route("/ai-advisor/insights", get(insights::advisor_insights::<S, B>))
    .route("/financial-news", get(insights::financial_news::<S, B>))
    .route("/market-summary", get(insights::market_summary::<S, B>))
    .route("/stocks/{ticker}", get(insights::stock_lookup::<S, B>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use bytes::Bytes;
  use finwise_bridge::{BridgeError, ChatContext, Method, Relayed};
  use finwise_core::insight::{
    ForecastHorizon, ForecastReport, PortfolioHealth, RiskReport,
  };
  use finwise_store_memory::MemoryStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  /// Canned sidecar. With `available: false` every call fails the way a
  /// stopped sidecar does.
  struct StubInsights {
    available: bool,
  }

  impl StubInsights {
    fn check(&self) -> Result<(), BridgeError> {
      if self.available { Ok(()) } else { Err(BridgeError::NotRunning) }
    }
  }

  impl InsightSource for StubInsights {
    async fn chat_reply(
      &self,
      _context: &ChatContext,
      message: &str,
    ) -> Result<String, BridgeError> {
      self.check()?;
      Ok(format!("advice for: {message}"))
    }

    async fn risk_analysis(
      &self,
      _context: &ChatContext,
    ) -> Result<RiskReport, BridgeError> {
      self.check()?;
      Ok(RiskReport {
        risk_score:            42.0,
        portfolio_health:      PortfolioHealth::Good,
        diversification_score: 61.0,
        volatility_metrics:    json!({}),
        recommendations:       vec!["rebalance".to_string()],
        scenario_analysis:     json!({}),
      })
    }

    async fn forecast(
      &self,
      _context: &ChatContext,
      horizon: ForecastHorizon,
    ) -> Result<ForecastReport, BridgeError> {
      self.check()?;
      Ok(ForecastReport {
        horizon,
        scenarios: Default::default(),
        assumptions: json!({}),
        projections: json!({"netWorth": 130000.0}),
      })
    }

    async fn document_insights(
      &self,
      filename: &str,
      _content: Option<&str>,
    ) -> Result<Value, BridgeError> {
      self.check()?;
      Ok(json!({ "summary": format!("insights for {filename}") }))
    }

    async fn advisor_insights(
      &self,
      _context: &ChatContext,
    ) -> Result<Value, BridgeError> {
      self.check()?;
      Ok(json!({ "insights": [] }))
    }

    async fn forward(
      &self,
      _method: Method,
      path: &str,
      query: &[(String, String)],
    ) -> Result<Relayed, BridgeError> {
      self.check()?;
      let body = json!({ "path": path, "query": query }).to_string();
      Ok(Relayed { status: 200, body: Bytes::from(body) })
    }
  }

  fn make_state(sidecar_available: bool) -> AppState<MemoryStore, StubInsights> {
    AppState {
      store:    Arc::new(MemoryStore::default()),
      bridge:   Arc::new(StubInsights { available: sidecar_available }),
      sessions: Arc::new(Sessions::new("integration-test-secret")),
    }
  }

  async fn request(
    state: &AppState<MemoryStore, StubInsights>,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
      builder = builder.header(header::COOKIE, cookie);
    }
    let req = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    router(state.clone()).oneshot(req).await.unwrap()
  }

  async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  /// Register `username` and log in, returning the session cookie.
  async fn login(
    state: &AppState<MemoryStore, StubInsights>,
    username: &str,
  ) -> String {
    let body = json!({ "username": username, "password": "hunter22" });
    let resp =
      request(state, "POST", "/auth/register", None, Some(body.clone())).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = request(state, "POST", "/auth/login", None, Some(body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let set_cookie = resp
      .headers()
      .get(header::SET_COOKIE)
      .unwrap()
      .to_str()
      .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
  }

  fn onboarding_body() -> Value {
    json!({
      "annualIncome": 90000.0,
      "monthlyExpenses": 3500.0,
      "employmentStatus": "employed",
      "savingsGoal": 20000.0,
      "riskTolerance": "medium",
    })
  }

  // ── Auth ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_returns_created_identity_without_password() {
    let state = make_state(true);
    let resp = request(
      &state,
      "POST",
      "/auth/register",
      None,
      Some(json!({ "username": "alice", "password": "hunter22" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = read_json(resp).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["username"], "alice");
    assert!(body.get("passwordHash").is_none());
  }

  #[tokio::test]
  async fn register_rejects_short_credentials_with_details() {
    let state = make_state(true);
    let resp = request(
      &state,
      "POST",
      "/auth/register",
      None,
      Some(json!({ "username": "al", "password": "pw" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = read_json(resp).await;
    assert_eq!(body["details"].as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn register_rejects_duplicate_username() {
    let state = make_state(true);
    let body = json!({ "username": "alice", "password": "hunter22" });
    request(&state, "POST", "/auth/register", None, Some(body.clone())).await;
    let resp =
      request(&state, "POST", "/auth/register", None, Some(body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn login_with_wrong_password_returns_401() {
    let state = make_state(true);
    request(
      &state,
      "POST",
      "/auth/register",
      None,
      Some(json!({ "username": "alice", "password": "hunter22" })),
    )
    .await;
    let resp = request(
      &state,
      "POST",
      "/auth/login",
      None,
      Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn unauthenticated_requests_return_401() {
    let state = make_state(true);
    for uri in ["/profile", "/financial-data", "/chat/history", "/documents"] {
      let resp = request(&state, "GET", uri, None, None).await;
      assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "GET {uri}");
    }
  }

  #[tokio::test]
  async fn logout_revokes_the_session() {
    let state = make_state(true);
    let cookie = login(&state, "alice").await;

    let resp =
      request(&state, "POST", "/auth/logout", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = request(&state, "GET", "/profile", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn status_without_session_is_unauthenticated_not_401() {
    let state = make_state(true);
    let resp = request(&state, "GET", "/auth/status", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["authenticated"], false);
  }

  // ── Onboarding and financial data ───────────────────────────────────────────

  #[tokio::test]
  async fn financial_data_before_onboarding_is_404() {
    let state = make_state(true);
    let cookie = login(&state, "alice").await;
    let resp =
      request(&state, "GET", "/financial-data", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn onboarding_seeds_snapshot_and_flips_the_flag() {
    let state = make_state(true);
    let cookie = login(&state, "alice").await;

    let resp = request(
      &state,
      "POST",
      "/onboarding",
      Some(&cookie),
      Some(onboarding_body()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let status =
      request(&state, "GET", "/auth/status", Some(&cookie), None).await;
    let status = read_json(status).await;
    assert_eq!(status["authenticated"], true);
    assert_eq!(status["onboardingCompleted"], true);

    let data =
      request(&state, "GET", "/financial-data", Some(&cookie), None).await;
    assert_eq!(data.status(), StatusCode::OK);
    let data = read_json(data).await;
    assert_eq!(data["netWorth"], 124500.0);
    assert_eq!(data["portfolioAllocation"]["stocks"], 45.0);
  }

  #[tokio::test]
  async fn onboarding_rejects_negative_income() {
    let state = make_state(true);
    let cookie = login(&state, "alice").await;
    let mut body = onboarding_body();
    body["annualIncome"] = json!(-1.0);
    let resp =
      request(&state, "POST", "/onboarding", Some(&cookie), Some(body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Chat ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn chat_query_persists_both_turns_in_order() {
    let state = make_state(true);
    let cookie = login(&state, "alice").await;

    let resp = request(
      &state,
      "POST",
      "/chat/query",
      Some(&cookie),
      Some(json!({ "message": "how am I doing?" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["response"], "advice for: how am I doing?");

    let history =
      request(&state, "GET", "/chat/history", Some(&cookie), None).await;
    let history = read_json(history).await;
    let messages = history.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["fromUser"], true);
    assert_eq!(messages[0]["content"], "how am I doing?");
    assert_eq!(messages[1]["fromUser"], false);
  }

  #[tokio::test]
  async fn chat_query_with_dead_sidecar_keeps_only_the_user_turn() {
    let state = make_state(false);
    let cookie = login(&state, "alice").await;

    let resp = request(
      &state,
      "POST",
      "/chat/query",
      Some(&cookie),
      Some(json!({ "message": "hello?" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let history =
      request(&state, "GET", "/chat/history", Some(&cookie), None).await;
    let history = read_json(history).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
  }

  // ── Ownership ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn records_are_isolated_per_owner() {
    let state = make_state(true);
    let alice = login(&state, "alice").await;
    let bob = login(&state, "bob").await;

    let resp = request(
      &state,
      "POST",
      "/investments",
      Some(&alice),
      Some(json!({ "name": "VTI", "value": 1000.0 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let investment = read_json(resp).await;
    let id = investment["id"].as_u64().unwrap();

    // Another owner's record: 403. An absent record: 404.
    let resp = request(
      &state,
      "GET",
      &format!("/investments/{id}"),
      Some(&bob),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp =
      request(&state, "GET", "/investments/999", Some(&alice), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = request(&state, "GET", "/investments", Some(&bob), None).await;
    assert_eq!(read_json(resp).await.as_array().unwrap().len(), 0);
  }

  // ── CRUD semantics ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn budget_update_merges_absent_fields() {
    let state = make_state(true);
    let cookie = login(&state, "alice").await;

    let resp = request(
      &state,
      "POST",
      "/budgets",
      Some(&cookie),
      Some(json!({ "name": "March", "total": 3000.0 })),
    )
    .await;
    let budget = read_json(resp).await;
    let id = budget["id"].as_u64().unwrap();

    let resp = request(
      &state,
      "PUT",
      &format!("/budgets/{id}"),
      Some(&cookie),
      Some(json!({ "name": "March (revised)" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = read_json(resp).await;
    assert_eq!(updated["name"], "March (revised)");
    assert_eq!(updated["total"], 3000.0);
  }

  #[tokio::test]
  async fn delete_then_get_returns_404() {
    let state = make_state(true);
    let cookie = login(&state, "alice").await;

    let resp = request(
      &state,
      "POST",
      "/investments",
      Some(&cookie),
      Some(json!({ "name": "VTI", "value": 1000.0 })),
    )
    .await;
    let id = read_json(resp).await["id"].as_u64().unwrap();

    let resp = request(
      &state,
      "DELETE",
      &format!("/investments/{id}"),
      Some(&cookie),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = request(
      &state,
      "GET",
      &format!("/investments/{id}"),
      Some(&cookie),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn create_rejects_invalid_payloads() {
    let state = make_state(true);
    let cookie = login(&state, "alice").await;

    let resp = request(
      &state,
      "POST",
      "/investments",
      Some(&cookie),
      Some(json!({ "name": "  ", "value": -5.0 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = read_json(resp).await;
    assert_eq!(body["details"].as_array().unwrap().len(), 2);
  }

  // ── Documents ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn document_upload_attaches_sidecar_insights() {
    let state = make_state(true);
    let cookie = login(&state, "alice").await;

    let resp = request(
      &state,
      "POST",
      "/documents",
      Some(&cookie),
      Some(json!({ "filename": "statement.pdf", "kind": "statement" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let document = read_json(resp).await;
    assert_eq!(
      document["insights"]["summary"],
      "insights for statement.pdf"
    );
  }

  #[tokio::test]
  async fn document_upload_survives_a_dead_sidecar() {
    let state = make_state(false);
    let cookie = login(&state, "alice").await;

    let resp = request(
      &state,
      "POST",
      "/documents",
      Some(&cookie),
      Some(json!({ "filename": "statement.pdf" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let document = read_json(resp).await;
    assert!(document["insights"].is_null());
  }

  // ── Insights ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn risk_analysis_is_computed_once_then_replayed() {
    let state = make_state(true);
    let cookie = login(&state, "alice").await;

    let resp =
      request(&state, "GET", "/risk-analysis", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp =
      request(&state, "POST", "/risk-analysis", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let computed = read_json(resp).await;
    assert_eq!(computed["riskScore"], 42.0);

    let resp =
      request(&state, "GET", "/risk-analysis", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let replayed = read_json(resp).await;
    assert_eq!(replayed["id"], computed["id"]);
  }

  #[tokio::test]
  async fn forecast_defaults_to_medium_term() {
    let state = make_state(true);
    let cookie = login(&state, "alice").await;

    let resp =
      request(&state, "POST", "/forecasts", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let forecast = read_json(resp).await;
    assert_eq!(forecast["horizon"], "medium_term");
  }

  #[tokio::test]
  async fn news_relays_the_sidecar_response_with_default_query() {
    let state = make_state(true);
    let cookie = login(&state, "alice").await;

    let resp =
      request(&state, "GET", "/financial-news", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["path"], "/financial-news");
    assert_eq!(body["query"][0][1], "Indian stock market");
  }

  #[tokio::test]
  async fn stock_lookup_relays_the_sidecar_response() {
    let state = make_state(true);
    let cookie = login(&state, "alice").await;

    let resp =
      request(&state, "GET", "/stocks/AAPL", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["path"], "/finance/stock/AAPL");

    let resp = request(&state, "GET", "/stocks/AAPL", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn insight_routes_return_502_when_the_sidecar_is_down() {
    let state = make_state(false);
    let cookie = login(&state, "alice").await;

    for (method, uri) in [
      ("POST", "/risk-analysis"),
      ("POST", "/forecasts"),
      ("GET", "/ai-advisor/insights"),
      ("GET", "/financial-news"),
      ("GET", "/market-summary"),
      ("GET", "/stocks/AAPL"),
    ] {
      let resp = request(&state, method, uri, Some(&cookie), None).await;
      assert_eq!(resp.status(), StatusCode::BAD_GATEWAY, "{method} {uri}");
    }
  }
}
