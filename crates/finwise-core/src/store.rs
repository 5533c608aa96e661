//! The `FinanceStore` trait — the uniform repository contract.
//!
//! The trait is implemented by storage backends (e.g. `finwise-store-memory`).
//! Higher layers (`finwise-api`) depend on this abstraction, not on any
//! concrete backend. Per-entity semantics:
//!
//! - `create_*` allocates the next sequential id for that entity type, stamps
//!   server-controlled fields, indexes the record under its owner, and
//!   returns the stored record. It never fails for a well-formed payload
//!   (the one domain failure is a duplicate username).
//! - `get_*` returns `None` for an absent id and does **not** enforce
//!   ownership — that is the router's responsibility.
//! - `list_*` returns an owner's records in creation order.
//! - `update_*` fails with a not-found error if the id is absent; otherwise
//!   merges the payload over the stored record (absent payload fields keep
//!   their prior values) and returns the result.
//! - `delete_*` returns `false` if the id is absent, `true` once removed
//!   from both the primary collection and the owner index.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use crate::{
  RecordId,
  budget::{Budget, BudgetUpdate, NewBudget},
  chat::{ChatMessage, NewChatMessage},
  document::{DocumentUpdate, NewDocument, UserDocument},
  insight::{Forecast, ForecastReport, RiskAnalysis, RiskReport},
  investment::{Investment, InvestmentUpdate, NewInvestment},
  snapshot::{FinancialSnapshot, SnapshotData},
  user::{FinancialProfile, NewUser, ProfileUpdate, User},
};

/// Abstraction over a FinWise record-store backend.
pub trait FinanceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a new user. Fails if the username is taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Retrieve a user by unique username. Returns `None` if not found.
  fn get_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Merge profile fields onto an existing user.
  fn update_profile(
    &self,
    id: RecordId,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Persist the financial profile and flip the onboarding flag as one
  /// unit. Returns the updated user.
  fn complete_onboarding(
    &self,
    id: RecordId,
    profile: FinancialProfile,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  // ── Financial snapshot ────────────────────────────────────────────────

  /// Create the owner's snapshot. Idempotent: if one already exists it is
  /// returned untouched.
  fn create_snapshot(
    &self,
    owner_id: RecordId,
    data: SnapshotData,
  ) -> impl Future<Output = Result<FinancialSnapshot, Self::Error>> + Send + '_;

  /// The owner's current snapshot, if onboarding has seeded one.
  fn get_snapshot(
    &self,
    owner_id: RecordId,
  ) -> impl Future<Output = Result<Option<FinancialSnapshot>, Self::Error>>
  + Send
  + '_;

  // ── Chat — append-only ────────────────────────────────────────────────

  fn append_chat_message(
    &self,
    input: NewChatMessage,
  ) -> impl Future<Output = Result<ChatMessage, Self::Error>> + Send + '_;

  /// All of an owner's messages in creation order.
  fn list_chat_messages(
    &self,
    owner_id: RecordId,
  ) -> impl Future<Output = Result<Vec<ChatMessage>, Self::Error>> + Send + '_;

  // ── Documents ─────────────────────────────────────────────────────────

  fn create_document(
    &self,
    owner_id: RecordId,
    input: NewDocument,
  ) -> impl Future<Output = Result<UserDocument, Self::Error>> + Send + '_;

  fn get_document(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<Option<UserDocument>, Self::Error>> + Send + '_;

  fn list_documents(
    &self,
    owner_id: RecordId,
  ) -> impl Future<Output = Result<Vec<UserDocument>, Self::Error>> + Send + '_;

  fn update_document(
    &self,
    id: RecordId,
    update: DocumentUpdate,
  ) -> impl Future<Output = Result<UserDocument, Self::Error>> + Send + '_;

  fn delete_document(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Investments ───────────────────────────────────────────────────────

  fn create_investment(
    &self,
    owner_id: RecordId,
    input: NewInvestment,
  ) -> impl Future<Output = Result<Investment, Self::Error>> + Send + '_;

  fn get_investment(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<Option<Investment>, Self::Error>> + Send + '_;

  fn list_investments(
    &self,
    owner_id: RecordId,
  ) -> impl Future<Output = Result<Vec<Investment>, Self::Error>> + Send + '_;

  fn update_investment(
    &self,
    id: RecordId,
    update: InvestmentUpdate,
  ) -> impl Future<Output = Result<Investment, Self::Error>> + Send + '_;

  fn delete_investment(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Budgets ───────────────────────────────────────────────────────────

  fn create_budget(
    &self,
    owner_id: RecordId,
    input: NewBudget,
  ) -> impl Future<Output = Result<Budget, Self::Error>> + Send + '_;

  fn get_budget(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<Option<Budget>, Self::Error>> + Send + '_;

  fn list_budgets(
    &self,
    owner_id: RecordId,
  ) -> impl Future<Output = Result<Vec<Budget>, Self::Error>> + Send + '_;

  fn update_budget(
    &self,
    id: RecordId,
    update: BudgetUpdate,
  ) -> impl Future<Output = Result<Budget, Self::Error>> + Send + '_;

  fn delete_budget(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Risk analyses — append-only ───────────────────────────────────────

  fn append_risk_analysis(
    &self,
    owner_id: RecordId,
    report: RiskReport,
  ) -> impl Future<Output = Result<RiskAnalysis, Self::Error>> + Send + '_;

  fn list_risk_analyses(
    &self,
    owner_id: RecordId,
  ) -> impl Future<Output = Result<Vec<RiskAnalysis>, Self::Error>> + Send + '_;

  // ── Forecasts — append-only ───────────────────────────────────────────

  fn append_forecast(
    &self,
    owner_id: RecordId,
    report: ForecastReport,
  ) -> impl Future<Output = Result<Forecast, Self::Error>> + Send + '_;

  fn list_forecasts(
    &self,
    owner_id: RecordId,
  ) -> impl Future<Output = Result<Vec<Forecast>, Self::Error>> + Send + '_;
}
