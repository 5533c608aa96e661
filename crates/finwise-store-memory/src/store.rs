//! [`MemoryStore`] — the in-memory implementation of [`FinanceStore`].

use std::{
  collections::HashMap,
  sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::Utc;
use finwise_core::{
  Error, RecordId, Result,
  budget::{Budget, BudgetUpdate, NewBudget},
  chat::{ChatMessage, NewChatMessage},
  document::{DocumentUpdate, NewDocument, UserDocument},
  insight::{Forecast, ForecastReport, RiskAnalysis, RiskReport},
  investment::{Investment, InvestmentUpdate, NewInvestment},
  snapshot::{FinancialSnapshot, SnapshotData},
  store::FinanceStore,
  user::{FinancialProfile, NewUser, ProfileUpdate, User},
};

use crate::table::{Owned, Table};

// ─── Index plumbing ──────────────────────────────────────────────────────────

macro_rules! owned {
  ($ty:ty) => {
    impl Owned for $ty {
      fn id(&self) -> RecordId {
        self.id
      }
      fn owner_id(&self) -> RecordId {
        self.owner_id
      }
    }
  };
}

owned!(ChatMessage);
owned!(UserDocument);
owned!(Investment);
owned!(Budget);
owned!(RiskAnalysis);
owned!(Forecast);

// ─── Collections ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Collections {
  next_user_id: RecordId,
  users:        HashMap<RecordId, User>,
  by_username:  HashMap<String, RecordId>,

  /// One snapshot per owner, keyed by owner id.
  next_snapshot_id: RecordId,
  snapshots:        HashMap<RecordId, FinancialSnapshot>,

  chat_messages: Table<ChatMessage>,
  documents:     Table<UserDocument>,
  investments:   Table<Investment>,
  budgets:       Table<Budget>,
  risk_analyses: Table<RiskAnalysis>,
  forecasts:     Table<Forecast>,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A FinWise record store held entirely in process memory.
///
/// Cloning is cheap — the collections are reference-counted. A single
/// reader-writer lock guards all collections; no lock is ever held across an
/// await point, so the store is safe under a multi-threaded runtime.
#[derive(Clone, Default)]
pub struct MemoryStore {
  inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn read(&self) -> RwLockReadGuard<'_, Collections> {
    self.inner.read().unwrap_or_else(|e| e.into_inner())
  }

  fn write(&self) -> RwLockWriteGuard<'_, Collections> {
    self.inner.write().unwrap_or_else(|e| e.into_inner())
  }
}

impl FinanceStore for MemoryStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let mut c = self.write();

    if c.by_username.contains_key(&input.username) {
      return Err(Error::DuplicateUsername(input.username));
    }

    c.next_user_id += 1;
    let user = User {
      id:            c.next_user_id,
      username:      input.username.clone(),
      password_hash: input.password_hash,
      display_name:  None,
      email:         None,
      phone:         None,
      avatar_url:    None,
      financial_profile: None,
      onboarding_completed: false,
      created_at: Utc::now(),
    };
    c.by_username.insert(input.username, user.id);
    c.users.insert(user.id, user.clone());
    Ok(user)
  }

  async fn get_user(&self, id: RecordId) -> Result<Option<User>> {
    Ok(self.read().users.get(&id).cloned())
  }

  async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
    let c = self.read();
    Ok(
      c.by_username
        .get(username)
        .and_then(|id| c.users.get(id))
        .cloned(),
    )
  }

  async fn update_profile(
    &self,
    id: RecordId,
    update: ProfileUpdate,
  ) -> Result<User> {
    let mut c = self.write();
    let user = c.users.get_mut(&id).ok_or(Error::UserNotFound(id))?;
    user.apply(update);
    Ok(user.clone())
  }

  async fn complete_onboarding(
    &self,
    id: RecordId,
    profile: FinancialProfile,
  ) -> Result<User> {
    let mut c = self.write();
    let user = c.users.get_mut(&id).ok_or(Error::UserNotFound(id))?;
    user.financial_profile = Some(profile);
    user.onboarding_completed = true;
    Ok(user.clone())
  }

  // ── Financial snapshot ────────────────────────────────────────────────

  async fn create_snapshot(
    &self,
    owner_id: RecordId,
    data: SnapshotData,
  ) -> Result<FinancialSnapshot> {
    let mut c = self.write();

    if let Some(existing) = c.snapshots.get(&owner_id) {
      return Ok(existing.clone());
    }

    c.next_snapshot_id += 1;
    let now = Utc::now();
    let snapshot = FinancialSnapshot {
      id: c.next_snapshot_id,
      owner_id,
      data,
      created_at: now,
      updated_at: now,
    };
    c.snapshots.insert(owner_id, snapshot.clone());
    Ok(snapshot)
  }

  async fn get_snapshot(
    &self,
    owner_id: RecordId,
  ) -> Result<Option<FinancialSnapshot>> {
    Ok(self.read().snapshots.get(&owner_id).cloned())
  }

  // ── Chat ──────────────────────────────────────────────────────────────

  async fn append_chat_message(
    &self,
    input: NewChatMessage,
  ) -> Result<ChatMessage> {
    Ok(self.write().chat_messages.insert_with(|id| ChatMessage {
      id,
      owner_id: input.owner_id,
      content: input.content,
      from_user: input.from_user,
      metadata: input.metadata,
      created_at: Utc::now(),
    }))
  }

  async fn list_chat_messages(
    &self,
    owner_id: RecordId,
  ) -> Result<Vec<ChatMessage>> {
    Ok(self.read().chat_messages.list_by_owner(owner_id))
  }

  // ── Documents ─────────────────────────────────────────────────────────

  async fn create_document(
    &self,
    owner_id: RecordId,
    input: NewDocument,
  ) -> Result<UserDocument> {
    Ok(self.write().documents.insert_with(|id| UserDocument {
      id,
      owner_id,
      filename: input.filename,
      kind: input.kind,
      uploaded_at: Utc::now(),
      content: input.content,
      metadata: input.metadata,
      insights: None,
    }))
  }

  async fn get_document(&self, id: RecordId) -> Result<Option<UserDocument>> {
    Ok(self.read().documents.get(id).cloned())
  }

  async fn list_documents(
    &self,
    owner_id: RecordId,
  ) -> Result<Vec<UserDocument>> {
    Ok(self.read().documents.list_by_owner(owner_id))
  }

  async fn update_document(
    &self,
    id: RecordId,
    update: DocumentUpdate,
  ) -> Result<UserDocument> {
    let mut c = self.write();
    let doc = c.documents.get_mut(id).ok_or(Error::RecordNotFound {
      entity: "document",
      id,
    })?;
    doc.apply(update);
    Ok(doc.clone())
  }

  async fn delete_document(&self, id: RecordId) -> Result<bool> {
    Ok(self.write().documents.remove(id))
  }

  // ── Investments ───────────────────────────────────────────────────────

  async fn create_investment(
    &self,
    owner_id: RecordId,
    input: NewInvestment,
  ) -> Result<Investment> {
    Ok(self.write().investments.insert_with(|id| Investment {
      id,
      owner_id,
      name: input.name,
      kind: input.kind,
      value: input.value,
      purchase_date: input.purchase_date,
      purchase_price: input.purchase_price,
      current_price: input.current_price,
      quantity: input.quantity,
      notes: input.notes,
      created_at: Utc::now(),
    }))
  }

  async fn get_investment(&self, id: RecordId) -> Result<Option<Investment>> {
    Ok(self.read().investments.get(id).cloned())
  }

  async fn list_investments(
    &self,
    owner_id: RecordId,
  ) -> Result<Vec<Investment>> {
    Ok(self.read().investments.list_by_owner(owner_id))
  }

  async fn update_investment(
    &self,
    id: RecordId,
    update: InvestmentUpdate,
  ) -> Result<Investment> {
    let mut c = self.write();
    let inv = c.investments.get_mut(id).ok_or(Error::RecordNotFound {
      entity: "investment",
      id,
    })?;
    inv.apply(update);
    Ok(inv.clone())
  }

  async fn delete_investment(&self, id: RecordId) -> Result<bool> {
    Ok(self.write().investments.remove(id))
  }

  // ── Budgets ───────────────────────────────────────────────────────────

  async fn create_budget(
    &self,
    owner_id: RecordId,
    input: NewBudget,
  ) -> Result<Budget> {
    Ok(self.write().budgets.insert_with(|id| Budget {
      id,
      owner_id,
      name: input.name,
      start_date: input.start_date,
      end_date: input.end_date,
      total: input.total,
      categories: input.categories,
      status: input.status,
      created_at: Utc::now(),
    }))
  }

  async fn get_budget(&self, id: RecordId) -> Result<Option<Budget>> {
    Ok(self.read().budgets.get(id).cloned())
  }

  async fn list_budgets(&self, owner_id: RecordId) -> Result<Vec<Budget>> {
    Ok(self.read().budgets.list_by_owner(owner_id))
  }

  async fn update_budget(
    &self,
    id: RecordId,
    update: BudgetUpdate,
  ) -> Result<Budget> {
    let mut c = self.write();
    let budget = c.budgets.get_mut(id).ok_or(Error::RecordNotFound {
      entity: "budget",
      id,
    })?;
    budget.apply(update);
    Ok(budget.clone())
  }

  async fn delete_budget(&self, id: RecordId) -> Result<bool> {
    Ok(self.write().budgets.remove(id))
  }

  // ── Risk analyses ─────────────────────────────────────────────────────

  async fn append_risk_analysis(
    &self,
    owner_id: RecordId,
    report: RiskReport,
  ) -> Result<RiskAnalysis> {
    Ok(self.write().risk_analyses.insert_with(|id| RiskAnalysis {
      id,
      owner_id,
      report,
      created_at: Utc::now(),
    }))
  }

  async fn list_risk_analyses(
    &self,
    owner_id: RecordId,
  ) -> Result<Vec<RiskAnalysis>> {
    Ok(self.read().risk_analyses.list_by_owner(owner_id))
  }

  // ── Forecasts ─────────────────────────────────────────────────────────

  async fn append_forecast(
    &self,
    owner_id: RecordId,
    report: ForecastReport,
  ) -> Result<Forecast> {
    Ok(self.write().forecasts.insert_with(|id| Forecast {
      id,
      owner_id,
      report,
      created_at: Utc::now(),
    }))
  }

  async fn list_forecasts(&self, owner_id: RecordId) -> Result<Vec<Forecast>> {
    Ok(self.read().forecasts.list_by_owner(owner_id))
  }
}
