//! Contract tests for `MemoryStore`.

use finwise_core::{
  Error,
  chat::NewChatMessage,
  insight::{PortfolioHealth, RiskReport},
  investment::{InvestmentUpdate, NewInvestment},
  snapshot::SnapshotData,
  store::FinanceStore,
  user::{FinancialProfile, NewUser, ProfileUpdate, RiskTolerance},
};
use serde_json::Value;

use crate::MemoryStore;

fn new_user(username: &str) -> NewUser {
  NewUser {
    username:      username.to_string(),
    password_hash: "$argon2id$stub".to_string(),
  }
}

fn investment(name: &str) -> NewInvestment {
  NewInvestment {
    name:           name.to_string(),
    kind:           Default::default(),
    value:          1000.0,
    purchase_date:  None,
    purchase_price: None,
    current_price:  10.0,
    quantity:       100.0,
    notes:          None,
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_user() {
  let s = MemoryStore::new();

  let user = s.create_user(new_user("alice")).await.unwrap();
  assert_eq!(user.username, "alice");
  assert!(!user.onboarding_completed);

  let fetched = s.get_user(user.id).await.unwrap().unwrap();
  assert_eq!(fetched.id, user.id);
  assert_eq!(fetched.username, "alice");

  let by_name = s.get_user_by_username("alice").await.unwrap().unwrap();
  assert_eq!(by_name.id, user.id);
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
  let s = MemoryStore::new();
  s.create_user(new_user("alice")).await.unwrap();

  let err = s.create_user(new_user("alice")).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateUsername(u) if u == "alice"));
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = MemoryStore::new();
  assert!(s.get_user(42).await.unwrap().is_none());
  assert!(s.get_user_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn profile_update_merges_fields() {
  let s = MemoryStore::new();
  let user = s.create_user(new_user("alice")).await.unwrap();

  s.update_profile(user.id, ProfileUpdate {
    display_name: Some("Alice".to_string()),
    email: Some("alice@example.com".to_string()),
    ..Default::default()
  })
  .await
  .unwrap();

  // A second update touching one field must not clear the others.
  let updated = s
    .update_profile(user.id, ProfileUpdate {
      phone: Some("555-0100".to_string()),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(updated.display_name.as_deref(), Some("Alice"));
  assert_eq!(updated.email.as_deref(), Some("alice@example.com"));
  assert_eq!(updated.phone.as_deref(), Some("555-0100"));
}

#[tokio::test]
async fn complete_onboarding_sets_profile_and_flag() {
  let s = MemoryStore::new();
  let user = s.create_user(new_user("alice")).await.unwrap();

  let profile = FinancialProfile {
    annual_income:     75_000.0,
    monthly_expenses:  3_500.0,
    employment_status: "full-time".to_string(),
    savings_goal:      10_000.0,
    risk_tolerance:    RiskTolerance::Medium,
  };
  let updated = s.complete_onboarding(user.id, profile.clone()).await.unwrap();

  assert!(updated.onboarding_completed);
  assert_eq!(updated.financial_profile, Some(profile));
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn snapshot_create_is_idempotent_per_owner() {
  let s = MemoryStore::new();
  let user = s.create_user(new_user("alice")).await.unwrap();

  let first = s
    .create_snapshot(user.id, SnapshotData::onboarding_defaults())
    .await
    .unwrap();

  let mut other = SnapshotData::onboarding_defaults();
  other.net_worth = 1.0;
  let second = s.create_snapshot(user.id, other).await.unwrap();

  // The existing snapshot wins.
  assert_eq!(second.id, first.id);
  assert_eq!(second.data.net_worth, 124_500.0);

  let fetched = s.get_snapshot(user.id).await.unwrap().unwrap();
  assert_eq!(fetched.data.assets, 189_300.0);
  assert_eq!(fetched.data.liabilities, 64_800.0);
}

#[tokio::test]
async fn snapshot_missing_returns_none() {
  let s = MemoryStore::new();
  let user = s.create_user(new_user("alice")).await.unwrap();
  assert!(s.get_snapshot(user.id).await.unwrap().is_none());
}

// ─── Chat ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_messages_keep_insertion_order() {
  let s = MemoryStore::new();
  let user = s.create_user(new_user("alice")).await.unwrap();

  s.append_chat_message(NewChatMessage::user(user.id, "hello"))
    .await
    .unwrap();
  s.append_chat_message(NewChatMessage::ai(user.id, "hi there"))
    .await
    .unwrap();
  s.append_chat_message(NewChatMessage::user(user.id, "thanks"))
    .await
    .unwrap();

  let history = s.list_chat_messages(user.id).await.unwrap();
  assert_eq!(history.len(), 3);
  assert_eq!(history[0].content, "hello");
  assert!(history[0].from_user);
  assert_eq!(history[1].content, "hi there");
  assert!(!history[1].from_user);
  assert_eq!(history[2].content, "thanks");
  assert!(history.windows(2).all(|w| w[0].id < w[1].id));
}

// ─── Investments (representative CRUD entity) ────────────────────────────────

#[tokio::test]
async fn create_then_get_returns_equal_record() {
  let s = MemoryStore::new();
  let user = s.create_user(new_user("alice")).await.unwrap();

  let created = s
    .create_investment(user.id, investment("Index Fund"))
    .await
    .unwrap();
  let fetched = s.get_investment(created.id).await.unwrap().unwrap();

  assert_eq!(fetched.id, created.id);
  assert_eq!(fetched.owner_id, user.id);
  assert_eq!(fetched.name, "Index Fund");
  assert_eq!(fetched.value, 1000.0);
  assert_eq!(fetched.created_at, created.created_at);
}

#[tokio::test]
async fn list_after_delete_drops_exactly_the_deleted_record() {
  let s = MemoryStore::new();
  let user = s.create_user(new_user("alice")).await.unwrap();

  let mut ids = Vec::new();
  for i in 0..5 {
    let inv = s
      .create_investment(user.id, investment(&format!("pos-{i}")))
      .await
      .unwrap();
    ids.push(inv.id);
  }

  assert!(s.delete_investment(ids[2]).await.unwrap());

  let listed = s.list_investments(user.id).await.unwrap();
  assert_eq!(listed.len(), 4);
  assert!(listed.iter().all(|inv| inv.id != ids[2]));
  // Creation order survives the delete.
  assert!(listed.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
async fn delete_missing_returns_false() {
  let s = MemoryStore::new();
  assert!(!s.delete_investment(99).await.unwrap());
}

#[tokio::test]
async fn ids_are_monotonic_and_never_reused() {
  let s = MemoryStore::new();
  let user = s.create_user(new_user("alice")).await.unwrap();

  let a = s.create_investment(user.id, investment("a")).await.unwrap();
  let b = s.create_investment(user.id, investment("b")).await.unwrap();
  assert!(b.id > a.id);

  s.delete_investment(b.id).await.unwrap();
  let c = s.create_investment(user.id, investment("c")).await.unwrap();
  assert!(c.id > b.id, "id {} reused after delete of {}", c.id, b.id);
}

#[tokio::test]
async fn update_merges_and_is_idempotent() {
  let s = MemoryStore::new();
  let user = s.create_user(new_user("alice")).await.unwrap();
  let inv = s
    .create_investment(user.id, investment("Index Fund"))
    .await
    .unwrap();

  let update = InvestmentUpdate {
    value: Some(1200.0),
    notes: Some("rebalanced".to_string()),
    ..Default::default()
  };

  let once = s.update_investment(inv.id, update.clone()).await.unwrap();
  assert_eq!(once.value, 1200.0);
  assert_eq!(once.name, "Index Fund");
  assert_eq!(once.notes.as_deref(), Some("rebalanced"));

  let twice = s.update_investment(inv.id, update).await.unwrap();
  assert_eq!(twice.value, once.value);
  assert_eq!(twice.name, once.name);
  assert_eq!(twice.notes, once.notes);
}

#[tokio::test]
async fn update_missing_fails_with_not_found() {
  let s = MemoryStore::new();
  let err = s
    .update_investment(7, InvestmentUpdate::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::RecordNotFound { entity: "investment", id: 7 }));
}

// ─── Ownership isolation ─────────────────────────────────────────────────────

#[tokio::test]
async fn listings_are_scoped_to_the_owner() {
  let s = MemoryStore::new();
  let alice = s.create_user(new_user("alice")).await.unwrap();
  let bob = s.create_user(new_user("bob")).await.unwrap();

  s.create_investment(alice.id, investment("hers")).await.unwrap();
  s.create_investment(bob.id, investment("his")).await.unwrap();
  s.create_investment(bob.id, investment("also his")).await.unwrap();

  let hers = s.list_investments(alice.id).await.unwrap();
  assert_eq!(hers.len(), 1);
  assert!(hers.iter().all(|inv| inv.owner_id == alice.id));

  let his = s.list_investments(bob.id).await.unwrap();
  assert_eq!(his.len(), 2);
  assert!(his.iter().all(|inv| inv.owner_id == bob.id));
}

// ─── Append-only insight records ─────────────────────────────────────────────

#[tokio::test]
async fn risk_analyses_append_in_order() {
  let s = MemoryStore::new();
  let user = s.create_user(new_user("alice")).await.unwrap();

  for score in [42.0, 55.0] {
    s.append_risk_analysis(user.id, RiskReport {
      risk_score:            score,
      portfolio_health:      PortfolioHealth::Good,
      diversification_score: 70.0,
      volatility_metrics:    Value::Null,
      recommendations:       vec![],
      scenario_analysis:     Value::Null,
    })
    .await
    .unwrap();
  }

  let analyses = s.list_risk_analyses(user.id).await.unwrap();
  assert_eq!(analyses.len(), 2);
  // Most recent last; the default read takes the tail.
  assert_eq!(analyses.last().unwrap().report.risk_score, 55.0);
}
