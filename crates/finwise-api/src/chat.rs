//! Advisor chat endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/chat/history` | Most recent [`HISTORY_LIMIT`] messages, oldest first |
//! | `POST` | `/chat/query` | Persists the user message, asks the sidecar, persists the reply |
//!
//! The user's message is persisted before the sidecar call, so a sidecar
//! failure leaves exactly that one message in the history.

use axum::{Json, extract::State, response::IntoResponse};
use finwise_bridge::InsightSource;
use finwise_core::{
  chat::{ChatMessage, NewChatMessage},
  store::FinanceStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
  AppState,
  auth::CurrentUser,
  error::{ApiError, Violations},
};

/// How many messages a history read returns.
pub const HISTORY_LIMIT: usize = 20;

/// How many prior turns the sidecar sees as context.
const CONTEXT_TURNS: usize = 10;

/// `GET /chat/history`
pub async fn history<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
) -> Result<Json<Vec<ChatMessage>>, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let mut messages = state
    .store
    .list_chat_messages(user.user_id)
    .await
    .map_err(ApiError::store)?;

  let skip = messages.len().saturating_sub(HISTORY_LIMIT);
  Ok(Json(messages.split_off(skip)))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
  pub message: String,
}

/// `POST /chat/query` — body: `{"message":"..."}`.
pub async fn query<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
  Json(body): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let mut v = Violations::default();
  v.require(
    !body.message.trim().is_empty(),
    "message: must not be empty",
  );
  v.finish()?;

  state
    .store
    .append_chat_message(NewChatMessage::user(user.user_id, body.message.clone()))
    .await
    .map_err(ApiError::store)?;

  let context = crate::insights::build_context::<S>(
    &state.store,
    user.user_id,
    CONTEXT_TURNS,
  )
  .await?;

  let reply = state
    .bridge
    .chat_reply(&context, &body.message)
    .await
    .map_err(ApiError::Upstream)?;

  state
    .store
    .append_chat_message(NewChatMessage::ai(user.user_id, reply.clone()))
    .await
    .map_err(ApiError::store)?;

  Ok(Json(json!({ "response": reply })))
}
