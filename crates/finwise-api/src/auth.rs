//! Sessions, credential verification, and the authentication endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/register` | Body: `{"username","password"}`; 201 |
//! | `POST` | `/auth/login` | 200 + session cookie |
//! | `POST` | `/auth/logout` | Revokes the session, clears the cookie |
//! | `GET`  | `/auth/status` | Never 401; reports `authenticated: false` |
//!
//! A session is a 32-byte random token held server-side; the cookie value is
//! `token.sig` with `sig = hex(SHA-256(secret ‖ token))`, so a tampered
//! cookie is rejected before the session map is consulted. Passwords are
//! argon2 PHC strings, never stored or compared in plaintext.

use std::{
  collections::HashMap,
  sync::{Arc, RwLock},
};

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{HeaderMap, StatusCode, header, request::Parts},
  response::IntoResponse,
};
use finwise_core::{
  RecordId,
  store::FinanceStore,
  user::NewUser,
};
use finwise_bridge::InsightSource;
use rand_core::{OsRng, RngCore};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::{AppState, error::{ApiError, Violations}};

pub const SESSION_COOKIE: &str = "finwise_session";

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash a plaintext password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::store(std::io::Error::other(e.to_string())))
}

/// Verify a plaintext password against a stored PHC string.
pub fn verify_password(password: &str, hash: &str) -> bool {
  PasswordHash::new(hash)
    .map(|parsed| {
      Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
    })
    .unwrap_or(false)
}

// ─── Sessions ────────────────────────────────────────────────────────────────

/// The identity a valid session resolves to.
#[derive(Debug, Clone)]
pub struct Session {
  pub user_id:  RecordId,
  pub username: String,
}

/// Server-side session table with signed cookie values.
pub struct Sessions {
  secret: String,
  inner:  RwLock<HashMap<String, Session>>,
}

impl Sessions {
  pub fn new(secret: impl Into<String>) -> Self {
    Self {
      secret: secret.into(),
      inner:  RwLock::new(HashMap::new()),
    }
  }

  fn sign(&self, token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.secret.as_bytes());
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
  }

  /// Open a session and return the cookie value.
  pub fn create(&self, user_id: RecordId, username: &str) -> String {
    let mut raw = [0u8; 32];
    OsRng.fill_bytes(&mut raw);
    let token = hex::encode(raw);
    let cookie = format!("{token}.{}", self.sign(&token));

    self
      .inner
      .write()
      .unwrap_or_else(|e| e.into_inner())
      .insert(token, Session {
        user_id,
        username: username.to_string(),
      });
    cookie
  }

  /// Resolve a cookie value to its session, rejecting bad signatures.
  pub fn resolve(&self, cookie: &str) -> Option<Session> {
    let (token, sig) = cookie.split_once('.')?;
    if !constant_time_eq(sig.as_bytes(), self.sign(token).as_bytes()) {
      return None;
    }
    self
      .inner
      .read()
      .unwrap_or_else(|e| e.into_inner())
      .get(token)
      .cloned()
  }

  /// Drop the session behind a cookie value, if it exists.
  pub fn revoke(&self, cookie: &str) {
    if let Some((token, _)) = cookie.split_once('.') {
      self
        .inner
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .remove(token);
    }
  }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
  if a.len() != b.len() {
    return false;
  }
  a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Pull the session cookie value out of the request headers.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::COOKIE)
    .and_then(|v| v.to_str().ok())
    .and_then(|cookies| {
      cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then_some(value)
      })
    })
}

fn set_cookie(value: &str) -> String {
  format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax")
}

fn clear_cookie() -> String {
  format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// Present in a handler's arguments means the request carries a valid
/// session; carries exactly the identity the session was bound to.
#[derive(Debug, Clone)]
pub struct CurrentUser {
  pub user_id:  RecordId,
  pub username: String,
}

impl<S, B> FromRequestParts<AppState<S, B>> for CurrentUser
where
  S: FinanceStore + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, B>,
  ) -> Result<Self, Self::Rejection> {
    let cookie =
      session_cookie(&parts.headers).ok_or(ApiError::Unauthorized)?;
    let session =
      state.sessions.resolve(cookie).ok_or(ApiError::Unauthorized)?;
    Ok(CurrentUser {
      user_id:  session.user_id,
      username: session.username,
    })
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username: String,
  pub password: String,
}

/// `POST /auth/register` — body: `{"username","password"}`.
pub async fn register<S, B>(
  State(state): State<AppState<S, B>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let mut v = Violations::default();
  v.require(
    body.username.trim().len() >= 3,
    "username: at least 3 characters",
  );
  v.require(body.password.len() >= 6, "password: at least 6 characters");
  v.finish()?;

  let username = body.username.trim().to_string();

  // Duplicate check happens before the side-effecting insert.
  let existing = state
    .store
    .get_user_by_username(&username)
    .await
    .map_err(ApiError::store)?;
  if existing.is_some() {
    return Err(ApiError::BadRequest(
      "username already registered".to_string(),
    ));
  }

  let user = state
    .store
    .create_user(NewUser {
      username,
      password_hash: hash_password(&body.password)?,
    })
    .await
    .map_err(ApiError::store)?;

  tracing::info!(user_id = user.id, username = %user.username, "user registered");
  Ok((
    StatusCode::CREATED,
    Json(json!({ "id": user.id, "username": user.username })),
  ))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

/// `POST /auth/login` — 200 + session cookie on success, 401 otherwise.
pub async fn login<S, B>(
  State(state): State<AppState<S, B>>,
  Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let user = state
    .store
    .get_user_by_username(&body.username)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;

  if !verify_password(&body.password, &user.password_hash) {
    return Err(ApiError::Unauthorized);
  }

  let cookie = state.sessions.create(user.id, &user.username);
  tracing::info!(user_id = user.id, "login");
  Ok((
    [(header::SET_COOKIE, set_cookie(&cookie))],
    Json(user),
  ))
}

/// `POST /auth/logout` — revokes the session and clears the cookie.
pub async fn logout<S, B>(
  State(state): State<AppState<S, B>>,
  headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let cookie = session_cookie(&headers).ok_or(ApiError::Unauthorized)?;
  state.sessions.resolve(cookie).ok_or(ApiError::Unauthorized)?;
  state.sessions.revoke(cookie);

  Ok((
    [(header::SET_COOKIE, clear_cookie())],
    Json(json!({ "message": "logged out" })),
  ))
}

/// `GET /auth/status` — never 401; the onboarding flag is read from the
/// store so a flag flipped mid-session is not reported stale.
pub async fn status<S, B>(
  State(state): State<AppState<S, B>>,
  headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let session = session_cookie(&headers)
    .and_then(|cookie| state.sessions.resolve(cookie));

  let Some(session) = session else {
    return Ok(Json(json!({ "authenticated": false })));
  };

  let user = state
    .store
    .get_user(session.user_id)
    .await
    .map_err(ApiError::store)?;

  match user {
    Some(user) => Ok(Json(json!({
      "authenticated": true,
      "onboardingCompleted": user.onboarding_completed,
      "user": user,
    }))),
    // Session outlived the user record (possible after a store swap).
    None => Ok(Json(json!({ "authenticated": false }))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn password_hash_round_trip() {
    let hash = hash_password("secret-enough").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("secret-enough", &hash));
    assert!(!verify_password("wrong", &hash));
  }

  #[test]
  fn verify_rejects_malformed_hash() {
    assert!(!verify_password("anything", "not-a-phc-string"));
  }

  #[test]
  fn session_round_trip() {
    let sessions = Sessions::new("test-secret");
    let cookie = sessions.create(7, "alice");

    let session = sessions.resolve(&cookie).unwrap();
    assert_eq!(session.user_id, 7);
    assert_eq!(session.username, "alice");

    sessions.revoke(&cookie);
    assert!(sessions.resolve(&cookie).is_none());
  }

  #[test]
  fn tampered_cookie_is_rejected() {
    let sessions = Sessions::new("test-secret");
    let cookie = sessions.create(7, "alice");

    let (token, _sig) = cookie.split_once('.').unwrap();
    let forged = format!("{token}.{}", "0".repeat(64));
    assert!(sessions.resolve(&forged).is_none());

    // A token signed under a different secret is also rejected.
    let other = Sessions::new("other-secret");
    assert!(other.resolve(&cookie).is_none());
  }

  #[test]
  fn cookie_header_parsing() {
    let mut headers = HeaderMap::new();
    headers.insert(
      header::COOKIE,
      format!("other=1; {SESSION_COOKIE}=abc.def; theme=dark")
        .parse()
        .unwrap(),
    );
    assert_eq!(session_cookie(&headers), Some("abc.def"));

    headers.clear();
    headers.insert(header::COOKIE, "other=1".parse().unwrap());
    assert_eq!(session_cookie(&headers), None);
  }
}
