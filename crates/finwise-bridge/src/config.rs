//! Sidecar configuration.

use serde::Deserialize;

fn default_base_url() -> String {
  "http://127.0.0.1:8000".to_string()
}

const fn default_ready_attempts() -> u32 {
  30
}

const fn default_ready_interval_ms() -> u64 {
  1_000
}

const fn default_request_timeout_secs() -> u64 {
  30
}

/// How to launch and reach the insight sidecar.
///
/// Deserialised as part of the server configuration. `command` empty means
/// the sidecar is managed externally (or absent); the bridge then stays
/// `Stopped` and insight endpoints answer upstream-unavailable.
#[derive(Debug, Clone, Deserialize)]
pub struct SidecarConfig {
  /// Executable to spawn, e.g. `python3`.
  #[serde(default)]
  pub command: String,
  /// Arguments, e.g. `["-m", "uvicorn", "api.main:app"]`.
  #[serde(default)]
  pub args: Vec<String>,
  /// Base URL the sidecar listens on once up.
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Forwarded to the sidecar as `GROQ_API_KEY`.
  #[serde(default)]
  pub groq_api_key: Option<String>,
  /// Forwarded to the sidecar as `TAVILY_API_KEY`.
  #[serde(default)]
  pub tavily_api_key: Option<String>,
  /// Maximum number of readiness health checks before start fails.
  #[serde(default = "default_ready_attempts")]
  pub ready_attempts: u32,
  /// Delay between readiness health checks.
  #[serde(default = "default_ready_interval_ms")]
  pub ready_interval_ms: u64,
  /// Per-request timeout for insight calls.
  #[serde(default = "default_request_timeout_secs")]
  pub request_timeout_secs: u64,
}

impl Default for SidecarConfig {
  fn default() -> Self {
    Self {
      command:              String::new(),
      args:                 Vec::new(),
      base_url:             default_base_url(),
      groq_api_key:         None,
      tavily_api_key:       None,
      ready_attempts:       default_ready_attempts(),
      ready_interval_ms:    default_ready_interval_ms(),
      request_timeout_secs: default_request_timeout_secs(),
    }
  }
}
