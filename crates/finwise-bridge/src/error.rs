//! Error types for `finwise-bridge`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
  /// The local HTTP client could not be constructed. A process-local
  /// failure, unrelated to the sidecar's state.
  #[error("failed to build http client: {0}")]
  Client(#[source] reqwest::Error),

  /// The sidecar could not be reached at the network level. Distinct from
  /// [`BridgeError::Upstream`], which is the sidecar's own reported failure.
  #[error("sidecar unreachable: {0}")]
  Unreachable(#[source] reqwest::Error),

  /// The sidecar answered with a non-success status.
  #[error("sidecar returned status {status}")]
  Upstream { status: u16 },

  /// The sidecar's response body could not be decoded.
  #[error("sidecar response malformed: {0}")]
  Decode(#[source] reqwest::Error),

  #[error("failed to spawn sidecar process: {0}")]
  Spawn(#[source] std::io::Error),

  /// The readiness poll exhausted its attempt budget.
  #[error("sidecar not ready after {attempts} health checks")]
  ReadyTimeout { attempts: u32 },

  /// A call was made while the bridge is not in the `Ready` state.
  #[error("sidecar is not running")]
  NotRunning,
}

pub type Result<T, E = BridgeError> = std::result::Result<T, E>;
