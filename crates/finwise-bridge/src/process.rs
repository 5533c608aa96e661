//! Sidecar process lifecycle.
//!
//! State machine: `Stopped → Starting → Ready → Stopped`, with
//! `Starting → Failed` when the readiness poll exhausts its attempt budget.
//! The poll is bounded so a sidecar that never comes up fails the start
//! instead of hanging it.

use std::{process::Stdio, time::Duration};

use tokio::process::{Child, Command};

use crate::{
  config::SidecarConfig,
  error::{BridgeError, Result},
};

/// Where the managed sidecar currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
  Stopped,
  Starting,
  Ready,
  Failed,
}

/// Owns the sidecar child process and its readiness state.
pub struct SidecarProcess {
  config: SidecarConfig,
  http:   reqwest::Client,
  child:  Option<Child>,
  state:  BridgeState,
}

impl SidecarProcess {
  pub fn new(config: SidecarConfig) -> Result<Self> {
    // The short timeout keeps readiness probes against a dead sidecar from
    // hanging; a client without it is worse than no client.
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(2))
      .build()
      .map_err(BridgeError::Client)?;
    Ok(Self {
      config,
      http,
      child: None,
      state: BridgeState::Stopped,
    })
  }

  pub fn state(&self) -> BridgeState {
    self.state
  }

  /// One probe of the sidecar's liveness endpoint.
  pub async fn health_check(&self) -> Result<()> {
    let url = format!("{}/health", self.config.base_url.trim_end_matches('/'));
    let response = self
      .http
      .get(&url)
      .send()
      .await
      .map_err(BridgeError::Unreachable)?;

    if response.status().is_success() {
      Ok(())
    } else {
      Err(BridgeError::Upstream {
        status: response.status().as_u16(),
      })
    }
  }

  /// Terminate any tracked instance, launch a fresh one with credentials
  /// injected via the environment, and poll until it answers the liveness
  /// endpoint. Only then is the bridge `Ready`.
  pub async fn start(&mut self) -> Result<()> {
    self.stop().await;

    let mut command = Command::new(&self.config.command);
    command
      .args(&self.config.args)
      .stdout(Stdio::null())
      .stderr(Stdio::null())
      .kill_on_drop(true);

    if let Some(key) = &self.config.groq_api_key {
      command.env("GROQ_API_KEY", key);
    }
    if let Some(key) = &self.config.tavily_api_key {
      command.env("TAVILY_API_KEY", key);
    }

    tracing::info!(
      command = %self.config.command,
      base_url = %self.config.base_url,
      "starting insight sidecar"
    );

    self.state = BridgeState::Starting;
    let child = command.spawn().map_err(|e| {
      self.state = BridgeState::Failed;
      BridgeError::Spawn(e)
    })?;
    self.child = Some(child);

    match self.wait_for_ready().await {
      Ok(()) => {
        self.state = BridgeState::Ready;
        tracing::info!("insight sidecar ready");
        Ok(())
      }
      Err(e) => {
        tracing::error!(error = %e, "insight sidecar failed to become ready");
        self.kill_child().await;
        self.state = BridgeState::Failed;
        Err(e)
      }
    }
  }

  async fn wait_for_ready(&self) -> Result<()> {
    let interval = Duration::from_millis(self.config.ready_interval_ms);
    for attempt in 1..=self.config.ready_attempts {
      if self.health_check().await.is_ok() {
        return Ok(());
      }
      tracing::debug!(attempt, "sidecar not ready yet");
      // No sleep after the final attempt; the caller gets the timeout now.
      if attempt < self.config.ready_attempts {
        tokio::time::sleep(interval).await;
      }
    }
    Err(BridgeError::ReadyTimeout {
      attempts: self.config.ready_attempts,
    })
  }

  async fn kill_child(&mut self) {
    if let Some(mut child) = self.child.take() {
      if let Err(e) = child.kill().await {
        tracing::warn!(error = %e, "failed to kill sidecar process");
      }
    }
  }

  /// Terminate the tracked process. Invoked on shutdown so no orphaned
  /// sidecar survives the parent.
  pub async fn stop(&mut self) {
    if self.child.is_some() {
      tracing::info!("stopping insight sidecar");
    }
    self.kill_child().await;
    self.state = BridgeState::Stopped;
  }
}
