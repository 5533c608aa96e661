//! External insight bridge: lifecycle management for the AI sidecar process
//! and the client used to talk to it.
//!
//! The sidecar serves chat replies, document insights, risk analyses,
//! forecasts, market summaries and news. It is a private collaborator of the
//! server — clients never address it directly; the API layer calls through
//! [`InsightSource`] and persists whatever needs replaying on later reads.

#![allow(async_fn_in_trait)]

pub mod client;
pub mod config;
pub mod error;
pub mod process;

pub use client::{ChatContext, InsightSource, Relayed, SidecarClient};
pub use reqwest::Method;
pub use config::SidecarConfig;
pub use error::BridgeError;
pub use process::{BridgeState, SidecarProcess};
