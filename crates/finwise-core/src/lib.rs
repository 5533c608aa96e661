//! Core types and trait definitions for the FinWise finance store.
//!
//! This crate is deliberately free of HTTP and backend dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod budget;
pub mod chat;
pub mod document;
pub mod error;
pub mod insight;
pub mod investment;
pub mod snapshot;
pub mod store;
pub mod user;

pub use error::{Error, Result};

/// Store-assigned record identifier.
///
/// Allocated from a monotonic per-entity counter; never reused after a
/// delete, so an id observed once is unambiguous for the store's lifetime.
pub type RecordId = u64;
