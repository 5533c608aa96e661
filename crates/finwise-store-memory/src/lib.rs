//! In-memory implementation of [`finwise_core::store::FinanceStore`].
//!
//! This is the reference backend: all state lives in process memory and is
//! lost on restart. Durable backends plug into the router through the same
//! `FinanceStore` contract.

mod table;

pub mod store;

#[cfg(test)]
mod tests;

pub use store::MemoryStore;
