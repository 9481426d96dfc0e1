//! Core types, services and the storage trait for the WLB activity tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.
//!
//! - [`taxonomy`]: the Domain → Type → Tag tree and its ordering.
//! - [`aggregate`]: day grouping and duration formatting for reports.
//! - [`activity`]: recording logs and reading them back.
//! - [`accounts`]: users and role assignment.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod accounts;
pub mod activity;
pub mod aggregate;
pub mod error;
pub mod ids;
pub mod level;
pub mod log;
pub mod node;
pub mod store;
pub mod taxonomy;
pub mod user;

pub use error::{Error, Result};
