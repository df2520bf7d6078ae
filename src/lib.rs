//! `CaisseLedger` - A savings-cooperative ledger and allocation engine
//!
//! This crate tracks member accounts, deposits and withdrawals and
//! enforces the per-account-kind business rules of the cooperative:
//! fixed-deposit booklets (8 pages of 31 cases), interest-bearing mixed
//! accounts and locked accounts with withdrawal caps. Every mutation is
//! atomic: the balance move, the operation record and the audit entry
//! commit in one store transaction or not at all.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Fixed-point monetary amounts in minor units
pub mod amount;
/// Pure booklet-page allocation for fixed accounts
pub mod booklet;
/// Configuration for the store location and gateway retry policy
pub mod config;
/// Core business logic - enrollment, deposit and withdrawal rule engines,
/// duplicate cleanup and the audit log
pub mod core;
/// SeaORM entity definitions for the ledger tables
pub mod entities;
/// Unified error types and result handling
pub mod errors;
/// Repository layer - typed CRUD over ledger rows, no implicit commits
pub mod repo;
/// Persistence gateway - store handle, open retry/backoff, schema setup
pub mod store;

#[cfg(test)]
pub mod test_utils;

pub use amount::Amount;
pub use errors::{Error, Result};
pub use repo::account::{AccountLookup, AccountPlan, AccountProfile};
pub use store::Store;
