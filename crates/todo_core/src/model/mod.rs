//! Domain model for the todo collection.
//!
//! # Responsibility
//! - Define the canonical `Todo` record persisted by the store.
//! - Own input validation so every write path shares one rule set.
//!
//! # Invariants
//! - Every todo is identified by a stable, non-blank `TodoId`.
//! - Identity and creation time never change after creation.

pub mod todo;
