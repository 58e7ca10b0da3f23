//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep the HTTP adapter decoupled from persistence details.

pub mod todo_service;
