//! Account Service Library
//!
//! Reconciles freshly authenticated identities from the hosted auth provider
//! into the locally owned users table, and serves the verification callback
//! and account mutation endpoints.
//!
//! ## Modules
//!
//! - `config`: Service configuration
//! - `error`: Error types
//! - `http`: HTTP server (callback and account endpoints)
//! - `models`: Data models (Identity, UserRecord)
//! - `provider`: Identity provider client (GoTrue REST API)
//! - `services`: Business logic (reconciliation, verification flow, account)
//! - `store`: User record stores (Postgres, in-memory)
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod provider;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use error::{AccountError, Result};
