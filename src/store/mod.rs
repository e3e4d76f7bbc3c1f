//! User record stores
//!
//! The store is a keyed record table with unique-constraint semantics on
//! email. Consumers depend on the `UserStore` trait so the Postgres store can
//! be swapped for the in-memory one in tests and local development.
pub mod memory;
pub mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewUserRecord, UserPatch, UserRecord};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a record by the denormalized provider identity id
    async fn find_by_identity_id(&self, identity_id: &str) -> Result<Option<UserRecord>>;

    /// Find a record by email (the authoritative unique key)
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Insert a new record; a unique-email violation maps to
    /// `AccountError::DuplicateEmail`
    async fn insert(&self, record: NewUserRecord) -> Result<UserRecord>;

    /// Apply a partial update to the record with the given identity id
    async fn update(&self, identity_id: &str, patch: UserPatch) -> Result<()>;

    /// Delete the record with the given identity id
    async fn delete(&self, identity_id: &str) -> Result<()>;
}
