//! In-memory user record store
//!
//! Mirrors the Postgres store's semantics, including the unique-email
//! constraint surfaced as `DuplicateEmail`. Used by tests and local
//! development; not intended for production.
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::UserStore;
use crate::error::{AccountError, Result};
use crate::models::{NewUserRecord, UserPatch, UserRecord};

#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    records: Vec<UserRecord>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_identity_id(&self, identity_id: &str) -> Result<Option<UserRecord>> {
        let inner = self.lock();
        Ok(inner
            .records
            .iter()
            .find(|r| r.identity_id == identity_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let inner = self.lock();
        Ok(inner.records.iter().find(|r| r.email == email).cloned())
    }

    async fn insert(&self, record: NewUserRecord) -> Result<UserRecord> {
        let mut inner = self.lock();
        if inner.records.iter().any(|r| r.email == record.email) {
            return Err(AccountError::DuplicateEmail);
        }

        inner.next_id += 1;
        let now = Utc::now();
        let record = UserRecord {
            id: inner.next_id,
            identity_id: record.identity_id,
            email: record.email,
            name: record.name,
            picture: record.picture,
            provider: record.provider,
            verified: record.verified,
            is_admin: record.is_admin,
            identity: record.identity,
            created_at: now,
            updated_at: now,
        };
        inner.records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, identity_id: &str, patch: UserPatch) -> Result<()> {
        let mut inner = self.lock();
        if let Some(record) = inner
            .records
            .iter_mut()
            .find(|r| r.identity_id == identity_id)
        {
            if let Some(verified) = patch.verified {
                record.verified = verified;
            }
            if let Some(picture) = patch.picture {
                record.picture = Some(picture);
            }
            if let Some(identity) = patch.identity {
                record.identity = identity;
            }
            record.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete(&self, identity_id: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.records.retain(|r| r.identity_id != identity_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Identity, IdentityMetadata, Provider};

    fn identity(id: &str, email: &str) -> Identity {
        Identity {
            id: id.to_string(),
            email: email.to_string(),
            provider: Provider::Email,
            metadata: IdentityMetadata::default(),
            email_confirmed: false,
        }
    }

    #[tokio::test]
    async fn insert_then_lookup_round_trips() {
        let store = MemoryUserStore::new();
        let identity = identity("id-1", "a@example.com");
        store
            .insert(NewUserRecord::from_identity(&identity, false))
            .await
            .unwrap();

        let found = store.find_by_identity_id("id-1").await.unwrap().unwrap();
        assert_eq!(found.email, "a@example.com");
        assert_eq!(found.provider, Provider::Email);
        assert!(!found.verified);

        let by_email = store.find_by_email("a@example.com").await.unwrap();
        assert!(by_email.is_some());
    }

    #[tokio::test]
    async fn second_insert_with_same_email_is_rejected() {
        let store = MemoryUserStore::new();
        store
            .insert(NewUserRecord::from_identity(
                &identity("id-1", "a@example.com"),
                false,
            ))
            .await
            .unwrap();

        let err = store
            .insert(NewUserRecord::from_identity(
                &identity("id-2", "a@example.com"),
                false,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::DuplicateEmail));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn patch_updates_only_the_supplied_fields() {
        let store = MemoryUserStore::new();
        let identity = identity("id-1", "a@example.com");
        store
            .insert(NewUserRecord::from_identity(&identity, false))
            .await
            .unwrap();

        store
            .update("id-1", UserPatch::picture("https://cdn.test/p.png"))
            .await
            .unwrap();

        let record = store.find_by_identity_id("id-1").await.unwrap().unwrap();
        assert_eq!(record.picture.as_deref(), Some("https://cdn.test/p.png"));
        assert!(!record.verified);

        store
            .update("id-1", UserPatch::verify(&identity))
            .await
            .unwrap();
        let record = store.find_by_identity_id("id-1").await.unwrap().unwrap();
        assert!(record.verified);
        assert_eq!(record.picture.as_deref(), Some("https://cdn.test/p.png"));
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let store = MemoryUserStore::new();
        store
            .insert(NewUserRecord::from_identity(
                &identity("id-1", "a@example.com"),
                false,
            ))
            .await
            .unwrap();

        store.delete("id-1").await.unwrap();
        assert!(store.find_by_identity_id("id-1").await.unwrap().is_none());
    }
}
