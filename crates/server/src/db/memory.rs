//! In-process document store.
//!
//! Documents are kept as `serde_json::Value`s so every read and write passes
//! through the same serialization boundary as the `PostgreSQL` store. The
//! gateway can be told to fail, which is how revert-on-failure is exercised.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use restock_core::Username;

use super::{GatewayConnection, PersistenceGateway, RepositoryError};
use crate::models::UserAccount;

/// Cheaply cloneable handle to a shared in-memory document map.
#[derive(Clone, Default)]
pub struct MemoryGateway {
    inner: Arc<MemoryStore>,
}

#[derive(Default)]
struct MemoryStore {
    documents: Mutex<HashMap<Username, Value>>,
    unavailable: AtomicBool,
    fail_next_write: AtomicBool,
    connections: AtomicUsize,
    open_connections: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    fn documents(&self) -> Result<MutexGuard<'_, HashMap<Username, Value>>, RepositoryError> {
        self.documents
            .lock()
            .map_err(|_| RepositoryError::Unavailable("memory store lock poisoned".to_owned()))
    }

    fn check_write(&self) -> Result<(), RepositoryError> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "write rejected by memory store".to_owned(),
            ));
        }
        Ok(())
    }
}

impl MemoryGateway {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `connect` fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Reject the next insert or save.
    pub fn fail_next_write(&self) {
        self.inner.fail_next_write.store(true, Ordering::SeqCst);
    }

    /// Total connections opened so far.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.inner.connections.load(Ordering::SeqCst)
    }

    /// Connections opened but not yet closed.
    #[must_use]
    pub fn open_connection_count(&self) -> usize {
        self.inner.open_connections.load(Ordering::SeqCst)
    }

    /// Successful inserts and saves so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Decode the stored document for `username`, bypassing connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored document cannot be decoded.
    pub fn document(&self, username: &Username) -> Result<Option<UserAccount>, RepositoryError> {
        let documents = self.inner.documents()?;
        documents
            .get(username)
            .map(|value| serde_json::from_value(value.clone()).map_err(RepositoryError::from))
            .transpose()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn connect(&self) -> Result<Box<dyn GatewayConnection>, RepositoryError> {
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "memory store is offline".to_owned(),
            ));
        }
        self.inner.connections.fetch_add(1, Ordering::SeqCst);
        self.inner.open_connections.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConnection {
            store: Arc::clone(&self.inner),
        }))
    }
}

struct MemoryConnection {
    store: Arc<MemoryStore>,
}

#[async_trait]
impl GatewayConnection for MemoryConnection {
    async fn find_by_username(
        &mut self,
        username: &Username,
    ) -> Result<Option<UserAccount>, RepositoryError> {
        let documents = self.store.documents()?;
        documents
            .get(username)
            .map(|value| serde_json::from_value(value.clone()).map_err(RepositoryError::from))
            .transpose()
    }

    async fn insert(&mut self, account: &UserAccount) -> Result<(), RepositoryError> {
        self.store.check_write()?;
        let document = serde_json::to_value(account)?;
        let mut documents = self.store.documents()?;
        if documents.contains_key(&account.username) {
            return Err(RepositoryError::Conflict("username already exists".to_owned()));
        }
        documents.insert(account.username.clone(), document);
        self.store.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn save(&mut self, account: &UserAccount) -> Result<(), RepositoryError> {
        self.store.check_write()?;
        let document = serde_json::to_value(account)?;
        let mut documents = self.store.documents()?;
        let slot = documents
            .get_mut(&account.username)
            .ok_or(RepositoryError::NotFound)?;
        *slot = document;
        self.store.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), RepositoryError> {
        self.store.open_connections.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}
