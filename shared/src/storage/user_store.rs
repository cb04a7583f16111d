//! User storage trait and implementations.
//!
//! Provides the `UserStore` trait for abstracting user storage operations
//! and an `InMemoryUserStore` implementation.

use crate::models::{User, UserCreate};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors that can occur during user store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserStoreError {
    /// No user with this id exists.
    #[error("User {0} not found")]
    NotFound(u64),

    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on user store")]
    LockError,
}

/// Trait for user storage backends.
pub trait UserStore: Send + Sync {
    /// Stores a new user and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn create(&self, data: UserCreate) -> Result<User, UserStoreError>;

    /// Fetches a user by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such user exists.
    fn get(&self, id: u64) -> Result<User, UserStoreError>;

    /// Lists all users ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn list(&self) -> Result<Vec<User>, UserStoreError>;

    /// Replaces an existing user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such user exists.
    fn update(&self, id: u64, data: UserCreate) -> Result<User, UserStoreError>;

    /// Removes a user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such user exists.
    fn delete(&self, id: u64) -> Result<(), UserStoreError>;

    /// Number of stored users.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn count(&self) -> Result<usize, UserStoreError>;
}

/// In-memory user store.
///
/// Ids start at 1 and are never reused, even after a delete.
///
/// # Example
///
/// ```
/// use shared::models::UserCreate;
/// use shared::storage::{InMemoryUserStore, UserStore};
///
/// let store = InMemoryUserStore::new();
/// let user = store.create(UserCreate::new("Ada", "ada@example.com")).unwrap();
/// assert_eq!(user.id, 1);
/// assert_eq!(store.get(1).unwrap().name, "Ada");
/// ```
#[derive(Debug)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<BTreeMap<u64, User>>>,
    next_id: AtomicU64,
}

impl InMemoryUserStore {
    /// Creates a new empty in-memory user store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Creates a new in-memory user store wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for InMemoryUserStore {
    fn create(&self, data: UserCreate) -> Result<User, UserStoreError> {
        let mut users = self.users.write().map_err(|_| UserStoreError::LockError)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let user = User::from_create(id, data);
        users.insert(id, user.clone());
        Ok(user)
    }

    fn get(&self, id: u64) -> Result<User, UserStoreError> {
        let users = self.users.read().map_err(|_| UserStoreError::LockError)?;
        users.get(&id).cloned().ok_or(UserStoreError::NotFound(id))
    }

    fn list(&self) -> Result<Vec<User>, UserStoreError> {
        let users = self.users.read().map_err(|_| UserStoreError::LockError)?;
        Ok(users.values().cloned().collect())
    }

    fn update(&self, id: u64, data: UserCreate) -> Result<User, UserStoreError> {
        let mut users = self.users.write().map_err(|_| UserStoreError::LockError)?;
        let slot = users.get_mut(&id).ok_or(UserStoreError::NotFound(id))?;
        *slot = User::from_create(id, data);
        Ok(slot.clone())
    }

    fn delete(&self, id: u64) -> Result<(), UserStoreError> {
        let mut users = self.users.write().map_err(|_| UserStoreError::LockError)?;
        users
            .remove(&id)
            .map(|_| ())
            .ok_or(UserStoreError::NotFound(id))
    }

    fn count(&self) -> Result<usize, UserStoreError> {
        let users = self.users.read().map_err(|_| UserStoreError::LockError)?;
        Ok(users.len())
    }
}
