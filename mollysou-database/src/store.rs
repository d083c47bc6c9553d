//! Storage port for user progression.
//!
//! The progression rules never touch storage; whatever drives them loads a
//! snapshot through a [`ProgressStore`], applies a rule and writes the result
//! back. [`ProgressStore::update`] runs that cycle atomically per user.

use std::collections::HashMap;

use async_trait::async_trait;
use mollysou_progression::UserProgress;
use tokio::sync::Mutex;

use crate::error::StoreError;

/// Boxed read-modify-write step handed to [`ProgressStore::update`]. An
/// `Err` aborts the update and leaves the stored snapshot untouched.
pub type ProgressUpdate<'a> =
    Box<dyn FnOnce(UserProgress) -> Result<UserProgress, StoreError> + Send + 'a>;

#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Load the current snapshot, or [`StoreError::NotFound`].
    async fn load(&self, user_id: u64) -> Result<UserProgress, StoreError>;

    /// Overwrite the stored snapshot of an existing user.
    async fn save(&self, user_id: u64, progress: &UserProgress) -> Result<(), StoreError>;

    /// Load, apply and save while no other update for the same user can
    /// interleave. Returns the saved snapshot.
    async fn update<'a>(
        &self,
        user_id: u64,
        apply: ProgressUpdate<'a>,
    ) -> Result<UserProgress, StoreError>;
}

/// Process-local store, used in tests and local tooling.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    users: Mutex<HashMap<u64, UserProgress>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user_id: u64, progress: UserProgress) {
        self.users.lock().await.insert(user_id, progress);
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn load(&self, user_id: u64) -> Result<UserProgress, StoreError> {
        self.users
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .ok_or_else(|| StoreError::user_not_found(user_id))
    }

    async fn save(&self, user_id: u64, progress: &UserProgress) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        let slot = users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::user_not_found(user_id))?;
        *slot = progress.clone();
        Ok(())
    }

    async fn update<'a>(
        &self,
        user_id: u64,
        apply: ProgressUpdate<'a>,
    ) -> Result<UserProgress, StoreError> {
        let mut users = self.users.lock().await;
        let slot = users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::user_not_found(user_id))?;
        let updated = apply(slot.clone())?;
        *slot = updated.clone();
        Ok(updated)
    }
}
