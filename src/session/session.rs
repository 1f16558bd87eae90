use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::storage::{StorageError, TokenStorage};
use crate::models::UserProfile;

/// Who is signed in, if anyone.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Shared handle to the session and its persisted token slot.
///
/// Every token write goes to storage as part of the same call that changes
/// the in-memory value. Locks are never held across an `.await`.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
    storage: Arc<dyn TokenStorage>,
}

impl SessionHandle {
    /// Start from whatever token the storage still holds.
    pub fn hydrate(storage: Arc<dyn TokenStorage>) -> Result<Self, StorageError> {
        let access_token = storage.load()?.filter(|t| !t.is_empty());
        if access_token.is_some() {
            info!("Restored session token from storage");
        }
        Ok(SessionHandle {
            inner: Arc::new(RwLock::new(Session {
                access_token,
                user: None,
            })),
            storage,
        })
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read()
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    /// Set token and profile together. Storage is written first, so on error
    /// nothing in memory changes.
    pub(crate) fn establish(&self, token: String, user: UserProfile) -> Result<(), StorageError> {
        self.storage.store(&token)?;
        let mut session = self.write();
        session.access_token = Some(token);
        session.user = Some(user);
        Ok(())
    }

    /// Overwrite the profile, unless the session was cleared in the meantime.
    pub(crate) fn replace_user(&self, user: UserProfile) -> bool {
        let mut session = self.write();
        if !session.is_authenticated() {
            debug!("Dropping fetched profile: session is no longer authenticated");
            return false;
        }
        session.user = Some(user);
        true
    }

    /// Forget token and profile, in memory and in storage.
    ///
    /// Memory is cleared even if storage fails; the storage error is still returned.
    pub(crate) fn invalidate(&self) -> Result<(), StorageError> {
        {
            let mut session = self.write();
            session.access_token = None;
            session.user = None;
        }
        self.storage.clear()
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.read();
        f.debug_struct("SessionHandle")
            .field("authenticated", &session.is_authenticated())
            .field("user", &session.user.as_ref().map(|u| u.id.as_str()))
            .field("persistent", &self.storage.is_persistent())
            .finish()
    }
}
