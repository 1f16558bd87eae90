use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::{file_storage::FileTokenStorage, memory_storage::MemoryTokenStorage};
use crate::config::{Environment, SameSite, SessionConfig, StorageBackendConfig};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("token storage holds an unreadable record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The persisted slot holding the bearer token.
///
/// Implementations apply the cookie attributes they were built with, and
/// report an expired record as absent.
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>, StorageError>;
    fn store(&self, token: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
    fn is_persistent(&self) -> bool {
        // in-memory storage overrides this
        true
    }
}

/// Cookie attributes resolved from configuration and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttributes {
    pub name: String,
    pub path: String,
    pub same_site: SameSite,
    pub secure: bool,
    pub max_age: Duration,
}

impl CookieAttributes {
    pub fn from_config(config: &SessionConfig, environment: Environment) -> Self {
        let cookie = &config.cookie;
        CookieAttributes {
            name: cookie.name.clone(),
            path: cookie.path.clone(),
            same_site: cookie.same_site,
            secure: cookie.secure.unwrap_or(environment.is_production()),
            max_age: i64::try_from(cookie.max_age_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
        }
    }
}

impl Default for CookieAttributes {
    fn default() -> Self {
        CookieAttributes::from_config(&SessionConfig::default(), Environment::default())
    }
}

/// The record kept in storage: the token plus the attributes it was issued with.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub same_site: SameSite,
    pub secure: bool,
    pub expires_at: DateTime<Utc>,
}

impl StoredCookie {
    pub fn issue(attributes: &CookieAttributes, value: &str, now: DateTime<Utc>) -> Self {
        StoredCookie {
            name: attributes.name.clone(),
            value: value.to_string(),
            path: attributes.path.clone(),
            same_site: attributes.same_site,
            secure: attributes.secure,
            expires_at: now
                .checked_add_signed(attributes.max_age)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Still valid at `now` and issued under the cookie name we expect.
    pub fn is_live(&self, attributes: &CookieAttributes, now: DateTime<Utc>) -> bool {
        self.name == attributes.name && self.expires_at > now && !self.value.is_empty()
    }
}

/// Creates a concrete token storage based on the session config.
pub fn create_token_storage(config: &SessionConfig, environment: Environment) -> Arc<dyn TokenStorage> {
    let attributes = CookieAttributes::from_config(config, environment);
    match &config.storage {
        StorageBackendConfig::Memory => {
            info!("Token storage is in-memory; the session ends with the process.");
            Arc::new(MemoryTokenStorage::new(attributes))
        }
        StorageBackendConfig::File { path } => {
            info!("Persisting the session token to {}", path.display());
            Arc::new(FileTokenStorage::new(path.clone(), attributes))
        }
    }
}
