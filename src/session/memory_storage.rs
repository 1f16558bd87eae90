use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use super::storage::{CookieAttributes, StorageError, StoredCookie, TokenStorage};

/// Keeps the token cookie in process memory. Expiry is still honored.
#[derive(Debug)]
pub struct MemoryTokenStorage {
    attributes: CookieAttributes,
    slot: Mutex<Option<StoredCookie>>,
}

impl MemoryTokenStorage {
    pub fn new(attributes: CookieAttributes) -> Self {
        MemoryTokenStorage {
            attributes,
            slot: Mutex::new(None),
        }
    }

    /// Start with `token` already stored, as if a previous run had saved it.
    pub fn with_token(attributes: CookieAttributes, token: &str) -> Self {
        let cookie = StoredCookie::issue(&attributes, token, Utc::now());
        MemoryTokenStorage {
            attributes,
            slot: Mutex::new(Some(cookie)),
        }
    }

    /// The raw record, including attributes.
    pub fn cookie(&self) -> Option<StoredCookie> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemoryTokenStorage {
    fn default() -> Self {
        Self::new(CookieAttributes::default())
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(cookie) if cookie.is_live(&self.attributes, Utc::now()) => {
                Ok(Some(cookie.value.clone()))
            }
            Some(_) => {
                *slot = None;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn store(&self, token: &str) -> Result<(), StorageError> {
        let cookie = StoredCookie::issue(&self.attributes, token, Utc::now());
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(cookie);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    fn is_persistent(&self) -> bool {
        false
    }
}
