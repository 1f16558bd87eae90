//! Session state, its persisted token slot, and the store that drives it.

pub mod file_storage;
pub mod memory_storage;
#[allow(clippy::module_inception)]
pub mod session;
pub mod storage;
pub mod store;

pub use file_storage::FileTokenStorage;
pub use memory_storage::MemoryTokenStorage;
pub use session::{Session, SessionHandle};
pub use storage::{create_token_storage, CookieAttributes, StorageError, StoredCookie, TokenStorage};
pub use store::SessionStore;
