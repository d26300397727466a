mod filesystem;
mod memory;
mod storage;

pub use filesystem::{FilesystemTokenStore, TOKEN_FILE_NAME};
pub use memory::MemoryTokenStore;
pub use storage::{TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_PROFILE_KEY};

use crate::error::Result;
use crate::models::TokenPair;

/// Write a freshly issued token pair. The refresh token is only replaced
/// when the backend sent a new one.
pub fn store_tokens(store: &dyn TokenStore, tokens: &TokenPair) -> Result<()> {
    store.set(ACCESS_TOKEN_KEY, &tokens.access)?;
    if let Some(refresh) = tokens.refresh.as_deref() {
        store.set(REFRESH_TOKEN_KEY, refresh)?;
    }
    Ok(())
}
