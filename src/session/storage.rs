use crate::error::Result;
use crate::models::UserProfile;
use tracing::warn;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_PROFILE_KEY: &str = "userProfile";

/// Trait for token storage backends
pub trait TokenStore: Send + Sync {
    /// Read a value, `None` if the key is absent
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a single key; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// Remove every stored key
    fn clear(&self) -> Result<()>;

    fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY)
    }

    fn refresh_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_KEY)
    }

    fn has_session(&self) -> bool {
        self.access_token().is_some()
    }

    /// The cached profile. An unparseable entry reads as no profile.
    fn user_profile(&self) -> Option<UserProfile> {
        let raw = self.get(USER_PROFILE_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "stored user profile is not valid JSON");
                None
            }
        }
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        let raw = serde_json::to_string(profile)?;
        self.set(USER_PROFILE_KEY, &raw)
    }
}
