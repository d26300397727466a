use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    /// `development` or `production`; selects the default idle timeout.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub idle_timeout: Option<u64>,
    #[serde(default)]
    pub warning_threshold: Option<u64>,
    #[serde(default)]
    pub check_interval_ms: Option<u64>,
    #[serde(default)]
    pub renewal_timeout: Option<u64>,
    #[serde(default)]
    pub token_file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub verbose: Option<bool>,
}
