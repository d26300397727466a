use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub request_timeout: Option<u64>,
}
