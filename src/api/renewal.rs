use super::client::ApiClient;
use super::models::RefreshRequest;
use super::response::parse_token_pair;
use crate::error::RenewalError;
use crate::models::TokenPair;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

pub const REFRESH_PATH: &str = "token/refresh/";

/// Exchanges a refresh token for new tokens.
#[async_trait]
pub trait RenewalClient: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RenewalError>;
}

#[async_trait]
impl RenewalClient for ApiClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RenewalError> {
        debug!(url = %self.url(REFRESH_PATH), "requesting token refresh");
        let response = self
            .http()
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenewalError::RequestFailed {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RenewalError::MalformedResponse(e.to_string()))?;
        parse_token_pair(&body)
    }
}
