use super::models::LoginRequest;
use super::response::{extract_error_message, parse_token_pair};
use crate::error::{Result, StockError};
use crate::models::UserProfile;
use crate::session::{store_tokens, TokenStore, ACCESS_TOKEN_KEY, USER_PROFILE_KEY};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// HTTP client for the stock-control backend.
///
/// Authenticated requests carry the stored access token as a bearer token.
/// A 401 on such a request drops the access token from the store, which in
/// turn ends the session guard's polling.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        store: Arc<dyn TokenStore>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(StockError::Config("API base URL is empty".to_string()));
        }

        let http = reqwest::Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            http,
            base_url,
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.http.get(self.url(path));
        let response = self.send_authenticated(request).await?;
        Ok(response.json().await?)
    }

    /// Exchange credentials for tokens, then cache the profile.
    ///
    /// If the profile cannot be fetched the half-written session is wiped
    /// so the store never holds tokens without a profile.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile> {
        let response = self
            .http
            .post(self.url("token/"))
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST {
            return Err(StockError::InvalidCredentials);
        }
        let response = error_for_status(response).await?;

        let body: Value = response.json().await?;
        let tokens = parse_token_pair(&body).map_err(|e| StockError::Api {
            status: status.as_u16(),
            message: e.to_string(),
        })?;
        store_tokens(self.store.as_ref(), &tokens)?;

        match self.fetch_profile().await {
            Ok(profile) => {
                info!(user = profile.display_name(), "logged in");
                Ok(profile)
            }
            Err(e) => {
                warn!(error = %e, "profile fetch failed after login, discarding tokens");
                if let Err(clear_err) = self.store.clear() {
                    warn!(error = %clear_err, "could not clear token store");
                }
                Err(e)
            }
        }
    }

    /// Fetch `profile/` and cache the raw body under `userProfile`.
    pub async fn fetch_profile(&self) -> Result<UserProfile> {
        let body: Value = self.get_json("profile/").await?;
        let profile: UserProfile = serde_json::from_value(body.clone())?;
        self.store.set(USER_PROFILE_KEY, &body.to_string())?;
        Ok(profile)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    async fn send_authenticated(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.store.access_token();
        let request = match token.as_deref() {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                    StockError::Other(format!("Invalid authorization header: {}", e))
                })?;
                request.header(AUTHORIZATION, value)
            }
            None => request,
        };

        let response = request.send().await.map_err(send_error)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if token.is_some() {
                debug!("access token rejected, removing it");
                self.store.remove(ACCESS_TOKEN_KEY)?;
            }
            return Err(StockError::Unauthorized);
        }

        error_for_status(response).await
    }
}

fn send_error(e: reqwest::Error) -> StockError {
    if e.is_timeout() {
        StockError::Timeout
    } else {
        StockError::Network(e)
    }
}

async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StockError::Api {
        status: status.as_u16(),
        message: extract_error_message(&body),
    })
}
