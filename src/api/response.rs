use crate::error::RenewalError;
use crate::models::TokenPair;
use serde_json::Value;

/// Parse a `token/` or `token/refresh/` body.
///
/// `access` must be a non-empty string. `refresh` is optional and ignored
/// when empty or not a string.
pub fn parse_token_pair(body: &Value) -> Result<TokenPair, RenewalError> {
    let access = body
        .get("access")
        .ok_or_else(|| RenewalError::MalformedResponse("missing access token".to_string()))?
        .as_str()
        .ok_or_else(|| RenewalError::MalformedResponse("access token is not a string".to_string()))?;

    if access.is_empty() {
        return Err(RenewalError::MalformedResponse(
            "access token is empty".to_string(),
        ));
    }

    let refresh = body
        .get("refresh")
        .and_then(|r| r.as_str())
        .filter(|r| !r.is_empty())
        .map(|r| r.to_string());

    Ok(TokenPair {
        access: access.to_string(),
        refresh,
    })
}

/// Pull a human-readable message out of an error body. DRF answers with
/// `{"detail": "..."}`.
pub fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(|s| s.to_string()))
        .unwrap_or_else(|| body.trim().to_string())
}
