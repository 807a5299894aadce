//! Access/refresh token pair and unverified JWT claim decoding
//!
//! The client never verifies signatures; it only reads `exp` to decide when to
//! renew and `sub` for display. The backend remains the authority on validity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Token pair returned by `/auth/token` and `/auth/refresh`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Claims the client reads from an access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    /// Expiry instant (`exp`)
    pub expires_at: DateTime<Utc>,
    /// Subject identifier (`sub`), usually the username
    pub subject: Option<String>,
}

impl AccessClaims {
    /// Decode the payload segment of a JWT without verifying it.
    pub fn decode(token: &str) -> std::result::Result<Self, ApiError> {
        #[derive(Deserialize)]
        struct JwtPayload {
            exp: i64,
            #[serde(default)]
            sub: Option<serde_json::Value>,
        }

        // JWT format: header.payload.signature
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(ApiError::InvalidToken);
        }

        let payload_bytes = base64_decode_url(parts[1]).map_err(|_| ApiError::InvalidToken)?;
        let payload: JwtPayload =
            serde_json::from_slice(&payload_bytes).map_err(|_| ApiError::InvalidToken)?;

        let expires_at = DateTime::from_timestamp(payload.exp, 0).ok_or(ApiError::InvalidToken)?;
        let subject = payload.sub.map(|sub| match sub {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });

        Ok(Self {
            expires_at,
            subject,
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Decode base64url, tolerating optional trailing padding
fn base64_decode_url(input: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

    URL_SAFE_NO_PAD.decode(input.trim_end_matches('='))
}

/// Shorten a credential for log output
pub fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(10).collect();
    format!("{}...", prefix)
}

/// Build an unsigned JWT carrying `sub` and `exp`, for tests.
#[cfg(test)]
pub fn unsigned_jwt(subject: &str, expires_at: DateTime<Utc>) -> String {
    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::json!({ "sub": subject, "exp": expires_at.timestamp() }).to_string(),
    );
    format!("{}.{}.signature", header, payload)
}
