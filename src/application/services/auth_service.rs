//! Bearer token authentication service.
//!
//! Tokens are HS256-signed JWTs carrying the caller's subject (`sub`), the
//! issue time (`iat`) and an expiry (`exp`). The same service mints tokens
//! for the admin CLI and verifies them in the auth gate.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::domain::entities::Identity;
use crate::error::AppError;

/// Reasons the auth gate rejects a request.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No credential was presented.
    #[error("Missing bearer token")]
    MissingToken,

    /// The credential is malformed or fails signature/claim verification.
    #[error("Invalid bearer token")]
    InvalidToken,

    /// The credential verified but is past its validity window.
    #[error("Bearer token has expired")]
    ExpiredToken,
}

impl AuthError {
    /// Machine-readable reason, also used as the metric label.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidToken => "invalid_token",
            AuthError::ExpiredToken => "expired_token",
        }
    }

    /// `WWW-Authenticate` value for this failure (RFC 6750 §3).
    ///
    /// A request without credentials gets a bare challenge; everything else
    /// is reported as `invalid_token`.
    pub fn challenge(&self) -> String {
        match self {
            AuthError::MissingToken => "Bearer".to_string(),
            AuthError::InvalidToken | AuthError::ExpiredToken => format!(
                r#"Bearer error="invalid_token", error_description="{}""#,
                self
            ),
        }
    }
}

/// JWT claims carried by bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Service for issuing and verifying bearer tokens.
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `secret` - HMAC key shared by issuer and verifier
    /// - `leeway_seconds` - clock skew tolerated when checking `exp`
    pub fn new(secret: &str, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues a token for `subject` valid for `ttl`.
    ///
    /// A negative `ttl` produces an already-expired token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `subject` is blank or the expiry
    /// falls outside the representable date range, and
    /// [`AppError::Internal`] if signing fails.
    pub fn issue_token(&self, subject: &str, ttl: Duration) -> Result<String, AppError> {
        if subject.trim().is_empty() {
            return Err(AppError::bad_request(
                "Token subject must not be empty",
                json!({}),
            ));
        }

        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            AppError::bad_request(
                "Token lifetime is out of range",
                json!({ "ttl_seconds": ttl.num_seconds() }),
            )
        })?;

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            AppError::internal("Failed to sign token", json!({ "reason": e.to_string() }))
        })
    }

    /// Verifies a raw bearer token and returns the identity it carries.
    ///
    /// # Errors
    ///
    /// - [`AuthError::ExpiredToken`] if `exp` is in the past beyond the leeway
    /// - [`AuthError::InvalidToken`] for any other verification failure,
    ///   including a blank subject
    pub fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            },
        )?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let expires_at: DateTime<Utc> =
            DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::InvalidToken)?;

        Ok(Identity::new(claims.sub, expires_at))
    }
}
