//! Authenticated caller identity.

use chrono::{DateTime, Utc};

/// Identity claim attached to a request once the auth gate accepts its
/// bearer token.
///
/// Guarded handlers read it from request extensions via
/// `axum::Extension<Identity>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(subject: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            subject: subject.into(),
            expires_at,
        }
    }
}
