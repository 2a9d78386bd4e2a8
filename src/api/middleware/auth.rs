//! Bearer token authentication middleware (the auth gate).

use axum::{
    extract::{FromRequestParts, Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::application::services::{AuthError, AuthService};
use crate::{error::AppError, state::AppState};

/// Verifies the bearer credential on `req` and attaches the caller's
/// [`Identity`](crate::domain::entities::Identity) to its extensions.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <jwt>
/// ```
///
/// # Errors
///
/// - [`AuthError::MissingToken`] if there is no `Authorization` header
/// - [`AuthError::InvalidToken`] if the header is not a bearer credential or
///   the token fails verification
/// - [`AuthError::ExpiredToken`] if the token is past its `exp`
pub async fn authenticate(auth: &AuthService, req: Request) -> Result<Request, AuthError> {
    if !req.headers().contains_key(header::AUTHORIZATION) {
        return Err(AuthError::MissingToken);
    }

    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| AuthError::InvalidToken)?;

    let identity = auth.authenticate(&token)?;
    parts.extensions.insert(identity);

    Ok(Request::from_parts(parts, body))
}

/// Guard layer for write routes.
///
/// Runs [`authenticate`] and forwards to the next handler on success. On
/// failure the request never reaches the controller: the response is a
/// `401 Unauthorized` with a `WWW-Authenticate: Bearer` challenge.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{middleware, routing::post};
///
/// let guarded = post(create_post_handler)
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match authenticate(&st.auth_service, req).await {
        Ok(req) => Ok(next.run(req).await),
        Err(err) => {
            metrics::counter!("auth_rejections_total", "reason" => err.reason()).increment(1);
            tracing::debug!(%method, %path, reason = err.reason(), "Request rejected by auth gate");
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Identity;
    use axum::body::Body;
    use chrono::Duration;

    fn service() -> AuthService {
        AuthService::new("gate-secret", 0)
    }

    fn request(authorization: Option<&str>) -> Request {
        let mut builder = Request::builder().method("POST").uri("/create");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_header() {
        let result = authenticate(&service(), request(None)).await;
        assert_eq!(result.unwrap_err(), AuthError::MissingToken);
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_invalid() {
        let result = authenticate(&service(), request(Some("Basic dXNlcjpwYXNz"))).await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn test_expired_token() {
        let svc = service();
        let token = svc.issue_token("alice", Duration::hours(-1)).unwrap();

        let result = authenticate(&svc, request(Some(&format!("Bearer {token}")))).await;

        assert_eq!(result.unwrap_err(), AuthError::ExpiredToken);
    }

    #[tokio::test]
    async fn test_valid_token_attaches_identity() {
        let svc = service();
        let token = svc.issue_token("alice", Duration::hours(1)).unwrap();

        let req = authenticate(&svc, request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();

        let identity = req.extensions().get::<Identity>().unwrap();
        assert_eq!(identity.subject, "alice");
    }
}
