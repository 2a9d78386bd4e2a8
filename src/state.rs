//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use crate::application::services::{AuthService, PostService};

/// Handles to the services behind the post routes.
///
/// Cloned per request; the services themselves are shared.
#[derive(Clone)]
pub struct AppState {
    pub post_service: Arc<PostService>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    pub fn new(post_service: Arc<PostService>, auth_service: Arc<AuthService>) -> Self {
        Self {
            post_service,
            auth_service,
        }
    }
}
