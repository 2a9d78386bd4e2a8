#![allow(dead_code)]

use axum_test::TestServer;
use chrono::Duration;
use std::sync::Arc;
use post_board::application::services::{AuthService, PostService};
use post_board::infrastructure::persistence::InMemoryPostRepository;
use post_board::routes::build_router;
use post_board::state::AppState;

pub const TEST_SECRET: &str = "test-signing-secret";
pub const BASE_PATH: &str = "/api/posts";

pub struct TestApp {
    pub server: TestServer,
    pub auth: Arc<AuthService>,
    pub repository: Arc<InMemoryPostRepository>,
}

impl TestApp {
    /// `Authorization` header value for `subject`, valid for an hour.
    pub fn bearer(&self, subject: &str) -> String {
        self.bearer_with_ttl(subject, Duration::hours(1))
    }

    /// `Authorization` header value for `subject` that expired an hour ago.
    pub fn expired_bearer(&self, subject: &str) -> String {
        self.bearer_with_ttl(subject, Duration::hours(-1))
    }

    pub fn bearer_with_ttl(&self, subject: &str, ttl: Duration) -> String {
        format!("Bearer {}", self.auth.issue_token(subject, ttl).unwrap())
    }
}

pub fn create_test_state() -> (AppState, Arc<InMemoryPostRepository>, Arc<AuthService>) {
    let repository = Arc::new(InMemoryPostRepository::new());
    let post_service = Arc::new(PostService::new(repository.clone()));
    let auth_service = Arc::new(AuthService::new(TEST_SECRET, 0));

    let state = AppState::new(post_service, auth_service.clone());

    (state, repository, auth_service)
}

pub fn create_test_app() -> TestApp {
    let (state, repository, auth) = create_test_state();
    let server = TestServer::new(build_router(state, BASE_PATH)).unwrap();

    TestApp {
        server,
        auth,
        repository,
    }
}

pub fn path(suffix: &str) -> String {
    format!("{BASE_PATH}{suffix}")
}
