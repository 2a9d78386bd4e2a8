//! Application layer services implementing business logic.
//!
//! Services consume repository traits and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::post_service::PostService`] - Post creation, retrieval, and author-checked writes
//! - [`services::auth_service::AuthService`] - Bearer token issuing and verification

pub mod services;
