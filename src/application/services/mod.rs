//! Business logic services for the application layer.

pub mod auth_service;
pub mod post_service;

pub use auth_service::{AuthError, AuthService};
pub use post_service::{PostDraft, PostService};
