//! Repository trait definitions for the domain layer.
//!
//! Implementations live in `crate::infrastructure::persistence`; mocks are
//! generated with `mockall` for unit tests.

pub mod post_repository;

pub use post_repository::PostRepository;

#[cfg(test)]
pub use post_repository::MockPostRepository;
