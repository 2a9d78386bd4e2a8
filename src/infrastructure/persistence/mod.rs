//! Post repository implementations.
//!
//! - [`PgPostRepository`] - PostgreSQL storage via SQLx
//! - [`InMemoryPostRepository`] - process-local store used when no database is configured

pub mod memory_post_repository;
pub mod pg_post_repository;

pub use memory_post_repository::InMemoryPostRepository;
pub use pg_post_repository::PgPostRepository;
