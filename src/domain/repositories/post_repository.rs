//! Repository trait for post data access.

use crate::domain::entities::{NewPost, Post, PostPatch};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing posts.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgPostRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::InMemoryPostRepository`] - process-local store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Stores a new post and returns it with its assigned id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn create(&self, new_post: NewPost) -> Result<Post, AppError>;

    /// Lists all posts, newest first.
    async fn list(&self) -> Result<Vec<Post>, AppError>;

    /// Finds a post by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Post))` if found
    /// - `Ok(None)` if not found
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError>;

    /// Applies a partial update and bumps `updated_at`.
    ///
    /// Returns `Ok(None)` if no post has this id.
    async fn update(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, AppError>;

    /// Deletes a post.
    ///
    /// Returns `Ok(true)` if a post was removed, `Ok(false)` if none matched.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Returns true if the backing store is reachable.
    async fn health_check(&self) -> bool;

    /// Short name of the storage backend, used in health output.
    fn backend_name(&self) -> &'static str;
}
