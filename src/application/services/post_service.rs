//! Post management service.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{Identity, NewPost, Post, PostPatch};
use crate::domain::repositories::PostRepository;
use crate::error::AppError;

/// Input for creating a post; the author comes from the caller's identity.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

/// Business logic behind the post controller actions.
///
/// Reads are public. Writes take the authenticated [`Identity`]: new posts
/// are attributed to it, and only the author may change or delete a post.
pub struct PostService {
    repository: Arc<dyn PostRepository>,
}

impl PostService {
    /// Creates a new post service.
    pub fn new(repository: Arc<dyn PostRepository>) -> Self {
        Self { repository }
    }

    /// Creates a post authored by `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn create(&self, identity: &Identity, draft: PostDraft) -> Result<Post, AppError> {
        let post = self
            .repository
            .create(NewPost {
                title: draft.title,
                content: draft.content,
                author: identity.subject.clone(),
            })
            .await?;

        metrics::counter!("posts_created_total").increment(1);
        tracing::info!(post_id = post.id, author = %post.author, "Post created");

        Ok(post)
    }

    /// Lists all posts, newest first.
    pub async fn list(&self) -> Result<Vec<Post>, AppError> {
        self.repository.list().await
    }

    /// Retrieves a post by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no post has this id.
    pub async fn get(&self, id: i64) -> Result<Post, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Partially updates a post owned by `identity`.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the post does not exist
    /// - [`AppError::Forbidden`] if `identity` is not the author
    pub async fn update(
        &self,
        identity: &Identity,
        id: i64,
        patch: PostPatch,
    ) -> Result<Post, AppError> {
        self.ensure_author(identity, id).await?;

        let post = self
            .repository
            .update(id, patch)
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(post_id = id, author = %identity.subject, "Post updated");

        Ok(post)
    }

    /// Deletes a post owned by `identity`.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the post does not exist
    /// - [`AppError::Forbidden`] if `identity` is not the author
    pub async fn delete(&self, identity: &Identity, id: i64) -> Result<(), AppError> {
        self.ensure_author(identity, id).await?;

        if !self.repository.delete(id).await? {
            return Err(not_found(id));
        }

        metrics::counter!("posts_deleted_total").increment(1);
        tracing::info!(post_id = id, author = %identity.subject, "Post deleted");

        Ok(())
    }

    /// Returns true if the post store is reachable.
    pub async fn health_check(&self) -> bool {
        self.repository.health_check().await
    }

    /// Name of the configured storage backend.
    pub fn backend_name(&self) -> &'static str {
        self.repository.backend_name()
    }

    async fn ensure_author(&self, identity: &Identity, id: i64) -> Result<Post, AppError> {
        let post = self.get(id).await?;

        if !post.is_authored_by(&identity.subject) {
            tracing::debug!(post_id = id, caller = %identity.subject, "Rejected write by non-author");
            return Err(AppError::forbidden(
                "Only the author can modify this post",
                json!({ "id": id }),
            ));
        }

        Ok(post)
    }
}

fn not_found(id: i64) -> AppError {
    AppError::not_found("Post not found", json!({ "id": id }))
}
