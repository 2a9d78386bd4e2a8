//! DTOs for the post endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{Post, PostPatch};

/// Request body for `POST /create`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 20000, message = "Content must be 1-20000 characters"))]
    pub content: String,
}

/// Request body for `PUT /{id}`.
///
/// Fields that are absent are left unchanged; at least one must be present.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 20000, message = "Content must be 1-20000 characters"))]
    pub content: Option<String>,
}

impl From<UpdatePostRequest> for PostPatch {
    fn from(req: UpdatePostRequest) -> Self {
        PostPatch {
            title: req.title,
            content: req.content,
        }
    }
}

/// JSON representation of a post.
#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// True once the post has been updated after creation.
    pub edited: bool,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            edited: post.is_edited(),
            id: post.id,
            title: post.title,
            content: post.content,
            author: post.author,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Response body for `GET /`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PostListResponse {
    pub total: usize,
    pub items: Vec<PostResponse>,
}

impl From<Vec<Post>> for PostListResponse {
    fn from(posts: Vec<Post>) -> Self {
        let items: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();
        Self {
            total: items.len(),
            items,
        }
    }
}
