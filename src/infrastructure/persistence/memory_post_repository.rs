//! In-memory post repository.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::{NewPost, Post, PostPatch};
use crate::domain::repositories::PostRepository;
use crate::error::AppError;

/// Process-local post store.
///
/// Used when no database is configured and by integration tests. Ids are
/// assigned sequentially starting at 1 and never reused.
pub struct InMemoryPostRepository {
    inner: RwLock<Store>,
}

struct Store {
    next_id: i64,
    posts: BTreeMap<i64, Post>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        debug!("Using in-memory post store");
        Self {
            inner: RwLock::new(Store {
                next_id: 1,
                posts: BTreeMap::new(),
            }),
        }
    }

    /// Number of stored posts.
    pub async fn len(&self) -> usize {
        self.inner.read().await.posts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, new_post: NewPost) -> Result<Post, AppError> {
        let mut store = self.inner.write().await;

        let id = store.next_id;
        store.next_id += 1;

        let now = Utc::now();
        let post = Post::new(
            id,
            new_post.title,
            new_post.content,
            new_post.author,
            now,
            now,
        );
        store.posts.insert(id, post.clone());

        Ok(post)
    }

    async fn list(&self) -> Result<Vec<Post>, AppError> {
        let store = self.inner.read().await;
        // Ids grow monotonically, so reverse id order is newest first.
        Ok(store.posts.values().rev().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        Ok(self.inner.read().await.posts.get(&id).cloned())
    }

    async fn update(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, AppError> {
        let mut store = self.inner.write().await;

        let Some(post) = store.posts.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        post.updated_at = Utc::now();

        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.inner.write().await.posts.remove(&id).is_some())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
