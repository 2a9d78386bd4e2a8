//! Post entity representing a single blog entry.

use chrono::{DateTime, Utc};

/// A published post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Subject of the identity that created the post.
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Creates a new Post instance.
    pub fn new(
        id: i64,
        title: String,
        content: String,
        author: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            content,
            author,
            created_at,
            updated_at,
        }
    }

    /// Returns true if `subject` authored this post.
    pub fn is_authored_by(&self, subject: &str) -> bool {
        self.author == subject
    }

    /// Returns true if the post was edited after creation.
    pub fn is_edited(&self) -> bool {
        self.updated_at > self.created_at
    }
}

/// Input data for creating a new post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: String,
}

/// Partial update for an existing post.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostPatch {
    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_post_creation() {
        let now = Utc::now();
        let post = Post::new(
            1,
            "Hello".to_string(),
            "First post".to_string(),
            "alice".to_string(),
            now,
            now,
        );

        assert_eq!(post.id, 1);
        assert_eq!(post.title, "Hello");
        assert!(post.is_authored_by("alice"));
        assert!(!post.is_authored_by("bob"));
        assert!(!post.is_edited());
    }

    #[test]
    fn test_post_is_edited() {
        let created = Utc::now() - Duration::minutes(5);
        let post = Post::new(
            2,
            "t".to_string(),
            "c".to_string(),
            "alice".to_string(),
            created,
            Utc::now(),
        );

        assert!(post.is_edited());
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(PostPatch::default().is_empty());

        let patch = PostPatch {
            title: Some("New".to_string()),
            content: None,
        };
        assert!(!patch.is_empty());
    }
}
