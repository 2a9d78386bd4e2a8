//! Core domain entities.
//!
//! - [`Post`] - A blog post, with [`NewPost`] for creation and [`PostPatch`]
//!   for partial updates
//! - [`Identity`] - The authenticated caller attached by the auth gate

pub mod identity;
pub mod post;

pub use identity::Identity;
pub use post::{NewPost, Post, PostPatch};
