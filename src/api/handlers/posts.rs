//! Controller actions for the post resource.

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::post::{CreatePostRequest, PostListResponse, PostResponse, UpdatePostRequest};
use crate::application::services::PostDraft;
use crate::domain::entities::{Identity, PostPatch};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a post authored by the authenticated caller.
///
/// # Endpoint
///
/// `POST /create` (bearer token required)
///
/// # Request Body
///
/// ```json
/// { "title": "Hello", "content": "First post" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the body is not valid JSON or fails validation.
pub async fn create_post_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let post = state
        .post_service
        .create(
            &identity,
            PostDraft {
                title: payload.title,
                content: payload.content,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(post.into())))
}

/// Lists all posts, newest first.
///
/// # Endpoint
///
/// `GET /`
pub async fn list_posts_handler(
    State(state): State<AppState>,
) -> Result<Json<PostListResponse>, AppError> {
    let posts = state.post_service.list().await?;
    Ok(Json(posts.into()))
}

/// Fetches one post by id.
///
/// # Endpoint
///
/// `GET /{id}`
///
/// # Errors
///
/// Returns 400 Bad Request if `id` is not a positive integer and
/// 404 Not Found if no post has this id.
pub async fn get_post_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PostResponse>, AppError> {
    let id = parse_post_id(&id)?;
    let post = state.post_service.get(id).await?;
    Ok(Json(post.into()))
}

/// Partially updates a post owned by the caller.
///
/// # Endpoint
///
/// `PUT /{id}` (bearer token required)
///
/// # Request Body
///
/// ```json
/// { "title": "New title", "content": "New content" }
/// ```
///
/// Either field may be omitted, but not both.
///
/// # Errors
///
/// - 400 Bad Request on an invalid id or body
/// - 403 Forbidden if the caller is not the author
/// - 404 Not Found if the post does not exist
pub async fn update_post_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Result<Json<PostResponse>, AppError> {
    let id = parse_post_id(&id)?;
    let Json(payload) = payload?;
    payload.validate()?;

    let patch = PostPatch::from(payload);
    if patch.is_empty() {
        return Err(AppError::bad_request(
            "Nothing to update",
            json!({ "reason": "Provide at least one of: title, content" }),
        ));
    }

    let post = state.post_service.update(&identity, id, patch).await?;
    Ok(Json(post.into()))
}

/// Deletes a post owned by the caller.
///
/// # Endpoint
///
/// `DELETE /{id}` (bearer token required)
///
/// # Errors
///
/// - 400 Bad Request on an invalid id
/// - 403 Forbidden if the caller is not the author
/// - 404 Not Found if the post does not exist
pub async fn delete_post_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<StatusCode, AppError> {
    let id = parse_post_id(&id)?;
    state.post_service.delete(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Parses the `{id}` path segment.
fn parse_post_id(raw: &str) -> Result<i64, AppError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::bad_request(
            "Invalid post id",
            json!({ "id": raw, "reason": "Expected a positive integer" }),
        )),
    }
}
