use std::num::NonZeroU32;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use scribe_db::models::PostRow;
use scribe_types::api::{
    CreatePostRequest, LikesResponse, ListPostsQuery, PostResponse, UpdatePostRequest,
};

use crate::error::{ApiError, ApiResult};
use crate::{AppState, blocking, ids, listing};

fn to_response(row: PostRow, tags: Vec<String>) -> PostResponse {
    PostResponse {
        id: row.id,
        title: row.title,
        text: row.text,
        tags,
        likes_count: row.likes_count,
        comments_count: row.comments_count,
    }
}

fn positive(name: &str, value: i64) -> ApiResult<NonZeroU32> {
    u32::try_from(value)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| ApiError::BadRequest(format!("{} must be a positive integer, got {}", name, value)))
}

/// POST /posts: insert the post and its tags in one transaction.
pub async fn create_post(
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = ids::next_id();

    let post = blocking(&state, move |db| {
        let row = db.create_post(id, &req.title, &req.text, &req.tags)?;
        let tags = db.tags_for_post(id)?;
        Ok(to_response(row, tags))
    })
    .await?;

    info!("Created post {} with {} tags", post.id, post.tags.len());
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /posts?search=&pageNumber=&pageSize=
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> ApiResult<impl IntoResponse> {
    let page_size = positive("pageSize", query.page_size)?;
    let page_number = positive("pageNumber", query.page_number)?;

    let page = blocking(&state, move |db| {
        Ok(listing::list_posts(db, &query.search, page_size, page_number)?)
    })
    .await?;

    Ok(Json(page))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let post = blocking(&state, move |db| {
        let row = db.get_post(post_id)?.ok_or_else(|| ApiError::post_not_found(post_id))?;
        let tags = db.tags_for_post(post_id)?;
        Ok(to_response(row, tags))
    })
    .await?;

    Ok(Json(post))
}

/// PUT /posts/{id}: likes are never touched here.
pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(req): Json<UpdatePostRequest>,
) -> ApiResult<impl IntoResponse> {
    let post = blocking(&state, move |db| {
        let row = db
            .update_post(post_id, &req.title, &req.text, req.tags.as_deref())?
            .ok_or_else(|| ApiError::post_not_found(post_id))?;
        let tags = db.tags_for_post(post_id)?;
        Ok(to_response(row, tags))
    })
    .await?;

    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = blocking(&state, move |db| Ok(db.delete_post(post_id)?)).await?;
    if !deleted {
        return Err(ApiError::post_not_found(post_id));
    }

    info!("Deleted post {}", post_id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /posts/{id}/likes: no body; the increment happens in SQL.
pub async fn add_like(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let likes_count = blocking(&state, move |db| Ok(db.add_like(post_id)?))
        .await?
        .ok_or_else(|| ApiError::post_not_found(post_id))?;

    Ok(Json(LikesResponse { likes_count }))
}
