use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use scribe_db::models::CommentRow;
use scribe_types::api::{CommentRequest, CommentResponse};

use crate::error::{ApiError, ApiResult};
use crate::{AppState, blocking, ids};

fn to_response(row: CommentRow) -> CommentResponse {
    CommentResponse {
        id: row.id,
        post_id: row.post_id,
        text: row.text,
    }
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let rows = blocking(&state, move |db| Ok(db.list_comments(post_id)?)).await?;
    let comments: Vec<CommentResponse> = rows.into_iter().map(to_response).collect();
    Ok(Json(comments))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    let row = blocking(&state, move |db| Ok(db.get_comment(post_id, comment_id)?))
        .await?
        .ok_or_else(|| ApiError::comment_not_found(post_id, comment_id))?;

    Ok(Json(to_response(row)))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = ids::next_id();

    let row = blocking(&state, move |db| Ok(db.create_comment(id, post_id, &req.text)?))
        .await?
        .ok_or_else(|| ApiError::post_not_found(post_id))?;

    Ok((StatusCode::CREATED, Json(to_response(row))))
}

/// PUT /posts/{id}/comments/{commentId}: the post id comes from the path,
/// never from the body.
pub async fn update_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let row = blocking(&state, move |db| {
        Ok(db.update_comment(post_id, comment_id, &req.text)?)
    })
    .await?
    .ok_or_else(|| ApiError::comment_not_found(post_id, comment_id))?;

    Ok(Json(to_response(row)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    let deleted = blocking(&state, move |db| Ok(db.delete_comment(post_id, comment_id)?)).await?;
    if !deleted {
        return Err(ApiError::comment_not_found(post_id, comment_id));
    }
    Ok(StatusCode::NO_CONTENT)
}
