use axum::{
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use bytes::Bytes;
use tracing::{info, warn};

use scribe_db::models::ImageRow;

use crate::error::{ApiError, ApiResult};
use crate::{AppState, blocking};

/// Multipart field carrying the uploaded image.
const IMAGE_FIELD: &str = "image";

const OCTET_STREAM: &str = "application/octet-stream";

/// Served for posts that have no image of their own.
#[derive(Debug, Clone)]
pub struct FallbackImage {
    pub content_type: String,
    pub data: Bytes,
}

impl Default for FallbackImage {
    fn default() -> Self {
        Self {
            content_type: "image/png".to_string(),
            data: Bytes::from_static(include_bytes!("../assets/image404.png")),
        }
    }
}

/// PUT /posts/{id}/image: multipart upload, replaces any existing image.
pub async fn set_image(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<StatusCode> {
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Image upload for post {} failed: {}", post_id, e);
        ApiError::BadRequest(format!("Invalid multipart body: {}", e))
    })? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let data = field.bytes().await.map_err(|e| {
            warn!("Image upload for post {} failed: {}", post_id, e);
            ApiError::BadRequest(format!("Failed to read image: {}", e))
        })?;

        image = Some(ImageRow {
            post_id,
            file_name,
            content_type,
            file_size: data.len() as i64,
            data: data.to_vec(),
        });
    }

    let image = image.ok_or_else(|| ApiError::BadRequest(format!("Missing '{}' field", IMAGE_FIELD)))?;
    let size = image.file_size;

    let saved = blocking(&state, move |db| Ok(db.save_image(&image)?)).await?;
    if !saved {
        return Err(ApiError::post_not_found(post_id));
    }

    info!("Stored {} byte image for post {}", size, post_id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /posts/{id}/image: the stored bytes, or the fallback image.
pub async fn get_image(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let stored = blocking(&state, move |db| Ok(db.get_image(post_id)?)).await?;

    let (content_type, data) = match stored {
        Some(image) => (
            image.content_type.unwrap_or_else(|| OCTET_STREAM.to_string()),
            Bytes::from(image.data),
        ),
        None => (
            state.fallback_image.content_type.clone(),
            state.fallback_image.data.clone(),
        ),
    };

    Ok(([(header::CONTENT_TYPE, content_type)], data))
}
