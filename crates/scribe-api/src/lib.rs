pub mod comments;
pub mod error;
pub mod ids;
pub mod images;
pub mod listing;
pub mod pagination;
pub mod posts;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use scribe_db::Database;

pub use error::{ApiError, ApiResult};
pub use images::FallbackImage;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub fallback_image: FallbackImage,
}

/// All blog routes, relative to the mount point chosen by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/posts", post(posts::create_post).get(posts::list_posts))
        .route(
            "/posts/{post_id}",
            get(posts::get_post).put(posts::update_post).delete(posts::delete_post),
        )
        .route("/posts/{post_id}/likes", post(posts::add_like))
        .route(
            "/posts/{post_id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/posts/{post_id}/comments/{comment_id}",
            get(comments::get_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route(
            "/posts/{post_id}/image",
            get(images::get_image).put(images::set_image),
        )
        .with_state(state)
}

/// Run a blocking database call off the async runtime.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Database) -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db)).await?
}
