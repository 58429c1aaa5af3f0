use serde::{Deserialize, Serialize};

// -- Posts --

/// Body of `POST /posts`. Clients also echo read-only fields such as
/// `id` or `likesCount`; those are ignored.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body of `PUT /posts/{id}`.
///
/// `tags: None` leaves the stored tags alone, `Some(vec![])` clears them.
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    pub likes_count: i64,
    pub comments_count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default = "default_page_number")]
    pub page_number: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page_number() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub has_prev: bool,
    pub has_next: bool,
    pub last_page: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikesResponse {
    pub likes_count: i64,
}

// -- Comments --

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i64,
    pub post_id: i64,
    pub text: String,
}
