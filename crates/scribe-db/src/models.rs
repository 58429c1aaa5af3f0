//! Database row types. These map directly to SQLite rows.
//! Distinct from scribe-types API models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub likes_count: i64,
    pub comments_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ImageRow {
    pub post_id: i64,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub file_size: i64,
    pub data: Vec<u8>,
}
