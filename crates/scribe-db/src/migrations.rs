use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS posts (
            id          INTEGER PRIMARY KEY,
            title       TEXT NOT NULL,
            text        TEXT NOT NULL,
            likes_count INTEGER NOT NULL DEFAULT 0 CHECK (likes_count >= 0)
        );

        CREATE TABLE IF NOT EXISTS comments (
            id          INTEGER PRIMARY KEY,
            post_id     INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            text        TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_comments_post
            ON comments(post_id);

        CREATE TABLE IF NOT EXISTS post_tags (
            post_id     INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            tag         TEXT NOT NULL,
            PRIMARY KEY (post_id, tag)
        );

        CREATE INDEX IF NOT EXISTS idx_post_tags_tag
            ON post_tags(tag);

        CREATE TABLE IF NOT EXISTS post_image (
            post_id      INTEGER NOT NULL UNIQUE REFERENCES posts(id) ON DELETE CASCADE,
            file_name    TEXT,
            content_type TEXT,
            file_size    INTEGER NOT NULL,
            file_data    BLOB NOT NULL
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
