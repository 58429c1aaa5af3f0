use anyhow::Result;
use rusqlite::Row;

use crate::models::CommentRow;
use crate::posts::post_exists;
use crate::{Database, OptionalExt};

impl Database {
    /// Comments of a post in creation order. Unknown posts have none.
    pub fn list_comments(&self, post_id: i64) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, post_id, text FROM comments WHERE post_id = ?1 ORDER BY rowid",
            )?;
            let rows = stmt
                .query_map([post_id], comment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_comment(&self, post_id: i64, comment_id: i64) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, post_id, text FROM comments WHERE post_id = ?1 AND id = ?2",
                [post_id, comment_id],
                comment_from_row,
            )
            .optional()
        })
    }

    /// Returns `None` when the owning post does not exist.
    pub fn create_comment(&self, id: i64, post_id: i64, text: &str) -> Result<Option<CommentRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            if !post_exists(&tx, post_id)? {
                return Ok(None);
            }
            tx.execute(
                "INSERT INTO comments (id, post_id, text) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, post_id, text],
            )?;
            tx.commit()?;
            Ok(Some(CommentRow {
                id,
                post_id,
                text: text.to_string(),
            }))
        })
    }

    pub fn update_comment(&self, post_id: i64, comment_id: i64, text: &str) -> Result<Option<CommentRow>> {
        self.with_conn_mut(|conn| {
            conn.query_row(
                "UPDATE comments SET text = ?1 WHERE post_id = ?2 AND id = ?3 RETURNING id, post_id, text",
                rusqlite::params![text, post_id, comment_id],
                comment_from_row,
            )
            .optional()
        })
    }

    pub fn delete_comment(&self, post_id: i64, comment_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute(
                "DELETE FROM comments WHERE post_id = ?1 AND id = ?2",
                [post_id, comment_id],
            )?;
            Ok(deleted > 0)
        })
    }
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        post_id: row.get(1)?,
        text: row.get(2)?,
    })
}
