use anyhow::Result;
use rusqlite::{Connection, Row};
use tracing::debug;

use crate::filter::Filter;
use crate::models::PostRow;
use crate::tags::replace_tags;
use crate::{Database, OptionalExt};

/// Listing rows carry at most this many characters of body text.
pub const PREVIEW_CHARS: usize = 128;

const POST_COLUMNS: &str = "id, title, text, likes_count,
    (SELECT COUNT(*) FROM comments c WHERE c.post_id = posts.id) AS comments_count";

impl Database {
    /// Insert a post together with its tags in one transaction.
    pub fn create_post(&self, id: i64, title: &str, text: &str, tags: &[String]) -> Result<PostRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO posts (id, title, text, likes_count) VALUES (?1, ?2, ?3, 0)",
                rusqlite::params![id, title, text],
            )?;
            replace_tags(&tx, id, tags)?;
            let row = query_post(&tx, id)?
                .ok_or_else(|| anyhow::anyhow!("Post {} vanished after insert", id))?;
            tx.commit()?;
            Ok(row)
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| query_post(conn, id))
    }

    /// Replace title and text, and the tags when `tags` is given.
    /// Returns `None` when the post does not exist.
    pub fn update_post(
        &self,
        id: i64,
        title: &str,
        text: &str,
        tags: Option<&[String]>,
    ) -> Result<Option<PostRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let updated = tx.execute(
                "UPDATE posts SET title = ?1, text = ?2 WHERE id = ?3",
                rusqlite::params![title, text, id],
            )?;
            if updated == 0 {
                return Ok(None);
            }
            if let Some(tags) = tags {
                replace_tags(&tx, id, tags)?;
            }
            let row = query_post(&tx, id)?;
            tx.commit()?;
            Ok(row)
        })
    }

    /// Delete a post; comments, tags and image go with it through the
    /// foreign key cascades. Returns `false` when nothing was deleted.
    pub fn delete_post(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let deleted = tx.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(deleted > 0)
        })
    }

    /// Atomically bump the like counter, returning the new value.
    pub fn add_like(&self, id: i64) -> Result<Option<i64>> {
        self.with_conn_mut(|conn| {
            conn.query_row(
                "UPDATE posts SET likes_count = likes_count + 1 WHERE id = ?1 RETURNING likes_count",
                [id],
                |row| row.get(0),
            )
            .optional()
        })
    }

    /// One page of matching posts, newest id first, with body text cut down
    /// to a preview.
    pub fn list_posts(&self, filter: &Filter, limit: u32, offset: u64) -> Result<Vec<PostRow>> {
        let predicate = filter.predicate();
        let limit_idx = predicate.next_index();
        let sql = format!(
            "SELECT id, title,
                    CASE WHEN LENGTH(text) > {preview} THEN SUBSTR(text, 1, {preview}) || '...' ELSE text END,
                    likes_count,
                    (SELECT COUNT(*) FROM comments c WHERE c.post_id = posts.id)
             FROM posts{clause}
             ORDER BY id DESC
             LIMIT ?{limit_idx} OFFSET ?{offset_idx}",
            preview = PREVIEW_CHARS,
            clause = predicate.clause,
            limit_idx = limit_idx,
            offset_idx = limit_idx + 1,
        );
        debug!("Listing posts: filter={:?} limit={} offset={}", filter, limit, offset);

        let mut params = predicate.params;
        params.push(rusqlite::types::Value::Integer(i64::from(limit)));
        // Offsets past i64::MAX select nothing either way.
        params.push(rusqlite::types::Value::Integer(i64::try_from(offset).unwrap_or(i64::MAX)));

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(params.iter()), post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Number of posts matching `filter`, using the same predicate as
    /// [`list_posts`](Self::list_posts).
    pub fn count_posts(&self, filter: &Filter) -> Result<u64> {
        let predicate = filter.predicate();
        let sql = format!("SELECT COUNT(*) FROM posts{}", predicate.clause);

        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                &sql,
                rusqlite::params_from_iter(predicate.params.iter()),
                |row| row.get(0),
            )?;
            Ok(u64::try_from(count)?)
        })
    }
}

pub(crate) fn post_exists(conn: &Connection, id: i64) -> Result<bool> {
    let exists = conn.query_row("SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?1)", [id], |row| {
        row.get(0)
    })?;
    Ok(exists)
}

fn query_post(conn: &Connection, id: i64) -> Result<Option<PostRow>> {
    let sql = format!("SELECT {} FROM posts WHERE id = ?1", POST_COLUMNS);
    conn.query_row(&sql, [id], post_from_row).optional()
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        text: row.get(2)?,
        likes_count: row.get(3)?,
        comments_count: row.get(4)?,
    })
}
