use std::collections::{BTreeSet, HashMap};

use anyhow::Result;
use rusqlite::Connection;

use crate::Database;

/// SQLite refuses statements binding more variables than this.
const MAX_BOUND_PARAMS: usize = 32_766;

impl Database {
    /// Tags of a single post, in the order they were saved.
    pub fn tags_for_post(&self, post_id: i64) -> Result<Vec<String>> {
        self.with_conn(|conn| query_tags_for_post(conn, post_id))
    }

    /// Batch-fetch tags for a set of posts. Posts without tags are absent
    /// from the returned map.
    pub fn tags_for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, BTreeSet<String>>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        self.with_conn(|conn| query_tags_for_posts(conn, post_ids, MAX_BOUND_PARAMS))
    }

    /// Replace all tags of a post atomically.
    pub fn replace_tags(&self, post_id: i64, tags: &[String]) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            replace_tags(&tx, post_id, tags)?;
            tx.commit()?;
            Ok(())
        })
    }
}

pub(crate) fn query_tags_for_post(conn: &Connection, post_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT tag FROM post_tags WHERE post_id = ?1 ORDER BY rowid")?;

    let tags = stmt
        .query_map([post_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;

    Ok(tags)
}

/// One `IN` query per `chunk_size` ids, merged into a single map.
fn query_tags_for_posts(
    conn: &Connection,
    post_ids: &[i64],
    chunk_size: usize,
) -> Result<HashMap<i64, BTreeSet<String>>> {
    let mut tags: HashMap<i64, BTreeSet<String>> = HashMap::new();

    for chunk in post_ids.chunks(chunk_size) {
        let placeholders: Vec<String> = (1..=chunk.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "SELECT post_id, tag FROM post_tags WHERE post_id IN ({})",
            placeholders.join(", ")
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(chunk), |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (post_id, tag) = row?;
            tags.entry(post_id).or_default().insert(tag);
        }
    }

    Ok(tags)
}

/// Delete-all-then-insert. Must run inside a transaction opened by the
/// caller; repeated tags are stored once, first occurrence first.
pub(crate) fn replace_tags(conn: &Connection, post_id: i64, tags: &[String]) -> Result<()> {
    conn.execute("DELETE FROM post_tags WHERE post_id = ?1", [post_id])?;

    let mut stmt = conn.prepare("INSERT OR IGNORE INTO post_tags (post_id, tag) VALUES (?1, ?2)")?;
    for tag in tags {
        stmt.execute(rusqlite::params![post_id, tag])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_posts(ids: &[i64]) -> Database {
        let db = Database::open_in_memory().unwrap();
        for &id in ids {
            db.create_post(id, "title", "text", &[]).unwrap();
        }
        db
    }

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn replace_removes_previous_tags() {
        let db = db_with_posts(&[1]);
        db.replace_tags(1, &tags(&["old_1", "old_2"])).unwrap();
        db.replace_tags(1, &tags(&["new"])).unwrap();

        assert_eq!(db.tags_for_post(1).unwrap(), vec!["new".to_string()]);
    }

    #[test]
    fn replace_collapses_duplicates_and_keeps_order() {
        let db = db_with_posts(&[1]);
        db.replace_tags(1, &tags(&["b", "a", "b", "c", "a"])).unwrap();

        assert_eq!(db.tags_for_post(1).unwrap(), tags(&["b", "a", "c"]));
    }

    #[test]
    fn failed_replace_keeps_prior_tags() {
        let db = db_with_posts(&[1]);
        db.replace_tags(1, &tags(&["keep"])).unwrap();

        // Inserting for a post that does not exist trips the foreign key
        // after the delete already ran; the rollback must undo both.
        let result = db.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            replace_tags(&tx, 1, &[])?;
            replace_tags(&tx, 999, &tags(&["orphan"]))?;
            tx.commit()?;
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(db.tags_for_post(1).unwrap(), tags(&["keep"]));
    }

    #[test]
    fn batch_lookup_groups_by_post() {
        let db = db_with_posts(&[1, 2, 3]);
        db.replace_tags(1, &tags(&["x", "y"])).unwrap();
        db.replace_tags(2, &tags(&["y"])).unwrap();

        let grouped = db.tags_for_posts(&[1, 2, 3]).unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&1], BTreeSet::from(["x".to_string(), "y".to_string()]));
        assert_eq!(grouped[&2], BTreeSet::from(["y".to_string()]));
        assert!(!grouped.contains_key(&3));
    }

    #[test]
    fn batch_lookup_with_no_ids_is_empty() {
        let db = db_with_posts(&[]);
        assert!(db.tags_for_posts(&[]).unwrap().is_empty());
    }

    #[test]
    fn batch_lookup_merges_chunks() {
        let db = db_with_posts(&[1, 2, 3, 4, 5]);
        for id in 1..=5 {
            db.replace_tags(id, &[format!("t{}", id), "shared".to_string()]).unwrap();
        }

        let ids = [5, 4, 3, 2, 1];
        let chunked = db.with_conn(|conn| query_tags_for_posts(conn, &ids, 2)).unwrap();
        assert_eq!(chunked, db.tags_for_posts(&ids).unwrap());
        assert_eq!(chunked.len(), 5);
        assert_eq!(chunked[&3], BTreeSet::from(["shared".to_string(), "t3".to_string()]));
    }

    #[test]
    fn batch_lookup_beyond_variable_limit() {
        let db = db_with_posts(&[1, 40_000]);
        db.replace_tags(1, &tags(&["first"])).unwrap();
        db.replace_tags(40_000, &tags(&["last"])).unwrap();

        let ids: Vec<i64> = (1..=40_000).collect();
        assert!(ids.len() > MAX_BOUND_PARAMS);

        let grouped = db.tags_for_posts(&ids).unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&1], BTreeSet::from(["first".to_string()]));
        assert_eq!(grouped[&40_000], BTreeSet::from(["last".to_string()]));
    }
}
