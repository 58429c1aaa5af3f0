use anyhow::Result;

use crate::models::ImageRow;
use crate::posts::post_exists;
use crate::{Database, OptionalExt};

impl Database {
    /// Insert or replace the image of a post. Returns `false` when the post
    /// does not exist.
    pub fn save_image(&self, image: &ImageRow) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            if !post_exists(&tx, image.post_id)? {
                return Ok(false);
            }
            tx.execute(
                "INSERT INTO post_image (post_id, file_name, content_type, file_size, file_data)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(post_id) DO UPDATE SET
                     file_name = excluded.file_name,
                     content_type = excluded.content_type,
                     file_size = excluded.file_size,
                     file_data = excluded.file_data",
                rusqlite::params![
                    image.post_id,
                    image.file_name,
                    image.content_type,
                    image.file_size,
                    image.data,
                ],
            )?;
            tx.commit()?;
            Ok(true)
        })
    }

    pub fn get_image(&self, post_id: i64) -> Result<Option<ImageRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT post_id, file_name, content_type, file_size, file_data
                 FROM post_image WHERE post_id = ?1",
                [post_id],
                |row| {
                    Ok(ImageRow {
                        post_id: row.get(0)?,
                        file_name: row.get(1)?,
                        content_type: row.get(2)?,
                        file_size: row.get(3)?,
                        data: row.get(4)?,
                    })
                },
            )
            .optional()
        })
    }
}
