use std::num::NonZeroU32;

use anyhow::Result;
use tracing::debug;

use scribe_db::{Database, Filter};
use scribe_types::api::{PostListResponse, PostResponse};

use crate::pagination::paginate;

/// Build one page of the post listing: filter, count, page bounds, then tags
/// for exactly the posts on the page.
pub fn list_posts(
    db: &Database,
    search: &str,
    page_size: NonZeroU32,
    page_number: NonZeroU32,
) -> Result<PostListResponse> {
    let filter = Filter::parse(search);

    let total = db.count_posts(&filter)?;
    let page = paginate(total, page_size, page_number);
    let rows = if page.offset >= total {
        Vec::new()
    } else {
        db.list_posts(&filter, page_size.get(), page.offset)?
    };

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut tags = db.tags_for_posts(&ids)?;

    debug!(
        "Listed {} of {} posts (page {}/{}) for search {:?}",
        rows.len(),
        total,
        page_number,
        page.last_page,
        search
    );

    let posts = rows
        .into_iter()
        .map(|row| PostResponse {
            tags: tags
                .remove(&row.id)
                .map(|set| set.into_iter().collect())
                .unwrap_or_default(),
            id: row.id,
            title: row.title,
            text: row.text,
            likes_count: row.likes_count,
            comments_count: row.comments_count,
        })
        .collect();

    Ok(PostListResponse {
        posts,
        has_prev: page.has_prev,
        has_next: page.has_next,
        last_page: page.last_page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn seed(db: &Database, id: i64, title: &str, tags: &[&str]) {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        db.create_post(id, title, "Test Post Text", &tags).unwrap();
    }

    #[test]
    fn empty_store_has_no_pages() {
        let db = Database::open_in_memory().unwrap();
        let page = list_posts(&db, "", nz(5), nz(1)).unwrap();
        assert!(page.posts.is_empty());
        assert_eq!(page.last_page, 0);
        assert!(!page.has_prev && !page.has_next);
    }

    #[test]
    fn attaches_tags_and_defaults_to_empty() {
        let db = Database::open_in_memory().unwrap();
        seed(&db, 1, "untagged", &[]);
        seed(&db, 2, "tagged", &["z", "a", "m"]);

        let page = list_posts(&db, "", nz(5), nz(1)).unwrap();
        assert_eq!(page.posts[0].id, 2);
        assert_eq!(page.posts[0].tags, vec!["a", "m", "z"]);
        assert_eq!(page.posts[1].tags, Vec::<String>::new());
    }

    #[test]
    fn hashtag_search_and_paging_combine() {
        let db = Database::open_in_memory().unwrap();
        for id in 1..=7 {
            let tags: &[&str] = if id % 2 == 1 { &["tag_1"] } else { &["tag_2"] };
            seed(&db, id, &format!("post {}", id), tags);
        }

        // Odd ids carry tag_1: 7, 5, 3, 1.
        let first = list_posts(&db, "#tag_1", nz(3), nz(1)).unwrap();
        assert_eq!(first.posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![7, 5, 3]);
        assert_eq!(first.last_page, 2);
        assert!(first.has_next && !first.has_prev);

        let second = list_posts(&db, "#tag_1", nz(3), nz(2)).unwrap();
        assert_eq!(second.posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1]);
        assert!(second.has_prev && !second.has_next);
        assert!(second.posts.iter().all(|p| p.tags == vec!["tag_1"]));
    }

    #[test]
    fn far_past_the_end_is_an_empty_page() {
        let db = Database::open_in_memory().unwrap();
        seed(&db, 1, "only", &["tag_1"]);

        let page = list_posts(&db, "", nz(u32::MAX), nz(u32::MAX)).unwrap();
        assert!(page.posts.is_empty());
        assert_eq!(page.last_page, 1);
        assert!(!page.has_prev && !page.has_next);

        let page = list_posts(&db, "#tag_1", nz(1), nz(u32::MAX)).unwrap();
        assert!(page.posts.is_empty());
    }

    #[test]
    fn page_larger_than_variable_limit() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute_batch(
                "WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 40000)
                 INSERT INTO posts (id, title, text, likes_count)
                 SELECT i, 'post ' || i, 'text', 0 FROM n;
                 INSERT INTO post_tags (post_id, tag) VALUES (1, 'oldest'), (40000, 'newest');",
            )?;
            Ok(())
        })
        .unwrap();

        let page = list_posts(&db, "", nz(50_000), nz(1)).unwrap();
        assert_eq!(page.posts.len(), 40_000);
        assert_eq!(page.last_page, 1);
        assert_eq!(page.posts[0].tags, vec!["newest"]);
        assert_eq!(page.posts[39_999].tags, vec!["oldest"]);
        assert!(page.posts[1].tags.is_empty());
    }
}
