//! Search string parsing and its compilation to a parameterized `WHERE` clause.
//!
//! A search string like `"rust async #tokio #axum"` splits on whitespace into
//! word terms (`rust`, `async`) and hashtag terms (`tokio`, `axum`). Word terms
//! are joined back with single spaces into one `LIKE` pattern (`%rust async%`)
//! matched against the title. Hashtags select posts carrying at least one of
//! the tags. Both parts are ANDed when present; an empty search matches all.

use rusqlite::types::Value;

/// Parsed search filter. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    words: Vec<String>,
    hashtags: Vec<String>,
}

/// A `WHERE` clause (or the empty string) plus the values bound to its
/// placeholders, numbered from `?1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub clause: String,
    pub params: Vec<Value>,
}

impl Predicate {
    /// Index the next placeholder appended after this clause should use.
    pub fn next_index(&self) -> usize {
        self.params.len() + 1
    }
}

impl Filter {
    pub fn parse(raw: &str) -> Self {
        let mut filter = Self::default();

        for token in raw.split_whitespace() {
            match token.strip_prefix('#') {
                Some(tag) => {
                    if !filter.hashtags.iter().any(|t| t == tag) {
                        filter.hashtags.push(tag.to_string());
                    }
                }
                None => filter.words.push(token.to_string()),
            }
        }

        filter
    }

    /// The single title pattern built from all word terms, if any.
    ///
    /// Multi-word searches match the words as one contiguous phrase, not as
    /// independent terms.
    pub fn title_pattern(&self) -> Option<String> {
        if self.words.is_empty() {
            None
        } else {
            Some(format!("%{}%", self.words.join(" ")))
        }
    }

    /// Compile into a clause over the `posts` table. `id` and `title` refer
    /// to `posts` columns, so the clause can follow `FROM posts` directly.
    pub fn predicate(&self) -> Predicate {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(pattern) = self.title_pattern() {
            params.push(Value::Text(pattern));
            conditions.push(format!("title LIKE ?{}", params.len()));
        }

        // All hashtags travel in one JSON array parameter, so the number of
        // bound variables stays fixed however many tags are searched.
        if !self.hashtags.is_empty() {
            let tags = serde_json::Value::from(self.hashtags.clone());
            params.push(Value::Text(tags.to_string()));
            conditions.push(format!(
                "id IN (SELECT post_id FROM post_tags WHERE tag IN (SELECT value FROM json_each(?{})))",
                params.len()
            ));
        }

        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        Predicate { clause, params }
    }
}
