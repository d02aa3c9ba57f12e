use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::common::{
    CoreError, CoreResult, PageRecord, PostId, SortField, SortKey, SortOrder, StoreQuery, UserId,
};
use crate::kernel::{BaseStoreReader, KeysetColumns, PgStore};

/// Longest full-text query accepted.
pub const MAX_SEARCH_LEN: usize = 200;

/// Post as shown in lists and feeds.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: PostId,
    pub author_id: UserId,
    pub author_username: String,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>, // tag names, alphabetical
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}

impl PostSummary {
    pub fn interaction_count(&self) -> i64 {
        self.like_count + self.comment_count
    }
}

/// Which posts to list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostFilter {
    All,
    ByAuthor(UserId),
    ByTag(String),
    Search(String),
    /// Posts by authors the user follows or carrying tags the user subscribes to.
    Feed(UserId),
}

impl PostFilter {
    pub fn by_tag(name: &str) -> CoreResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::invalid("tag must not be empty"));
        }
        Ok(PostFilter::ByTag(name.to_lowercase()))
    }

    pub fn search(text: &str) -> CoreResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::invalid("search query must not be empty"));
        }
        if text.chars().count() > MAX_SEARCH_LEN {
            return Err(CoreError::invalid(format!(
                "search query must not exceed {} characters",
                MAX_SEARCH_LEN
            )));
        }
        Ok(PostFilter::Search(text.to_string()))
    }
}

impl PageRecord for PostSummary {
    type Filter = PostFilter;
    const ENTITY: &'static str = "post";
    const SORTS: &'static [SortOrder] = &[
        SortOrder::Newest,
        SortOrder::Oldest,
        SortOrder::MostInteractions,
    ];

    fn record_id(&self) -> Uuid {
        self.id.into_uuid()
    }

    fn sort_key(&self, field: SortField) -> SortKey {
        match field {
            SortField::CreatedAt => SortKey::Time(self.created_at),
            SortField::Interactions => SortKey::Count(self.interaction_count()),
        }
    }
}

const POST_KEYSET: KeysetColumns = KeysetColumns {
    id: "p.id",
    created_at: "p.created_at",
    interactions: Some("(p.like_count + p.comment_count)"),
};

#[async_trait]
impl BaseStoreReader<PostSummary> for PgStore {
    async fn read(&self, query: &StoreQuery<PostFilter>) -> CoreResult<Vec<PostSummary>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT p.id, p.author_id, u.username AS author_username, p.title, p.body,
                   ARRAY(
                       SELECT t.name FROM post_tags pt
                       JOIN tags t ON t.id = pt.tag_id
                       WHERE pt.post_id = p.id
                       ORDER BY t.name
                   ) AS tags,
                   p.like_count, p.comment_count, p.created_at
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE TRUE"#,
        );

        match &query.filter {
            PostFilter::All => {}
            PostFilter::ByAuthor(author_id) => {
                qb.push(" AND p.author_id = ");
                qb.push_bind(*author_id);
            }
            PostFilter::ByTag(name) => {
                qb.push(
                    " AND EXISTS (SELECT 1 FROM post_tags pt JOIN tags t ON t.id = pt.tag_id \
                     WHERE pt.post_id = p.id AND t.name = ",
                );
                qb.push_bind(name.clone());
                qb.push(")");
            }
            PostFilter::Search(text) => {
                qb.push(" AND p.search_vector @@ websearch_to_tsquery('english', ");
                qb.push_bind(text.clone());
                qb.push(")");
            }
            PostFilter::Feed(user_id) => {
                qb.push(" AND (p.author_id IN (SELECT followee_id FROM follows WHERE follower_id = ");
                qb.push_bind(*user_id);
                qb.push(
                    ") OR EXISTS (SELECT 1 FROM post_tags pt \
                     JOIN tag_subscriptions ts ON ts.tag_id = pt.tag_id \
                     WHERE pt.post_id = p.id AND ts.user_id = ",
                );
                qb.push_bind(*user_id);
                qb.push("))");
            }
        }

        POST_KEYSET.push_after(&mut qb, query.sort, query.after)?;
        POST_KEYSET.push_order_and_limit(&mut qb, query.sort, query.limit, query.skip)?;

        let posts = qb
            .build_query_as::<PostSummary>()
            .fetch_all(self.pool())
            .await?;

        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_tag_normalizes_name() {
        assert_eq!(
            PostFilter::by_tag("  Rust ").unwrap(),
            PostFilter::ByTag("rust".to_string())
        );
        assert!(PostFilter::by_tag("   ").is_err());
    }

    #[test]
    fn test_search_rejects_empty_and_oversized_queries() {
        assert!(matches!(
            PostFilter::search(" "),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(PostFilter::search(&"x".repeat(MAX_SEARCH_LEN + 1)).is_err());
        assert_eq!(
            PostFilter::search(" borrow checker ").unwrap(),
            PostFilter::Search("borrow checker".to_string())
        );
    }
}
