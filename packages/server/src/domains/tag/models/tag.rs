use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::common::{
    CoreError, CoreResult, PageRecord, SortField, SortKey, SortOrder, StoreQuery, TagId, UserId,
};
use crate::kernel::{BaseStoreReader, KeysetColumns, PgStore};

/// Tag with its usage counters.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TagSummary {
    pub id: TagId,
    pub name: String, // lowercase, unique
    pub post_count: i64,
    pub subscriber_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Which tags to list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagFilter {
    All,
    /// Tags whose name starts with the given prefix.
    Search(String),
    SubscribedBy(UserId),
}

impl TagFilter {
    pub fn search(prefix: &str) -> CoreResult<Self> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(CoreError::invalid("tag search must not be empty"));
        }
        Ok(TagFilter::Search(prefix.to_lowercase()))
    }
}

/// Escape LIKE metacharacters so a prefix only matches literally.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl PageRecord for TagSummary {
    type Filter = TagFilter;
    const ENTITY: &'static str = "tag";
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
            SortField::Interactions => SortKey::Count(self.post_count + self.subscriber_count),
        }
    }
}

const TAG_KEYSET: KeysetColumns = KeysetColumns {
    id: "t.id",
    created_at: "t.created_at",
    interactions: Some("(t.post_count + t.subscriber_count)"),
};

#[async_trait]
impl BaseStoreReader<TagSummary> for PgStore {
    async fn read(&self, query: &StoreQuery<TagFilter>) -> CoreResult<Vec<TagSummary>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT t.id, t.name, t.post_count, t.subscriber_count, t.created_at FROM tags t WHERE TRUE",
        );

        match &query.filter {
            TagFilter::All => {}
            TagFilter::Search(prefix) => {
                qb.push(" AND t.name LIKE ");
                qb.push_bind(like_prefix(prefix));
            }
            TagFilter::SubscribedBy(user_id) => {
                qb.push(" AND EXISTS (SELECT 1 FROM tag_subscriptions ts WHERE ts.tag_id = t.id AND ts.user_id = ");
                qb.push_bind(*user_id);
                qb.push(")");
            }
        }

        TAG_KEYSET.push_after(&mut qb, query.sort, query.after)?;
        TAG_KEYSET.push_order_and_limit(&mut qb, query.sort, query.limit, query.skip)?;

        let tags = qb
            .build_query_as::<TagSummary>()
            .fetch_all(self.pool())
            .await?;

        Ok(tags)
    }
}
