use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::common::{
    CommentId, CoreResult, PageRecord, PostId, SortField, SortKey, SortOrder, StoreQuery, UserId,
};
use crate::kernel::{BaseStoreReader, KeysetColumns, PgStore};

/// Where a comment hangs in its thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentRef {
    /// Top-level comment on the post.
    Root,
    /// Reply to another comment on the same post.
    Reply(CommentId),
}

impl ParentRef {
    pub fn parent_id(&self) -> Option<CommentId> {
        match self {
            ParentRef::Root => None,
            ParentRef::Reply(id) => Some(*id),
        }
    }
}

impl From<Option<CommentId>> for ParentRef {
    fn from(parent: Option<CommentId>) -> Self {
        match parent {
            Some(id) => ParentRef::Reply(id),
            None => ParentRef::Root,
        }
    }
}

// On the wire a parent is a nullable id.
impl Serialize for ParentRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.parent_id().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParentRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<CommentId>::deserialize(deserializer).map(ParentRef::from)
    }
}

/// A comment on a post, as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub author_username: String,
    pub body: String,
    #[serde(rename = "parentId")]
    pub parent: ParentRef,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub author_username: String,
    pub body: String,
    pub parent_comment_id: Option<CommentId>,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            author_username: row.author_username,
            body: row.body,
            parent: ParentRef::from(row.parent_comment_id),
            like_count: row.like_count,
            created_at: row.created_at,
        }
    }
}

/// Which comments to list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentFilter {
    ByPost(PostId),
    ByAuthor(UserId),
}

impl PageRecord for Comment {
    type Filter = CommentFilter;
    const ENTITY: &'static str = "comment";
    // Threads read oldest-first by default.
    const SORTS: &'static [SortOrder] = &[
        SortOrder::Oldest,
        SortOrder::Newest,
        SortOrder::MostInteractions,
    ];

    fn record_id(&self) -> Uuid {
        self.id.into_uuid()
    }

    fn sort_key(&self, field: SortField) -> SortKey {
        match field {
            SortField::CreatedAt => SortKey::Time(self.created_at),
            SortField::Interactions => SortKey::Count(self.like_count),
        }
    }
}

const COMMENT_KEYSET: KeysetColumns = KeysetColumns {
    id: "c.id",
    created_at: "c.created_at",
    interactions: Some("c.like_count"),
};

#[async_trait]
impl BaseStoreReader<Comment> for PgStore {
    async fn read(&self, query: &StoreQuery<CommentFilter>) -> CoreResult<Vec<Comment>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT c.id, c.post_id, c.author_id, u.username AS author_username,
                   c.body, c.parent_comment_id, c.like_count, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE "#,
        );

        match &query.filter {
            CommentFilter::ByPost(post_id) => {
                qb.push("c.post_id = ");
                qb.push_bind(*post_id);
            }
            CommentFilter::ByAuthor(author_id) => {
                qb.push("c.author_id = ");
                qb.push_bind(*author_id);
            }
        }

        COMMENT_KEYSET.push_after(&mut qb, query.sort, query.after)?;
        COMMENT_KEYSET.push_order_and_limit(&mut qb, query.sort, query.limit, query.skip)?;

        let rows = qb
            .build_query_as::<CommentRow>()
            .fetch_all(self.pool())
            .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }
}
