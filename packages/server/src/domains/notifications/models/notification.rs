use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::common::{
    CommentId, CoreError, CoreResult, NotificationId, PageRecord, PostId, SortField, SortKey,
    SortOrder, StoreQuery, UserId,
};
use crate::kernel::{BaseStoreReader, KeysetColumns, PgStore};

/// Notification kind enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Follow,
    Comment,
    Reply,
    Like,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::Follow => write!(f, "follow"),
            NotificationKind::Comment => write!(f, "comment"),
            NotificationKind::Reply => write!(f, "reply"),
            NotificationKind::Like => write!(f, "like"),
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "follow" => Ok(NotificationKind::Follow),
            "comment" => Ok(NotificationKind::Comment),
            "reply" => Ok(NotificationKind::Reply),
            "like" => Ok(NotificationKind::Like),
            _ => Err(CoreError::invariant(format!("unknown notification kind: {}", s))),
        }
    }
}

/// Notification delivered to one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: UserId,
    pub kind: NotificationKind,
    pub actor_id: UserId,
    pub actor_username: String,
    pub post_id: Option<PostId>,
    pub comment_id: Option<CommentId>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_unread(&self) -> bool {
        self.read_at.is_none()
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NotificationRow {
    pub id: NotificationId,
    pub recipient_id: UserId,
    pub kind: String, // 'follow', 'comment', 'reply', 'like'
    pub actor_id: UserId,
    pub actor_username: String,
    pub post_id: Option<PostId>,
    pub comment_id: Option<CommentId>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = CoreError;

    fn try_from(row: NotificationRow) -> CoreResult<Self> {
        Ok(Notification {
            id: row.id,
            recipient_id: row.recipient_id,
            kind: row.kind.parse()?,
            actor_id: row.actor_id,
            actor_username: row.actor_username,
            post_id: row.post_id,
            comment_id: row.comment_id,
            read_at: row.read_at,
            created_at: row.created_at,
        })
    }
}

/// Which notifications to list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationFilter {
    ForUser { user_id: UserId, unread_only: bool },
}

impl PageRecord for Notification {
    type Filter = NotificationFilter;
    const ENTITY: &'static str = "notification";
    const SORTS: &'static [SortOrder] = &[SortOrder::Newest, SortOrder::Oldest];

    fn record_id(&self) -> Uuid {
        self.id.into_uuid()
    }

    fn sort_key(&self, _field: SortField) -> SortKey {
        SortKey::Time(self.created_at)
    }
}

const NOTIFICATION_KEYSET: KeysetColumns = KeysetColumns {
    id: "n.id",
    created_at: "n.created_at",
    interactions: None,
};

#[async_trait]
impl BaseStoreReader<Notification> for PgStore {
    async fn read(&self, query: &StoreQuery<NotificationFilter>) -> CoreResult<Vec<Notification>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT n.id, n.recipient_id, n.kind, n.actor_id, u.username AS actor_username,
                   n.post_id, n.comment_id, n.read_at, n.created_at
            FROM notifications n
            JOIN users u ON u.id = n.actor_id
            WHERE "#,
        );

        match &query.filter {
            NotificationFilter::ForUser {
                user_id,
                unread_only,
            } => {
                qb.push("n.recipient_id = ");
                qb.push_bind(*user_id);
                if *unread_only {
                    qb.push(" AND n.read_at IS NULL");
                }
            }
        }

        NOTIFICATION_KEYSET.push_after(&mut qb, query.sort, query.after)?;
        NOTIFICATION_KEYSET.push_order_and_limit(&mut qb, query.sort, query.limit, query.skip)?;

        let rows = qb
            .build_query_as::<NotificationRow>()
            .fetch_all(self.pool())
            .await?;

        rows.into_iter().map(Notification::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_text() {
        for kind in [
            NotificationKind::Follow,
            NotificationKind::Comment,
            NotificationKind::Reply,
            NotificationKind::Like,
        ] {
            assert_eq!(kind.to_string().parse::<NotificationKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_in_row_is_invariant_error() {
        let row = NotificationRow {
            id: NotificationId::from_u128(1),
            recipient_id: UserId::from_u128(2),
            kind: "poke".to_string(),
            actor_id: UserId::from_u128(3),
            actor_username: "grace".to_string(),
            post_id: None,
            comment_id: None,
            read_at: None,
            created_at: Utc::now(),
        };

        let err = Notification::try_from(row).unwrap_err();
        assert!(matches!(err, CoreError::Invariant(_)));
    }
}
