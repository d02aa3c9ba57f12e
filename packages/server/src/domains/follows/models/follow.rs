use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::common::{
    CoreResult, FollowId, PageRecord, SortField, SortKey, SortOrder, StoreQuery, UserId,
};
use crate::kernel::{BaseStoreReader, KeysetColumns, PgStore};

/// One follow edge, seen from the user whose list is being read.
///
/// For a followers list `user_id` is the follower; for a following list it is
/// the followee.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FollowRecord {
    pub id: FollowId,
    pub user_id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Which side of the follow graph to list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowFilter {
    FollowersOf(UserId),
    FollowingOf(UserId),
}

impl PageRecord for FollowRecord {
    type Filter = FollowFilter;
    const ENTITY: &'static str = "follow";
    const SORTS: &'static [SortOrder] = &[SortOrder::Newest, SortOrder::Oldest];

    fn record_id(&self) -> Uuid {
        self.id.into_uuid()
    }

    fn sort_key(&self, _field: SortField) -> SortKey {
        SortKey::Time(self.created_at)
    }
}

const FOLLOW_KEYSET: KeysetColumns = KeysetColumns {
    id: "f.id",
    created_at: "f.created_at",
    interactions: None,
};

#[async_trait]
impl BaseStoreReader<FollowRecord> for PgStore {
    async fn read(&self, query: &StoreQuery<FollowFilter>) -> CoreResult<Vec<FollowRecord>> {
        let mut qb = match &query.filter {
            FollowFilter::FollowersOf(user_id) => {
                let mut qb = QueryBuilder::<Postgres>::new(
                    "SELECT f.id, f.follower_id AS user_id, u.username, f.created_at \
                     FROM follows f JOIN users u ON u.id = f.follower_id \
                     WHERE f.followee_id = ",
                );
                qb.push_bind(*user_id);
                qb
            }
            FollowFilter::FollowingOf(user_id) => {
                let mut qb = QueryBuilder::<Postgres>::new(
                    "SELECT f.id, f.followee_id AS user_id, u.username, f.created_at \
                     FROM follows f JOIN users u ON u.id = f.followee_id \
                     WHERE f.follower_id = ",
                );
                qb.push_bind(*user_id);
                qb
            }
        };

        FOLLOW_KEYSET.push_after(&mut qb, query.sort, query.after)?;
        FOLLOW_KEYSET.push_order_and_limit(&mut qb, query.sort, query.limit, query.skip)?;

        let follows = qb
            .build_query_as::<FollowRecord>()
            .fetch_all(self.pool())
            .await?;

        Ok(follows)
    }
}
