//! Follow query actions

use tracing::info;

use crate::common::{fetch_page, CoreResult, Page, PageRequest, UserId};
use crate::domains::follows::models::{FollowFilter, FollowRecord};
use crate::kernel::BaseStoreReader;

/// Get one page of the users following `user_id`.
pub async fn list_followers<S>(
    store: &S,
    user_id: UserId,
    request: &PageRequest,
) -> CoreResult<Page<FollowRecord>>
where
    S: BaseStoreReader<FollowRecord> + ?Sized,
{
    info!(user_id = %user_id, "Listing followers");

    fetch_page::<FollowRecord, _>(store, FollowFilter::FollowersOf(user_id), request).await
}

/// Get one page of the users `user_id` follows.
pub async fn list_following<S>(
    store: &S,
    user_id: UserId,
    request: &PageRequest,
) -> CoreResult<Page<FollowRecord>>
where
    S: BaseStoreReader<FollowRecord> + ?Sized,
{
    info!(user_id = %user_id, "Listing followed users");

    fetch_page::<FollowRecord, _>(store, FollowFilter::FollowingOf(user_id), request).await
}
