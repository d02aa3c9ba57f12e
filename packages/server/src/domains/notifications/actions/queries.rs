//! Notification query actions

use tracing::info;

use crate::common::{fetch_page, CoreResult, Page, PageRequest, UserId};
use crate::domains::notifications::models::{Notification, NotificationFilter};
use crate::kernel::BaseStoreReader;

/// Get one page of notifications addressed to `user_id`.
pub async fn list_notifications<S>(
    store: &S,
    user_id: UserId,
    unread_only: bool,
    request: &PageRequest,
) -> CoreResult<Page<Notification>>
where
    S: BaseStoreReader<Notification> + ?Sized,
{
    info!(user_id = %user_id, unread_only, "Listing notifications");

    let filter = NotificationFilter::ForUser {
        user_id,
        unread_only,
    };
    fetch_page::<Notification, _>(store, filter, request).await
}
