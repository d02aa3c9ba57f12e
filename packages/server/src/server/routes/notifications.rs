use axum::{extract::Extension, Json};
use serde::Deserialize;

use crate::common::{CoreError, Page, PageRequest, UserId};
use crate::domains::notifications::actions::list_notifications;
use crate::domains::notifications::Notification;
use crate::kernel::ServerDeps;
use crate::server::{ApiPath, ApiQuery};

#[derive(Debug, Default, Deserialize)]
pub struct NotificationListParams {
    #[serde(default)]
    pub unread: bool,
}

/// `GET /users/:user_id/notifications`
///
/// Identity of the caller is checked upstream; this only reads.
pub async fn notifications_handler(
    Extension(deps): Extension<ServerDeps>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiQuery(request): ApiQuery<PageRequest>,
    ApiQuery(params): ApiQuery<NotificationListParams>,
) -> Result<Json<Page<Notification>>, CoreError> {
    let page = list_notifications(&deps.store, user_id, params.unread, &request).await?;
    Ok(Json(page))
}
