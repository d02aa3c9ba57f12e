use axum::{extract::Extension, Json};

use crate::common::{CoreError, Page, PageRequest, UserId};
use crate::domains::follows::actions::{list_followers, list_following};
use crate::domains::follows::FollowRecord;
use crate::kernel::ServerDeps;
use crate::server::{ApiPath, ApiQuery};

/// `GET /users/:user_id/followers`
pub async fn followers_handler(
    Extension(deps): Extension<ServerDeps>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiQuery(request): ApiQuery<PageRequest>,
) -> Result<Json<Page<FollowRecord>>, CoreError> {
    Ok(Json(list_followers(&deps.store, user_id, &request).await?))
}

/// `GET /users/:user_id/following`
pub async fn following_handler(
    Extension(deps): Extension<ServerDeps>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiQuery(request): ApiQuery<PageRequest>,
) -> Result<Json<Page<FollowRecord>>, CoreError> {
    Ok(Json(list_following(&deps.store, user_id, &request).await?))
}
