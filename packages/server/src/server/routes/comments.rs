use axum::{extract::Extension, Json};

use crate::common::{CoreError, Page, PageRequest, PostId, UserId};
use crate::domains::comments::actions::{list_comment_threads, list_comments_by_author};
use crate::domains::comments::{Comment, CommentNode};
use crate::kernel::ServerDeps;
use crate::server::{ApiPath, ApiQuery};

/// `GET /posts/:post_id/comments` - one page of comments as threads.
pub async fn post_comments_handler(
    Extension(deps): Extension<ServerDeps>,
    ApiPath(post_id): ApiPath<PostId>,
    ApiQuery(request): ApiQuery<PageRequest>,
) -> Result<Json<Page<CommentNode>>, CoreError> {
    let page = list_comment_threads(&deps.store, post_id, &request).await?;
    Ok(Json(page))
}

/// `GET /users/:user_id/comments` - flat page of a user's comments.
pub async fn user_comments_handler(
    Extension(deps): Extension<ServerDeps>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiQuery(request): ApiQuery<PageRequest>,
) -> Result<Json<Page<Comment>>, CoreError> {
    let page = list_comments_by_author(&deps.store, user_id, &request).await?;
    Ok(Json(page))
}
