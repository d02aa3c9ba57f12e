//! Comment query actions
//!
//! Query actions return data directly. Store access is passed in so the same
//! code runs against Postgres and the in-memory store.

use tracing::info;

use crate::common::{fetch_page, CoreResult, Page, PageRequest, PostId, UserId};
use crate::domains::comments::models::{Comment, CommentFilter};
use crate::domains::comments::tree::{build_forest, CommentNode};
use crate::kernel::BaseStoreReader;

/// Get one page of a post's comments, arranged into threads.
///
/// The cursor is the flat page's cursor: the next call continues with the
/// comment after the last one read, whatever thread it belongs to.
pub async fn list_comment_threads<S>(
    store: &S,
    post_id: PostId,
    request: &PageRequest,
) -> CoreResult<Page<CommentNode>>
where
    S: BaseStoreReader<Comment> + ?Sized,
{
    info!(post_id = %post_id, "Listing comment threads");

    let page = fetch_page::<Comment, _>(store, CommentFilter::ByPost(post_id), request).await?;
    page.try_map_items(build_forest)
}

/// Get a flat page of comments written by one user.
pub async fn list_comments_by_author<S>(
    store: &S,
    author_id: UserId,
    request: &PageRequest,
) -> CoreResult<Page<Comment>>
where
    S: BaseStoreReader<Comment> + ?Sized,
{
    info!(author_id = %author_id, "Listing comments by author");

    fetch_page::<Comment, _>(store, CommentFilter::ByAuthor(author_id), request).await
}
