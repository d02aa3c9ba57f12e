//! Post query actions

use tracing::info;

use crate::common::{fetch_page, CoreResult, Page, PageRequest};
use crate::domains::posts::models::{PostFilter, PostSummary};
use crate::kernel::BaseStoreReader;

/// Get one page of posts matching `filter`.
pub async fn list_posts<S>(
    store: &S,
    filter: PostFilter,
    request: &PageRequest,
) -> CoreResult<Page<PostSummary>>
where
    S: BaseStoreReader<PostSummary> + ?Sized,
{
    info!(filter = ?filter, "Listing posts");

    fetch_page::<PostSummary, _>(store, filter, request).await
}
