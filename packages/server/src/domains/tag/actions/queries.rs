//! Tag query actions

use tracing::info;

use crate::common::{fetch_page, CoreResult, Page, PageRequest};
use crate::domains::tag::models::{TagFilter, TagSummary};
use crate::kernel::BaseStoreReader;

/// Get one page of tags matching `filter`.
pub async fn list_tags<S>(
    store: &S,
    filter: TagFilter,
    request: &PageRequest,
) -> CoreResult<Page<TagSummary>>
where
    S: BaseStoreReader<TagSummary> + ?Sized,
{
    info!(filter = ?filter, "Listing tags");

    fetch_page::<TagSummary, _>(store, filter, request).await
}
