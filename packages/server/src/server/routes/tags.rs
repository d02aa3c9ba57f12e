use axum::{extract::Extension, Json};
use serde::Deserialize;

use crate::common::{CoreError, CoreResult, Page, PageRequest, UserId};
use crate::domains::tag::actions::list_tags;
use crate::domains::tag::{TagFilter, TagSummary};
use crate::kernel::ServerDeps;
use crate::server::ApiQuery;

#[derive(Debug, Default, Deserialize)]
pub struct TagListParams {
    pub q: Option<String>,
    pub subscribed_by: Option<UserId>,
}

impl TagListParams {
    pub fn into_filter(self) -> CoreResult<TagFilter> {
        match (self.q, self.subscribed_by) {
            (Some(_), Some(_)) => Err(CoreError::invalid("q and subscribed_by cannot be combined")),
            (Some(q), None) => TagFilter::search(&q),
            (None, Some(user)) => Ok(TagFilter::SubscribedBy(user)),
            (None, None) => Ok(TagFilter::All),
        }
    }
}

/// `GET /tags`
pub async fn tags_handler(
    Extension(deps): Extension<ServerDeps>,
    ApiQuery(request): ApiQuery<PageRequest>,
    ApiQuery(params): ApiQuery<TagListParams>,
) -> Result<Json<Page<TagSummary>>, CoreError> {
    let filter = params.into_filter()?;
    let page = list_tags(&deps.store, filter, &request).await?;
    Ok(Json(page))
}
