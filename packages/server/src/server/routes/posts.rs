use axum::{extract::Extension, Json};
use serde::Deserialize;

use crate::common::{CoreError, CoreResult, Page, PageRequest, UserId};
use crate::domains::posts::actions::list_posts;
use crate::domains::posts::{PostFilter, PostSummary};
use crate::kernel::ServerDeps;
use crate::server::ApiQuery;

/// Post list filters. At most one may be given.
#[derive(Debug, Default, Deserialize)]
pub struct PostListParams {
    pub author: Option<UserId>,
    pub tag: Option<String>,
    pub q: Option<String>,
    pub feed: Option<UserId>,
}

impl PostListParams {
    pub fn into_filter(self) -> CoreResult<PostFilter> {
        let given = [
            self.author.is_some(),
            self.tag.is_some(),
            self.q.is_some(),
            self.feed.is_some(),
        ]
        .into_iter()
        .filter(|given| *given)
        .count();
        if given > 1 {
            return Err(CoreError::invalid(
                "author, tag, q and feed cannot be combined",
            ));
        }

        match self {
            PostListParams {
                author: Some(author),
                ..
            } => Ok(PostFilter::ByAuthor(author)),
            PostListParams { tag: Some(tag), .. } => PostFilter::by_tag(&tag),
            PostListParams { q: Some(q), .. } => PostFilter::search(&q),
            PostListParams {
                feed: Some(user), ..
            } => Ok(PostFilter::Feed(user)),
            _ => Ok(PostFilter::All),
        }
    }
}

/// `GET /posts`
pub async fn posts_handler(
    Extension(deps): Extension<ServerDeps>,
    ApiQuery(request): ApiQuery<PageRequest>,
    ApiQuery(params): ApiQuery<PostListParams>,
) -> Result<Json<Page<PostSummary>>, CoreError> {
    let filter = params.into_filter()?;
    let page = list_posts(&deps.store, filter, &request).await?;
    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_params_lists_everything() {
        assert_eq!(PostListParams::default().into_filter().unwrap(), PostFilter::All);
    }

    #[test]
    fn test_single_param_selects_filter() {
        let params = PostListParams {
            tag: Some("Rust".to_string()),
            ..Default::default()
        };
        assert_eq!(params.into_filter().unwrap(), PostFilter::ByTag("rust".to_string()));
    }

    #[test]
    fn test_combined_params_are_rejected() {
        let params = PostListParams {
            author: Some(UserId::from_u128(1)),
            q: Some("tokio".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            params.into_filter(),
            Err(CoreError::InvalidArgument(_))
        ));
    }
}
