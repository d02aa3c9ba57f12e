//! Test fixtures: record builders, in-memory stores, and Postgres seeding.

use anyhow::Result;
use blog_core::common::{
    fetch_page, CommentId, CoreResult, PageRecord, PageRequest, PostId, TagId, UserId,
};
use blog_core::domains::comments::{Comment, CommentFilter, ParentRef};
use blog_core::domains::posts::{PostFilter, PostSummary};
use blog_core::kernel::{BaseStoreReader, MemoryStore};
use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::PgPool;

pub const AUTHOR: u128 = 1_000;

/// Fixed timeline: `at(n)` is n minutes after 2024-01-01T00:00Z.
pub fn at(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minute)
}

// =============================================================================
// In-memory records
// =============================================================================

pub fn post(n: u128, minute: i64) -> PostSummary {
    PostSummary {
        id: PostId::from_u128(n),
        author_id: UserId::from_u128(AUTHOR),
        author_username: "ada".to_string(),
        title: format!("Post {}", n),
        body: format!("Body of post {}", n),
        tags: Vec::new(),
        like_count: 0,
        comment_count: 0,
        created_at: at(minute),
    }
}

/// `count` posts with ids 1..=count, one minute apart.
pub fn posts(count: u128) -> Vec<PostSummary> {
    (1..=count).map(|n| post(n, n as i64)).collect()
}

pub fn post_store(rows: Vec<PostSummary>) -> MemoryStore<PostSummary> {
    MemoryStore::new(|filter: &PostFilter, post: &PostSummary| match filter {
        PostFilter::All => true,
        PostFilter::ByAuthor(author) => post.author_id == *author,
        PostFilter::ByTag(tag) => post.tags.iter().any(|t| t == tag),
        PostFilter::Search(text) => {
            let text = text.to_lowercase();
            post.title.to_lowercase().contains(&text) || post.body.to_lowercase().contains(&text)
        }
        PostFilter::Feed(_) => false,
    })
    .with_rows(rows)
}

pub fn comment(n: u128, post: u128, parent: Option<u128>, minute: i64) -> Comment {
    Comment {
        id: CommentId::from_u128(n),
        post_id: PostId::from_u128(post),
        author_id: UserId::from_u128(AUTHOR),
        author_username: "ada".to_string(),
        body: format!("comment {}", n),
        parent: ParentRef::from(parent.map(CommentId::from_u128)),
        like_count: 0,
        created_at: at(minute),
    }
}

pub fn comment_store(rows: Vec<Comment>) -> MemoryStore<Comment> {
    MemoryStore::new(|filter: &CommentFilter, comment: &Comment| match filter {
        CommentFilter::ByPost(post_id) => comment.post_id == *post_id,
        CommentFilter::ByAuthor(author_id) => comment.author_id == *author_id,
    })
    .with_rows(rows)
}

/// Follow cursors from `request` until the data runs out.
///
/// Returns the records in the order served plus the number of pages.
pub async fn collect_all<R, S>(
    store: &S,
    filter: R::Filter,
    request: PageRequest,
) -> CoreResult<(Vec<R>, usize)>
where
    R: PageRecord,
    S: BaseStoreReader<R> + ?Sized,
{
    let mut request = request;
    let mut records = Vec::new();
    let mut pages = 0;

    loop {
        let page = fetch_page::<R, S>(store, filter.clone(), &request).await?;
        pages += 1;
        records.extend(page.items);
        match page.next_cursor {
            Some(cursor) => request.cursor = Some(cursor),
            None => return Ok((records, pages)),
        }
        assert!(pages <= 10_000, "pagination did not terminate");
    }
}

pub fn ids<R: PageRecord>(records: &[R]) -> Vec<u128> {
    records.iter().map(|r| r.record_id().as_u128()).collect()
}

// =============================================================================
// Postgres seeding
// =============================================================================

pub async fn create_user(pool: &PgPool, username: &str) -> Result<UserId> {
    let id = UserId::new();
    sqlx::query("INSERT INTO users (id, username) VALUES ($1, $2)")
        .bind(id)
        .bind(username)
        .execute(pool)
        .await?;
    Ok(id)
}

pub async fn create_post(
    pool: &PgPool,
    author_id: UserId,
    title: &str,
    created_at: DateTime<Utc>,
) -> Result<PostId> {
    let id = PostId::new();
    sqlx::query(
        "INSERT INTO posts (id, author_id, title, body, created_at) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(author_id)
    .bind(title)
    .bind(format!("{} body", title))
    .bind(created_at)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn create_tag(pool: &PgPool, name: &str) -> Result<TagId> {
    let id = TagId::new();
    sqlx::query("INSERT INTO tags (id, name) VALUES ($1, $2)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(id)
}

pub async fn tag_post(pool: &PgPool, post_id: PostId, tag_id: TagId) -> Result<()> {
    sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES ($1, $2)")
        .bind(post_id)
        .bind(tag_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn create_comment(
    pool: &PgPool,
    post_id: PostId,
    author_id: UserId,
    parent: Option<CommentId>,
    created_at: DateTime<Utc>,
) -> Result<CommentId> {
    let id = CommentId::new();
    sqlx::query(
        "INSERT INTO comments (id, post_id, author_id, body, parent_comment_id, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(id)
    .bind(post_id)
    .bind(author_id)
    .bind("a comment")
    .bind(parent)
    .bind(created_at)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn follow(pool: &PgPool, follower_id: UserId, followee_id: UserId) -> Result<()> {
    sqlx::query("INSERT INTO follows (id, follower_id, followee_id) VALUES ($1, $2, $3)")
        .bind(uuid::Uuid::now_v7())
        .bind(follower_id)
        .bind(followee_id)
        .execute(pool)
        .await?;
    Ok(())
}
