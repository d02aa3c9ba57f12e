//! Keyset ("fetch one extra") cursor pagination.
//!
//! Every list read in the application (posts, tags, comments, follows,
//! notifications) is a specialization of [`fetch_page`]: ask the store for
//! `limit + 1` rows strictly after the cursor position, ordered by the
//! resolved sort with the record id as tie-break, then trim the extra row and
//! emit a cursor for the last row kept.
//!
//! The cursor carries the last row's sort key as well as its id, so paging
//! continues correctly when that row is deleted between calls.
//!
//! # Usage
//!
//! ```rust,ignore
//! // In a request handler
//! let request = PageRequest::first(10).sorted("newest");
//! let page = fetch_page::<PostSummary, _>(&store, PostFilter::All, &request).await?;
//!
//! // Next page: same filter and sort, plus the cursor
//! let next = request.after(page.next_cursor.unwrap());
//! ```
//!
//! Paging is forward-only. A cursor is bound to the entity, sort and filter
//! that produced it and is rejected when replayed under anything else.
//! `skip` is an extra offset applied after the cursor position; combining it
//! with cursors while the underlying set changes may skip or repeat records.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{self, Debug, Display};
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

use super::error::{CoreError, CoreResult};
use crate::kernel::BaseStoreReader;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 25;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;

// ============================================================================
// Sort specification
// ============================================================================

/// The closed set of orderings a caller may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    Newest,
    Oldest,
    MostInteractions,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::MostInteractions => "most-interactions",
        }
    }

    /// Resolve to a concrete field and direction. The id tie-break always runs
    /// in the same direction as the primary field.
    pub fn resolve(self) -> ResolvedSort {
        match self {
            SortOrder::Newest => ResolvedSort {
                field: SortField::CreatedAt,
                direction: SortDirection::Descending,
            },
            SortOrder::Oldest => ResolvedSort {
                field: SortField::CreatedAt,
                direction: SortDirection::Ascending,
            },
            SortOrder::MostInteractions => ResolvedSort {
                field: SortField::Interactions,
                direction: SortDirection::Descending,
            },
        }
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "most-interactions" => Ok(SortOrder::MostInteractions),
            _ => Err(CoreError::invalid(format!("unknown sort: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Interactions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }

    /// Comparison operator selecting rows that come after the anchor.
    pub fn after_operator(&self) -> &'static str {
        match self {
            SortDirection::Ascending => ">",
            SortDirection::Descending => "<",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSort {
    pub field: SortField,
    pub direction: SortDirection,
}

/// A record's value for one sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Time(DateTime<Utc>),
    Count(i64),
}

impl SortKey {
    pub fn field(&self) -> SortField {
        match self {
            SortKey::Time(_) => SortField::CreatedAt,
            SortKey::Count(_) => SortField::Interactions,
        }
    }
}

/// Position of the last record served: its sort key and id.
///
/// Stores select rows whose `(key, id)` comes strictly after this pair in
/// the sort direction. The record itself need not exist anymore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeysetAnchor {
    pub key: SortKey,
    pub id: Uuid,
}

// ============================================================================
// Pageable records
// ============================================================================

/// An entity that can be read a page at a time.
pub trait PageRecord: Clone + Send + Sync + 'static {
    /// Entity-specific predicate. Serialized into the cursor fingerprint.
    type Filter: Serialize + Clone + Debug + Send + Sync;

    /// Name used in cursor fingerprints and logs.
    const ENTITY: &'static str;

    /// Orderings this entity supports; the first one is the default.
    const SORTS: &'static [SortOrder];

    /// Stable, totally ordered identifier used as cursor and tie-break.
    fn record_id(&self) -> Uuid;

    fn sort_key(&self, field: SortField) -> SortKey;
}

// ============================================================================
// Cursor
// ============================================================================

const FINGERPRINT_LEN: usize = 8;
// id (16) | key tag (1) | key (8, big endian) | fingerprint
const KEY_OFFSET: usize = 17;
const FINGERPRINT_OFFSET: usize = KEY_OFFSET + 8;
const CURSOR_LEN: usize = FINGERPRINT_OFFSET + FINGERPRINT_LEN;

const TAG_TIME: u8 = 0;
const TAG_COUNT: u8 = 1;

/// Digest of the (entity, sort, filter) triple a cursor was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryFingerprint([u8; FINGERPRINT_LEN]);

impl QueryFingerprint {
    pub fn of<R: PageRecord>(filter: &R::Filter, sort: SortOrder) -> CoreResult<Self> {
        let filter_json = serde_json::to_vec(filter)
            .map_err(|e| CoreError::invalid(format!("filter cannot be encoded: {}", e)))?;

        let mut hasher = Sha256::new();
        hasher.update(R::ENTITY.as_bytes());
        hasher.update([0u8]);
        hasher.update(sort.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(&filter_json);
        let digest = hasher.finalize();

        let mut bytes = [0u8; FINGERPRINT_LEN];
        bytes.copy_from_slice(&digest[..FINGERPRINT_LEN]);
        Ok(QueryFingerprint(bytes))
    }
}

/// Opaque continuation token: the position of the last record of a page,
/// bound to the query that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    anchor: KeysetAnchor,
    fingerprint: QueryFingerprint,
}

impl Cursor {
    pub fn new(anchor: KeysetAnchor, fingerprint: QueryFingerprint) -> Self {
        Cursor {
            anchor,
            fingerprint,
        }
    }

    /// Encode the cursor as a URL-safe base64 string.
    pub fn encode(&self) -> String {
        let (tag, value) = match self.anchor.key {
            SortKey::Time(at) => (TAG_TIME, at.timestamp_micros()),
            SortKey::Count(count) => (TAG_COUNT, count),
        };

        let mut bytes = [0u8; CURSOR_LEN];
        bytes[..16].copy_from_slice(self.anchor.id.as_bytes());
        bytes[16] = tag;
        bytes[KEY_OFFSET..FINGERPRINT_OFFSET].copy_from_slice(&value.to_be_bytes());
        bytes[FINGERPRINT_OFFSET..].copy_from_slice(&self.fingerprint.0);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Decode a cursor string, rejecting cursors issued for another query.
    pub fn decode(s: &str, expected: QueryFingerprint) -> CoreResult<Self> {
        let malformed = || CoreError::invalid("malformed cursor");

        let bytes = URL_SAFE_NO_PAD.decode(s).map_err(|_| malformed())?;
        if bytes.len() != CURSOR_LEN {
            return Err(malformed());
        }

        let mut fingerprint = [0u8; FINGERPRINT_LEN];
        fingerprint.copy_from_slice(&bytes[FINGERPRINT_OFFSET..]);
        if QueryFingerprint(fingerprint) != expected {
            return Err(CoreError::invalid("cursor does not belong to this query"));
        }

        let id = Uuid::from_slice(&bytes[..16]).map_err(|_| malformed())?;
        let mut value = [0u8; 8];
        value.copy_from_slice(&bytes[KEY_OFFSET..FINGERPRINT_OFFSET]);
        let value = i64::from_be_bytes(value);
        let key = match bytes[16] {
            TAG_TIME => {
                SortKey::Time(DateTime::from_timestamp_micros(value).ok_or_else(malformed)?)
            }
            TAG_COUNT => SortKey::Count(value),
            _ => return Err(malformed()),
        };

        Ok(Cursor {
            anchor: KeysetAnchor { key, id },
            fingerprint: expected,
        })
    }

    pub fn anchor(&self) -> KeysetAnchor {
        self.anchor
    }

    pub fn id(&self) -> Uuid {
        self.anchor.id
    }
}

// ============================================================================
// Page request
// ============================================================================

/// Raw pagination input, usually deserialized from a query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageRequest {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
    pub skip: Option<i64>,
    pub sort: Option<String>,
}

impl PageRequest {
    pub fn first(limit: i64) -> Self {
        PageRequest {
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn sorted(mut self, sort: &str) -> Self {
        self.sort = Some(sort.to_string());
        self
    }

    pub fn skipping(mut self, skip: i64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Validate against an entity and filter.
    ///
    /// Returns validated args with defaults applied and the cursor decoded.
    pub fn validate<R: PageRecord>(&self, filter: &R::Filter) -> CoreResult<PageArgs> {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit <= 0 {
            return Err(CoreError::invalid("limit must be a positive integer"));
        }
        if limit > MAX_PAGE_SIZE {
            return Err(CoreError::invalid(format!(
                "limit must not exceed {}",
                MAX_PAGE_SIZE
            )));
        }

        let skip = self.skip.unwrap_or(0);
        if skip < 0 {
            return Err(CoreError::invalid("skip must not be negative"));
        }

        let sort = match self.sort.as_deref() {
            Some(raw) => raw.parse::<SortOrder>()?,
            None => *R::SORTS
                .first()
                .ok_or_else(|| CoreError::invariant(format!("{} declares no sorts", R::ENTITY)))?,
        };
        if !R::SORTS.contains(&sort) {
            return Err(CoreError::invalid(format!(
                "{} cannot be sorted by {}",
                R::ENTITY,
                sort
            )));
        }

        let fingerprint = QueryFingerprint::of::<R>(filter, sort)?;
        let after = self
            .cursor
            .as_deref()
            .map(|c| Cursor::decode(c, fingerprint))
            .transpose()?
            .map(|c| c.anchor());
        if let Some(anchor) = after {
            if anchor.key.field() != sort.resolve().field {
                return Err(CoreError::invalid("malformed cursor"));
            }
        }

        Ok(PageArgs {
            limit,
            after,
            skip,
            sort,
            fingerprint,
        })
    }
}

/// Validated and normalized pagination arguments.
#[derive(Debug, Clone)]
pub struct PageArgs {
    /// Number of records to return (1..=MAX_PAGE_SIZE).
    pub limit: i64,
    /// Position of the last record of the previous page.
    pub after: Option<KeysetAnchor>,
    pub skip: i64,
    pub sort: SortOrder,
    fingerprint: QueryFingerprint,
}

impl PageArgs {
    /// Rows to request from the store (limit + 1 to detect more data).
    pub fn fetch_limit(&self) -> i64 {
        self.limit + 1
    }

    pub fn cursor_for<R: PageRecord>(&self, record: &R) -> Cursor {
        let anchor = KeysetAnchor {
            key: record.sort_key(self.sort.resolve().field),
            id: record.record_id(),
        };
        Cursor::new(anchor, self.fingerprint)
    }
}

// ============================================================================
// Store query and page
// ============================================================================

/// What a store reader is asked for: rows matching `filter`, ordered by `sort`
/// then id, strictly after the `after` position, offset by `skip`, at most
/// `limit` rows.
#[derive(Debug, Clone)]
pub struct StoreQuery<F> {
    pub filter: F,
    pub sort: ResolvedSort,
    pub after: Option<KeysetAnchor>,
    pub skip: i64,
    pub limit: i64,
}

/// One page of records plus the continuation cursor.
///
/// `nextCursor` is always serialized; `null` means the end of the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Page {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Replace the items, keeping the cursor.
    pub fn try_map_items<U>(
        self,
        f: impl FnOnce(Vec<T>) -> CoreResult<Vec<U>>,
    ) -> CoreResult<Page<U>> {
        Ok(Page {
            items: f(self.items)?,
            next_cursor: self.next_cursor,
        })
    }
}

/// Trim results to the requested limit and determine if there are more.
///
/// Stores are asked for `limit + 1` rows. This trims to the actual limit and
/// returns whether there were more rows.
pub fn trim_results<T>(mut results: Vec<T>, limit: i64) -> (Vec<T>, bool) {
    let limit = usize::try_from(limit).unwrap_or(0);
    let has_more = results.len() > limit;
    if has_more {
        results.truncate(limit);
    }
    (results, has_more)
}

/// Fetch one page of `R` matching `filter`.
///
/// Issues exactly one store read. Store failures propagate unchanged; an
/// empty match is an empty page with no cursor.
pub async fn fetch_page<R, S>(store: &S, filter: R::Filter, request: &PageRequest) -> CoreResult<Page<R>>
where
    R: PageRecord,
    S: BaseStoreReader<R> + ?Sized,
{
    let args = request.validate::<R>(&filter)?;

    let query = StoreQuery {
        filter,
        sort: args.sort.resolve(),
        after: args.after,
        skip: args.skip,
        limit: args.fetch_limit(),
    };
    let rows = store.read(&query).await?;

    let (items, has_more) = trim_results(rows, args.limit);
    let next_cursor = if has_more {
        items.last().map(|r| args.cursor_for(r).encode())
    } else {
        None
    };

    debug!(
        entity = R::ENTITY,
        sort = %args.sort,
        returned = items.len(),
        has_more,
        "Fetched page"
    );

    Ok(Page { items, next_cursor })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Note {
        id: Uuid,
        created_at: DateTime<Utc>,
    }

    #[derive(Debug, Clone, Serialize)]
    enum NoteFilter {
        All,
        ByAuthor(u32),
    }

    impl PageRecord for Note {
        type Filter = NoteFilter;
        const ENTITY: &'static str = "note";
        const SORTS: &'static [SortOrder] = &[SortOrder::Newest, SortOrder::Oldest];

        fn record_id(&self) -> Uuid {
            self.id
        }

        fn sort_key(&self, _field: SortField) -> SortKey {
            SortKey::Time(self.created_at)
        }
    }

    fn fingerprint(filter: &NoteFilter, sort: SortOrder) -> QueryFingerprint {
        QueryFingerprint::of::<Note>(filter, sort).unwrap()
    }

    fn anchor(id: Uuid) -> KeysetAnchor {
        KeysetAnchor {
            key: SortKey::Time(DateTime::from_timestamp(1_700_000_000, 123_456_000).unwrap()),
            id,
        }
    }

    #[test]
    fn test_sort_order_parses_known_keys() {
        assert_eq!("newest".parse::<SortOrder>().unwrap(), SortOrder::Newest);
        assert_eq!("oldest".parse::<SortOrder>().unwrap(), SortOrder::Oldest);
        assert_eq!(
            "most-interactions".parse::<SortOrder>().unwrap(),
            SortOrder::MostInteractions
        );
    }

    #[test]
    fn test_unknown_sort_is_invalid_argument() {
        let err = "popular".parse::<SortOrder>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn test_resolve_directions() {
        assert_eq!(SortOrder::Newest.resolve().direction, SortDirection::Descending);
        assert_eq!(SortOrder::Oldest.resolve().direction, SortDirection::Ascending);
        assert_eq!(
            SortOrder::MostInteractions.resolve().field,
            SortField::Interactions
        );
    }

    #[test]
    fn test_cursor_encode_decode() {
        let fp = fingerprint(&NoteFilter::All, SortOrder::Newest);
        let id = Uuid::new_v4();
        let encoded = Cursor::new(anchor(id), fp).encode();
        let decoded = Cursor::decode(&encoded, fp).unwrap();
        assert_eq!(decoded.anchor(), anchor(id));
    }

    #[test]
    fn test_cursor_carries_count_keys() {
        let fp = fingerprint(&NoteFilter::All, SortOrder::Newest);
        let counted = KeysetAnchor {
            key: SortKey::Count(-42),
            id: Uuid::new_v4(),
        };
        let decoded = Cursor::decode(&Cursor::new(counted, fp).encode(), fp).unwrap();
        assert_eq!(decoded.anchor(), counted);
    }

    #[test]
    fn test_cursor_with_unknown_key_tag_is_malformed() {
        let fp = fingerprint(&NoteFilter::All, SortOrder::Newest);
        let mut bytes = URL_SAFE_NO_PAD
            .decode(Cursor::new(anchor(Uuid::new_v4()), fp).encode())
            .unwrap();
        bytes[16] = 9;
        let err = Cursor::decode(&URL_SAFE_NO_PAD.encode(bytes), fp).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn test_cursor_rejected_under_other_filter() {
        let issued = fingerprint(&NoteFilter::ByAuthor(1), SortOrder::Newest);
        let replayed = fingerprint(&NoteFilter::ByAuthor(2), SortOrder::Newest);
        let encoded = Cursor::new(anchor(Uuid::new_v4()), issued).encode();

        let err = Cursor::decode(&encoded, replayed).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn test_cursor_rejected_under_other_sort() {
        let issued = fingerprint(&NoteFilter::All, SortOrder::Newest);
        let replayed = fingerprint(&NoteFilter::All, SortOrder::Oldest);
        let encoded = Cursor::new(anchor(Uuid::new_v4()), issued).encode();
        assert!(Cursor::decode(&encoded, replayed).is_err());
    }

    #[test]
    fn test_garbage_cursor_is_invalid_argument() {
        let fp = fingerprint(&NoteFilter::All, SortOrder::Newest);
        for raw in ["not base64!!", "", "AAAA"] {
            let err = Cursor::decode(raw, fp).unwrap_err();
            assert!(matches!(err, CoreError::InvalidArgument(_)), "{}", raw);
        }
    }

    #[test]
    fn test_validate_defaults() {
        let args = PageRequest::default()
            .validate::<Note>(&NoteFilter::All)
            .unwrap();
        assert_eq!(args.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(args.fetch_limit(), DEFAULT_PAGE_SIZE + 1);
        assert_eq!(args.skip, 0);
        assert_eq!(args.sort, SortOrder::Newest);
        assert!(args.after.is_none());
    }

    #[test]
    fn test_validate_rejects_non_positive_limit() {
        for limit in [0, -1, -50] {
            let err = PageRequest::first(limit)
                .validate::<Note>(&NoteFilter::All)
                .unwrap_err();
            assert!(matches!(err, CoreError::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_validate_rejects_oversized_limit() {
        assert!(PageRequest::first(MAX_PAGE_SIZE)
            .validate::<Note>(&NoteFilter::All)
            .is_ok());
        assert!(PageRequest::first(MAX_PAGE_SIZE + 1)
            .validate::<Note>(&NoteFilter::All)
            .is_err());
    }

    #[test]
    fn test_validate_rejects_negative_skip() {
        let err = PageRequest::first(5)
            .skipping(-1)
            .validate::<Note>(&NoteFilter::All)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn test_validate_rejects_sort_entity_does_not_support() {
        let err = PageRequest::first(5)
            .sorted("most-interactions")
            .validate::<Note>(&NoteFilter::All)
            .unwrap_err();
        assert!(err.to_string().contains("note cannot be sorted by most-interactions"));
    }

    #[test]
    fn test_validate_decodes_matching_cursor() {
        let id = Uuid::new_v4();
        let cursor =
            Cursor::new(anchor(id), fingerprint(&NoteFilter::All, SortOrder::Oldest)).encode();
        let args = PageRequest::first(10)
            .sorted("oldest")
            .after(cursor)
            .validate::<Note>(&NoteFilter::All)
            .unwrap();
        assert_eq!(args.after, Some(anchor(id)));
    }

    #[test]
    fn test_trim_results() {
        let items: Vec<i32> = (1..=11).collect();
        let (trimmed, has_more) = trim_results(items, 10);
        assert_eq!(trimmed, (1..=10).collect::<Vec<_>>());
        assert!(has_more);

        let items: Vec<i32> = (1..=10).collect();
        let (trimmed, has_more) = trim_results(items, 10);
        assert_eq!(trimmed.len(), 10);
        assert!(!has_more);
    }

    #[test]
    fn test_page_serializes_null_cursor() {
        let page: Page<u8> = Page::empty();
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json, serde_json::json!({ "items": [], "nextCursor": null }));
    }
}
