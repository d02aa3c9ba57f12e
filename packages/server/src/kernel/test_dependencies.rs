// TestDependencies - in-memory implementations for testing
//
// MemoryStore answers store queries from a Vec, honoring the same ordering,
// cursor, skip and limit rules as the Postgres reader, and records every
// query it receives. The cursor position is compared by value, so paging
// continues when the anchor row has been removed.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::BaseStoreReader;
use crate::common::{
    CoreError, CoreResult, KeysetAnchor, PageRecord, ResolvedSort, SortDirection, StoreQuery,
};

// =============================================================================
// Memory Store
// =============================================================================

/// Decides whether a row matches a filter.
pub type MemoryMatcher<R> = Arc<dyn Fn(&<R as PageRecord>::Filter, &R) -> bool + Send + Sync>;

pub struct MemoryStore<R: PageRecord> {
    rows: Arc<Mutex<Vec<R>>>,
    matcher: MemoryMatcher<R>,
    reads: Arc<Mutex<Vec<StoreQuery<R::Filter>>>>,
    unavailable: Arc<AtomicBool>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<R: PageRecord> MemoryStore<R> {
    pub fn new(matcher: impl Fn(&R::Filter, &R) -> bool + Send + Sync + 'static) -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            matcher: Arc::new(matcher),
            reads: Arc::new(Mutex::new(Vec::new())),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_rows(self, rows: impl IntoIterator<Item = R>) -> Self {
        lock(&self.rows).extend(rows);
        self
    }

    pub fn insert(&self, row: R) {
        lock(&self.rows).push(row);
    }

    pub fn remove(&self, id: Uuid) {
        lock(&self.rows).retain(|r| r.record_id() != id);
    }

    /// Make every subsequent read fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    /// Get every query this store has answered (or refused)
    pub fn reads(&self) -> Vec<StoreQuery<R::Filter>> {
        lock(&self.reads).clone()
    }
}

fn ordered<T: Ord>(a: &T, b: &T, sort: ResolvedSort) -> Ordering {
    match sort.direction {
        SortDirection::Ascending => a.cmp(b),
        SortDirection::Descending => b.cmp(a),
    }
}

fn compare<R: PageRecord>(a: &R, b: &R, sort: ResolvedSort) -> Ordering {
    let ka = (a.sort_key(sort.field), a.record_id());
    let kb = (b.sort_key(sort.field), b.record_id());
    ordered(&ka, &kb, sort)
}

/// Strictly after the cursor position; the anchor row itself need not exist.
fn after_anchor<R: PageRecord>(row: &R, anchor: &KeysetAnchor, sort: ResolvedSort) -> bool {
    let key = (row.sort_key(sort.field), row.record_id());
    ordered(&key, &(anchor.key, anchor.id), sort) == Ordering::Greater
}

#[async_trait]
impl<R: PageRecord> BaseStoreReader<R> for MemoryStore<R> {
    async fn read(&self, query: &StoreQuery<R::Filter>) -> CoreResult<Vec<R>> {
        lock(&self.reads).push(query.clone());

        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(CoreError::Unavailable(sqlx::Error::PoolTimedOut));
        }

        let mut matching: Vec<R> = lock(&self.rows)
            .iter()
            .filter(|r| (self.matcher)(&query.filter, r))
            .filter(|r| {
                query
                    .after
                    .map_or(true, |anchor| after_anchor(*r, &anchor, query.sort))
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| compare(a, b, query.sort));

        let skip = usize::try_from(query.skip).unwrap_or(0);
        let limit = usize::try_from(query.limit).unwrap_or(0);
        Ok(matching.into_iter().skip(skip).take(limit).collect())
    }
}
