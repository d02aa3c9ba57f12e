// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only. Pagination (limit + 1, trimming,
// cursor issuing) lives in common::pagination; a store reader only answers
// the query it is handed.
//
// Naming convention: Base* for trait names (e.g., BaseStoreReader)

use async_trait::async_trait;

use crate::common::{CoreResult, PageRecord, StoreQuery};

// =============================================================================
// Store Reader Trait (Infrastructure - one read per page)
// =============================================================================

#[async_trait]
pub trait BaseStoreReader<R: PageRecord>: Send + Sync {
    /// Return at most `query.limit` rows matching `query.filter`, ordered by
    /// `query.sort` with the record id as tie-break, starting strictly after
    /// the `query.after` position and skipping `query.skip` rows. That
    /// position is a (key, id) value and may name a row that no longer exists.
    ///
    /// Identical queries must return rows in identical order.
    async fn read(&self, query: &StoreQuery<R::Filter>) -> CoreResult<Vec<R>>;
}
