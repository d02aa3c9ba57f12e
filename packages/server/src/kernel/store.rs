//! Postgres store reader.
//!
//! One `PgStore` is built at startup and handed to every handler that reads.
//! Each entity implements `BaseStoreReader` for it next to its model; the
//! keyset SQL shared by all of them lives here.

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::common::{CoreError, CoreResult, KeysetAnchor, ResolvedSort, SortField, SortKey};

/// Postgres-backed store reader.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// SQL expressions describing how an entity is ordered.
///
/// Expressions refer to the aliased row being listed.
#[derive(Debug, Clone, Copy)]
pub struct KeysetColumns {
    pub id: &'static str,
    pub created_at: &'static str,
    pub interactions: Option<&'static str>,
}

impl KeysetColumns {
    fn sort_expr(&self, field: SortField) -> CoreResult<&'static str> {
        match field {
            SortField::CreatedAt => Ok(self.created_at),
            SortField::Interactions => self
                .interactions
                .ok_or_else(|| CoreError::invalid("sort order not supported for this listing")),
        }
    }

    /// Append ` AND (key, id) <op> ($key, $id)` when a cursor is set.
    ///
    /// Both values come from the cursor, so the anchor row may have been
    /// deleted since.
    pub fn push_after(
        &self,
        qb: &mut QueryBuilder<'_, Postgres>,
        sort: ResolvedSort,
        after: Option<KeysetAnchor>,
    ) -> CoreResult<()> {
        let Some(after) = after else {
            return Ok(());
        };
        let expr = self.sort_expr(sort.field)?;
        if after.key.field() != sort.field {
            return Err(CoreError::invalid("cursor does not match the sort order"));
        }

        qb.push(format!(
            " AND ({}, {}) {} (",
            expr,
            self.id,
            sort.direction.after_operator()
        ));
        match after.key {
            SortKey::Time(at) => qb.push_bind(at),
            SortKey::Count(count) => qb.push_bind(count),
        };
        qb.push(", ");
        qb.push_bind(after.id);
        qb.push(")");
        Ok(())
    }

    /// Append ` ORDER BY key, id LIMIT .. OFFSET ..`.
    pub fn push_order_and_limit(
        &self,
        qb: &mut QueryBuilder<'_, Postgres>,
        sort: ResolvedSort,
        limit: i64,
        skip: i64,
    ) -> CoreResult<()> {
        let expr = self.sort_expr(sort.field)?;
        let direction = sort.direction.sql();

        qb.push(format!(
            " ORDER BY {} {}, {} {} LIMIT ",
            expr, direction, self.id, direction
        ));
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(skip);
        Ok(())
    }
}
