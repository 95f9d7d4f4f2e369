//! Postgres-backed record store.
//!
//! Rows live in `inventory_records`. Placement filters are evaluated in SQL
//! with the same predicates the domain classifier uses:
//!
//! | State    | Predicate |
//! |----------|-----------|
//! | placed   | `kolvo > 0 AND wr_shk <> '' AND wr_name <> ''` (both non-null) |
//! | unplaced | `kolvo = 0 AND COALESCE(wr_shk, '') = '' AND COALESCE(wr_name, '') = ''` |
//!
//! Mutations that follow a lookup carry the observed quantity in their
//! `WHERE` clause, so a concurrent change makes them affect zero rows.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use x3pl_core::RecordId;
use x3pl_inventory::{
    InventoryCorrection, InventoryRecord, LikeSearch, NewRecord, PageRequest, Placement,
    PlacementUpdate, RecordIdentity,
};

use super::r#trait::{LookupOrder, RecordFilter, RecordStore, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS inventory_records (
    id          BIGSERIAL PRIMARY KEY,
    shk         TEXT NOT NULL,
    name        TEXT NOT NULL,
    wr_shk      TEXT,
    wr_name     TEXT,
    kolvo       BIGINT NOT NULL CHECK (kolvo >= 0),
    condition   TEXT,
    reason      TEXT,
    ispolnitel  TEXT,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ
);
CREATE INDEX IF NOT EXISTS inventory_records_identity_idx
    ON inventory_records (shk, wr_shk, condition);
CREATE INDEX IF NOT EXISTS inventory_records_created_at_idx
    ON inventory_records (created_at);
"#;

const COLUMNS: &str =
    "id, shk, name, wr_shk, wr_name, kolvo, condition, reason, ispolnitel, created_at, updated_at";

const PLACED: &str =
    "kolvo > 0 AND wr_shk IS NOT NULL AND wr_shk <> '' AND wr_name IS NOT NULL AND wr_name <> ''";
const UNPLACED: &str =
    "kolvo = 0 AND COALESCE(wr_shk, '') = '' AND COALESCE(wr_name, '') = ''";

/// Postgres-backed inventory record store.
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: Arc<PgPool>,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the records table and its indexes if they are missing.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    async fn fetch_many(
        &self,
        operation: &'static str,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> Result<Vec<InventoryRecord>, StoreError> {
        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;

        rows.iter().map(|row| decode(operation, row)).collect()
    }

    async fn list_like(&self, search: &LikeSearch) -> Result<Vec<InventoryRecord>, StoreError> {
        let fields = [
            ("wr_name", &search.cell_name),
            ("wr_shk", &search.cell_barcode),
            ("shk", &search.product_barcode),
            ("name", &search.product_name),
        ];

        let mut clauses = Vec::new();
        let mut patterns = Vec::new();
        for (column, needle) in fields {
            if let Some(needle) = needle {
                patterns.push(format!("%{}%", escape_like(needle)));
                clauses.push(format!("{column} ILIKE ${} ESCAPE '\\'", patterns.len()));
            }
        }
        if clauses.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {COLUMNS} FROM inventory_records WHERE {} ORDER BY created_at DESC, id DESC",
            clauses.join(" OR ")
        );
        let mut query = sqlx::query(&sql);
        for pattern in &patterns {
            query = query.bind(pattern);
        }
        self.fetch_many("list_like", query).await
    }
}

#[async_trait::async_trait]
impl RecordStore for PostgresRecordStore {
    #[instrument(skip(self, record), fields(shk = %record.product_barcode), err)]
    async fn insert(&self, record: NewRecord) -> Result<InventoryRecord, StoreError> {
        let sql = format!(
            "INSERT INTO inventory_records \
             (shk, name, wr_shk, wr_name, kolvo, condition, reason, ispolnitel, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&record.product_barcode)
            .bind(&record.product_name)
            .bind(&record.cell_barcode)
            .bind(&record.cell_name)
            .bind(record.quantity)
            .bind(&record.condition)
            .bind(&record.reason)
            .bind(&record.executor)
            .bind(record.created_at)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;

        decode("insert", &row)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn get(&self, id: RecordId) -> Result<Option<InventoryRecord>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM inventory_records WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.map(|r| decode("get", &r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_identity(
        &self,
        identity: RecordIdentity<'_>,
        min_quantity: Option<i64>,
        order: LookupOrder,
    ) -> Result<Option<InventoryRecord>, StoreError> {
        let direction = match order {
            LookupOrder::OldestFirst => "ASC",
            LookupOrder::NewestFirst => "DESC",
        };
        let sql = format!(
            "SELECT {COLUMNS} FROM inventory_records \
             WHERE shk = $1 AND wr_shk = $2 AND condition = $3 \
               AND ($4::BIGINT IS NULL OR kolvo >= $4) \
             ORDER BY created_at {direction}, id {direction} \
             LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .bind(identity.product_barcode)
            .bind(identity.cell_barcode)
            .bind(identity.condition)
            .bind(min_quantity)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_identity", e))?;

        row.map(|r| decode("find_by_identity", &r)).transpose()
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn delete(
        &self,
        id: RecordId,
        expected_quantity: Option<i64>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "DELETE FROM inventory_records WHERE id = $1 AND ($2::BIGINT IS NULL OR kolvo = $2)",
        )
        .bind(id.get())
        .bind(expected_quantity)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn set_quantity(
        &self,
        id: RecordId,
        expected_quantity: i64,
        new_quantity: i64,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE inventory_records SET kolvo = $3, updated_at = $4 WHERE id = $1 AND kolvo = $2",
        )
        .bind(id.get())
        .bind(expected_quantity)
        .bind(new_quantity)
        .bind(at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("set_quantity", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, correction), fields(id = %id), err)]
    async fn apply_correction(
        &self,
        id: RecordId,
        correction: &InventoryCorrection,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE inventory_records \
             SET kolvo = $2, condition = $3, reason = $4, updated_at = $5 \
             WHERE id = $1",
        )
        .bind(id.get())
        .bind(correction.quantity)
        .bind(&correction.condition)
        .bind(&correction.reason)
        .bind(at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("apply_correction", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, update), fields(id = %id, wr_shk = %update.cell_barcode), err)]
    async fn apply_placement(
        &self,
        id: RecordId,
        update: &PlacementUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<InventoryRecord>, StoreError> {
        let sql = format!(
            "UPDATE inventory_records SET \
                wr_shk = $2, wr_name = $3, kolvo = $4, \
                ispolnitel = COALESCE($5, ispolnitel), \
                condition = COALESCE($6, condition), \
                reason = COALESCE($7, reason), \
                updated_at = $8 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id.get())
            .bind(&update.cell_barcode)
            .bind(&update.cell_name)
            .bind(update.quantity)
            .bind(&update.executor)
            .bind(&update.condition)
            .bind(&update.reason)
            .bind(at)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("apply_placement", e))?;

        row.map(|r| decode("apply_placement", &r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self, filter: RecordFilter<'_>) -> Result<Vec<InventoryRecord>, StoreError> {
        match filter {
            RecordFilter::Placement(placement) => {
                let predicate = match placement {
                    Placement::Placed => PLACED,
                    Placement::Unplaced => UNPLACED,
                };
                let sql = format!(
                    "SELECT {COLUMNS} FROM inventory_records WHERE {predicate} \
                     ORDER BY created_at DESC, id DESC"
                );
                self.fetch_many("list_placement", sqlx::query(&sql)).await
            }
            RecordFilter::Cell(cell) => {
                let sql = format!(
                    "SELECT {COLUMNS} FROM inventory_records WHERE wr_shk = $1 \
                     ORDER BY created_at DESC, id DESC"
                );
                self.fetch_many("list_cell", sqlx::query(&sql).bind(cell)).await
            }
            RecordFilter::Like(search) => self.list_like(search).await,
        }
    }

    #[instrument(skip(self), err)]
    async fn page(&self, page: PageRequest) -> Result<Vec<InventoryRecord>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM inventory_records \
             ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        self.fetch_many("page", sqlx::query(&sql).bind(page.limit).bind(page.offset))
            .await
    }

    #[instrument(skip(self), err)]
    async fn count(&self) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM inventory_records")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count", e))?;

        row.try_get::<i64, _>("total")
            .map_err(|e| StoreError::Decode {
                operation: "count",
                message: e.to_string(),
            })
    }
}

/// Escape `LIKE` metacharacters so needles match literally.
fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn decode(
    operation: &'static str,
    row: &sqlx::postgres::PgRow,
) -> Result<InventoryRecord, StoreError> {
    RecordRow::from_row(row)
        .map(Into::into)
        .map_err(|e| StoreError::Decode {
            operation,
            message: e.to_string(),
        })
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Database {
            operation,
            message: match db_err.code() {
                Some(code) => format!("{} (code {})", db_err.message(), code),
                None => db_err.message().to_string(),
            },
        },
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("timed out acquiring a connection in {operation}"))
        }
        other => StoreError::Database {
            operation,
            message: other.to_string(),
        },
    }
}

struct RecordRow {
    id: i64,
    shk: String,
    name: String,
    wr_shk: Option<String>,
    wr_name: Option<String>,
    kolvo: i64,
    condition: Option<String>,
    reason: Option<String>,
    ispolnitel: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for RecordRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(RecordRow {
            id: row.try_get("id")?,
            shk: row.try_get("shk")?,
            name: row.try_get("name")?,
            wr_shk: row.try_get("wr_shk")?,
            wr_name: row.try_get("wr_name")?,
            kolvo: row.try_get("kolvo")?,
            condition: row.try_get("condition")?,
            reason: row.try_get("reason")?,
            ispolnitel: row.try_get("ispolnitel")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<RecordRow> for InventoryRecord {
    fn from(row: RecordRow) -> Self {
        InventoryRecord {
            id: RecordId::new(row.id),
            product_barcode: row.shk,
            product_name: row.name,
            cell_barcode: row.wr_shk,
            cell_name: row.wr_name,
            quantity: row.kolvo,
            condition: row.condition,
            reason: row.reason,
            executor: row.ispolnitel,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("shelf"), "shelf");
    }
}
