//! Log queries against the `logs` table.

use agentdesk_types::{Log, LogId, LogStatus};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DbError;
use crate::filter::{LogFilter, LogSort, PageWindow};

/// Operations on the `logs` table.
pub struct LogStore<'a> {
    pool: &'a PgPool,
}

impl<'a> LogStore<'a> {
    /// Create a new log store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Query one page of logs matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::Decode`] if a stored status is not a known [`LogStatus`].
    pub async fn list(
        &self,
        filter: &LogFilter,
        sort: LogSort,
        window: PageWindow,
    ) -> Result<Vec<Log>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, event, message, status, created_at, updated_at FROM logs",
        );
        push_filter(&mut qb, filter);
        qb.push(format!(
            " ORDER BY {} {}, id",
            sort.field.column(),
            sort.order.as_sql()
        ));
        qb.push(" LIMIT ")
            .push_bind(window.limit_i64())
            .push(" OFFSET ")
            .push_bind(window.offset_i64());

        let rows = qb.build_query_as::<LogRow>().fetch_all(self.pool).await?;

        rows.into_iter().map(Log::try_from).collect()
    }

    /// Count logs matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn count(&self, filter: &LogFilter) -> Result<u64, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM logs");
        push_filter(&mut qb, filter);

        let total = qb.build_query_scalar::<i64>().fetch_one(self.pool).await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &LogFilter) {
    if let Some(status) = filter.status {
        qb.push(" WHERE status = ").push_bind(status.as_str());
    }
}

/// A row from the `logs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LogRow {
    /// Primary key.
    pub id: Uuid,
    /// Event name.
    pub event: String,
    /// Detail message.
    pub message: String,
    /// Status as stored (`TEXT`).
    pub status: String,
    /// Creation time.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Last modification time.
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<LogRow> for Log {
    type Error = DbError;

    fn try_from(row: LogRow) -> Result<Self, Self::Error> {
        let status: LogStatus = row
            .status
            .parse()
            .map_err(|e| DbError::Decode(format!("log {}: {e}", row.id)))?;
        Ok(Self {
            id: LogId::from(row.id),
            event: row.event,
            message: row.message,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
