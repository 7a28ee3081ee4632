//! Analytics queries against the append-only `chat_analytics` table.

use agentdesk_types::{AgentId, AgentRef, AnalyticsEntry, AnalyticsId, ChatAnalytics};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DbError;
use crate::filter::AnalyticsFilter;

/// Operations on the `chat_analytics` table.
pub struct AnalyticsStore<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalyticsStore<'a> {
    /// Create a new analytics store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Query analytics rows matching `filter`, newest date first, joined
    /// with the owning agent's identity.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list(
        &self,
        filter: &AnalyticsFilter,
        limit: u32,
    ) -> Result<Vec<AnalyticsEntry>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r"SELECT r.id, r.agent_id, r.date, r.total_conversations, r.total_messages,
                     r.avg_response_time_ms, r.satisfaction_score,
                     a.name AS agent_name, a.display_name AS agent_display_name
              FROM chat_analytics r
              JOIN agents a ON a.id = r.agent_id
              WHERE TRUE",
        );
        if let Some(agent_id) = filter.agent_id {
            qb.push(" AND r.agent_id = ").push_bind(agent_id.into_inner());
        }
        if let Some(range) = filter.date_range {
            qb.push(" AND r.date >= ")
                .push_bind(range.start)
                .push(" AND r.date <= ")
                .push_bind(range.end);
        }
        qb.push(" ORDER BY r.date DESC, r.id LIMIT ")
            .push_bind(i64::from(limit));

        let rows = qb
            .build_query_as::<AnalyticsRow>()
            .fetch_all(self.pool)
            .await?;

        tracing::debug!(count = rows.len(), "Fetched analytics rows");
        Ok(rows.into_iter().map(AnalyticsEntry::from).collect())
    }
}

/// A `chat_analytics` row joined with agent identity columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalyticsRow {
    /// Primary key.
    pub id: Uuid,
    /// Owning agent.
    pub agent_id: Uuid,
    /// Day covered.
    pub date: chrono::NaiveDate,
    /// Conversations started that day.
    pub total_conversations: i32,
    /// Messages exchanged that day.
    pub total_messages: i32,
    /// Mean response latency in milliseconds.
    pub avg_response_time_ms: Decimal,
    /// Mean user rating.
    pub satisfaction_score: Option<Decimal>,
    /// Agent machine name.
    pub agent_name: String,
    /// Agent display name.
    pub agent_display_name: String,
}

impl From<AnalyticsRow> for AnalyticsEntry {
    fn from(row: AnalyticsRow) -> Self {
        let agent_id = AgentId::from(row.agent_id);
        Self {
            analytics: ChatAnalytics {
                id: AnalyticsId::from(row.id),
                agent_id,
                date: row.date,
                total_conversations: u32::try_from(row.total_conversations).unwrap_or(0),
                total_messages: u32::try_from(row.total_messages).unwrap_or(0),
                avg_response_time_ms: row.avg_response_time_ms,
                satisfaction_score: row.satisfaction_score,
            },
            agent: AgentRef {
                id: agent_id,
                name: row.agent_name,
                display_name: row.agent_display_name,
            },
        }
    }
}
