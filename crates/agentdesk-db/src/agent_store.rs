//! Agent queries against the `agents` table and its relations.
//!
//! Listing filters are assembled with [`QueryBuilder`]; every caller value
//! is bound as a parameter. Sort columns come from the
//! [`AgentSortField`](crate::filter::AgentSortField) allow-list and are the
//! only text spliced into the SQL.

use agentdesk_types::{
    Agent, AgentCounts, AgentId, AgentListItem, AgentPatch, Conversation, ConversationCounts,
    ConversationId, ConversationSummary, NewAgent, User, UserId,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DbError;
use crate::filter::{contains_pattern, AgentFilter, AgentSort, PageWindow};

/// Columns selected for every agent row, qualified by the `a` alias.
const AGENT_COLUMNS: &str = "a.id, a.name, a.display_name, a.description, a.avatar, a.model, \
     a.system_prompt, a.capabilities, a.is_active, a.created_at, a.updated_at";

/// Operations on the `agents` table.
pub struct AgentStore<'a> {
    pool: &'a PgPool,
}

impl<'a> AgentStore<'a> {
    /// Create a new agent store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Query a single agent by primary key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get(&self, id: AgentId) -> Result<Option<Agent>, DbError> {
        let row = sqlx::query_as::<_, AgentRow>(
            r"SELECT id, name, display_name, description, avatar, model, system_prompt,
                     capabilities, is_active, created_at, updated_at
              FROM agents
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Agent::from))
    }

    /// Query the conversations of an agent, most recently updated first,
    /// each joined with its user and message count.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn conversations(&self, id: AgentId) -> Result<Vec<ConversationSummary>, DbError> {
        let rows = sqlx::query_as::<_, ConversationRow>(
            r"SELECT c.id, c.agent_id, c.user_id, c.title, c.created_at, c.updated_at,
                     u.name AS user_name, u.email AS user_email, u.avatar AS user_avatar,
                     u.created_at AS user_created_at,
                     (SELECT COUNT(*) FROM messages m WHERE m.conversation_id = c.id) AS message_count
              FROM conversations c
              JOIN users u ON u.id = c.user_id
              WHERE c.agent_id = $1
              ORDER BY c.updated_at DESC",
        )
        .bind(id.into_inner())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ConversationSummary::from).collect())
    }

    /// Query one page of agents matching `filter`, with relation counts.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list(
        &self,
        filter: &AgentFilter,
        sort: AgentSort,
        window: PageWindow,
    ) -> Result<Vec<AgentListItem>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {AGENT_COLUMNS}, \
             (SELECT COUNT(*) FROM conversations c WHERE c.agent_id = a.id) AS conversation_count, \
             (SELECT COUNT(*) FROM messages m WHERE m.agent_id = a.id) AS message_count \
             FROM agents a"
        ));
        push_filter(&mut qb, filter);
        qb.push(format!(
            " ORDER BY a.{} {}, a.id",
            sort.field.column(),
            sort.order.as_sql()
        ));
        qb.push(" LIMIT ")
            .push_bind(window.limit_i64())
            .push(" OFFSET ")
            .push_bind(window.offset_i64());

        let rows = qb
            .build_query_as::<AgentListRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(AgentListItem::from).collect())
    }

    /// Count agents matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn count(&self, filter: &AgentFilter) -> Result<u64, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM agents a");
        push_filter(&mut qb, filter);

        let total = qb.build_query_scalar::<i64>().fetch_one(self.pool).await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    /// Insert a new agent. The ID is generated here (UUID v7); timestamps
    /// come from column defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::DuplicateName`] if the name is taken, or
    /// [`DbError::Postgres`] if the insert fails otherwise.
    pub async fn insert(&self, agent: &NewAgent) -> Result<Agent, DbError> {
        let row = sqlx::query_as::<_, AgentRow>(
            r"INSERT INTO agents
              (id, name, display_name, description, avatar, model, system_prompt, capabilities, is_active)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
              RETURNING id, name, display_name, description, avatar, model, system_prompt,
                        capabilities, is_active, created_at, updated_at",
        )
        .bind(AgentId::new().into_inner())
        .bind(&agent.name)
        .bind(&agent.display_name)
        .bind(&agent.description)
        .bind(&agent.avatar)
        .bind(&agent.model)
        .bind(&agent.system_prompt)
        .bind(&agent.capabilities)
        .bind(agent.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| name_conflict(e, &agent.name))?;

        Ok(Agent::from(row))
    }

    /// Apply the present fields of `patch` and bump `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::DuplicateName`] if the new name is taken, or
    /// [`DbError::Postgres`] if the update fails otherwise.
    pub async fn update(&self, id: AgentId, patch: &AgentPatch) -> Result<Option<Agent>, DbError> {
        let row = sqlx::query_as::<_, AgentRow>(
            r"UPDATE agents SET
                name = COALESCE($2, name),
                display_name = COALESCE($3, display_name),
                description = COALESCE($4, description),
                avatar = CASE WHEN $5 THEN $6 ELSE avatar END,
                model = COALESCE($7, model),
                system_prompt = COALESCE($8, system_prompt),
                capabilities = COALESCE($9, capabilities),
                is_active = COALESCE($10, is_active),
                updated_at = NOW()
              WHERE id = $1
              RETURNING id, name, display_name, description, avatar, model, system_prompt,
                        capabilities, is_active, created_at, updated_at",
        )
        .bind(id.into_inner())
        .bind(&patch.name)
        .bind(&patch.display_name)
        .bind(&patch.description)
        .bind(patch.avatar.is_some())
        .bind(patch.avatar.as_ref().and_then(Option::as_deref))
        .bind(&patch.model)
        .bind(&patch.system_prompt)
        .bind(&patch.capabilities)
        .bind(patch.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| name_conflict(e, patch.name.as_deref().unwrap_or_default()))?;

        Ok(row.map(Agent::from))
    }

    /// Delete an agent. Conversations, messages, and analytics go with it
    /// through `ON DELETE CASCADE`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete(&self, id: AgentId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM agents WHERE id = $1")
            .bind(id.into_inner())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Append the `WHERE` clause for `filter`.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &AgentFilter) {
    qb.push(" WHERE TRUE");
    if let Some(search) = &filter.search {
        let pattern = contains_pattern(search);
        qb.push(" AND (a.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR a.display_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR a.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(is_active) = filter.is_active {
        qb.push(" AND a.is_active = ").push_bind(is_active);
    }
}

/// A row from the `agents` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AgentRow {
    /// Primary key.
    pub id: Uuid,
    /// Machine name.
    pub name: String,
    /// Human-facing name.
    pub display_name: String,
    /// Description.
    pub description: String,
    /// Avatar URL.
    pub avatar: Option<String>,
    /// Model identifier.
    pub model: String,
    /// System prompt.
    pub system_prompt: String,
    /// Capability tags (`TEXT[]`).
    pub capabilities: Vec<String>,
    /// Activity flag.
    pub is_active: bool,
    /// Creation time.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Last modification time.
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<AgentRow> for Agent {
    fn from(row: AgentRow) -> Self {
        Self {
            id: AgentId::from(row.id),
            name: row.name,
            display_name: row.display_name,
            description: row.description,
            avatar: row.avatar,
            model: row.model,
            system_prompt: row.system_prompt,
            capabilities: row.capabilities,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// An agent row with its relation counts.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AgentListRow {
    /// The agent columns.
    #[sqlx(flatten)]
    pub agent: AgentRow,
    /// Number of conversations.
    pub conversation_count: i64,
    /// Number of messages.
    pub message_count: i64,
}

impl From<AgentListRow> for AgentListItem {
    fn from(row: AgentListRow) -> Self {
        Self {
            agent: Agent::from(row.agent),
            counts: AgentCounts {
                conversations: u64::try_from(row.conversation_count).unwrap_or(0),
                messages: u64::try_from(row.message_count).unwrap_or(0),
            },
        }
    }
}

/// A conversation joined with its user and message count.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConversationRow {
    /// Conversation primary key.
    pub id: Uuid,
    /// Owning agent.
    pub agent_id: Uuid,
    /// Participating user.
    pub user_id: Uuid,
    /// Optional title.
    pub title: Option<String>,
    /// Conversation creation time.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Conversation last activity.
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// User display name.
    pub user_name: String,
    /// User email.
    pub user_email: String,
    /// User avatar URL.
    pub user_avatar: Option<String>,
    /// User sign-up time.
    pub user_created_at: chrono::DateTime<chrono::Utc>,
    /// Messages in the conversation.
    pub message_count: i64,
}

impl From<ConversationRow> for ConversationSummary {
    fn from(row: ConversationRow) -> Self {
        let user_id = UserId::from(row.user_id);
        Self {
            conversation: Conversation {
                id: ConversationId::from(row.id),
                agent_id: AgentId::from(row.agent_id),
                user_id,
                title: row.title,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            user: User {
                id: user_id,
                name: row.user_name,
                email: row.user_email,
                avatar: row.user_avatar,
                created_at: row.user_created_at,
            },
            counts: ConversationCounts {
                messages: u64::try_from(row.message_count).unwrap_or(0),
            },
        }
    }
}

/// `agents.name` is the only unique column a write can collide on.
fn name_conflict(err: sqlx::Error, name: &str) -> DbError {
    let unique = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if unique {
        DbError::DuplicateName(name.to_owned())
    } else {
        DbError::Postgres(err)
    }
}
