//! In-process [`Store`] backed by vectors behind a [`RwLock`].
//!
//! Evaluates the same [`crate::filter`] descriptions as the `PostgreSQL`
//! backend, so handler and query tests can run without a database. The
//! `push_*` helpers seed relations that the API itself never writes.

use std::sync::Arc;

use agentdesk_types::{
    Agent, AgentCounts, AgentDetail, AgentId, AgentListItem, AgentPatch, AgentRef,
    AnalyticsEntry, AnalyticsId, ChatAnalytics, Conversation, ConversationCounts,
    ConversationId, ConversationSummary, Log, LogId, LogStatus, Message, MessageId, NewAgent,
    User, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::error::DbError;
use crate::filter::{AgentFilter, AgentSort, AnalyticsFilter, LogFilter, LogSort, PageWindow};
use crate::queries::AGENT_DETAIL_ANALYTICS;
use crate::store::Store;

#[derive(Debug, Default)]
struct Tables {
    agents: Vec<Agent>,
    users: Vec<User>,
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    analytics: Vec<ChatAnalytics>,
    logs: Vec<Log>,
}

impl Tables {
    fn counts_for(&self, agent_id: AgentId) -> AgentCounts {
        AgentCounts {
            conversations: count(self.conversations.iter().filter(|c| c.agent_id == agent_id)),
            messages: count(self.messages.iter().filter(|m| m.agent_id == agent_id)),
        }
    }

    fn conversation_summaries(&self, agent_id: AgentId) -> Vec<ConversationSummary> {
        let mut conversations: Vec<&Conversation> = self
            .conversations
            .iter()
            .filter(|c| c.agent_id == agent_id)
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        conversations
            .into_iter()
            .filter_map(|conversation| {
                let user = self.users.iter().find(|u| u.id == conversation.user_id)?;
                Some(ConversationSummary {
                    conversation: conversation.clone(),
                    user: user.clone(),
                    counts: ConversationCounts {
                        messages: count(
                            self.messages
                                .iter()
                                .filter(|m| m.conversation_id == conversation.id),
                        ),
                    },
                })
            })
            .collect()
    }

    fn recent_analytics(&self, filter: &AnalyticsFilter, limit: u32) -> Vec<&ChatAnalytics> {
        let mut rows: Vec<&ChatAnalytics> =
            self.analytics.iter().filter(|r| filter.matches(r)).collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        rows
    }
}

fn count<I: Iterator>(iter: I) -> u64 {
    u64::try_from(iter.count()).unwrap_or(u64::MAX)
}

/// In-memory store. Cloning shares the underlying tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// IDs of all agents in insertion order.
    pub async fn agent_ids(&self) -> Vec<AgentId> {
        self.tables.read().await.agents.iter().map(|a| a.id).collect()
    }

    /// Overwrite both timestamps of an agent. Used to get a deterministic
    /// creation order in tests.
    pub async fn set_agent_timestamps(&self, id: AgentId, at: DateTime<Utc>) {
        let mut tables = self.tables.write().await;
        if let Some(agent) = tables.agents.iter_mut().find(|a| a.id == id) {
            agent.created_at = at;
            agent.updated_at = at;
        }
    }

    /// Add a user.
    pub async fn push_user(&self, name: &str, email: &str) -> UserId {
        let user = User {
            id: UserId::new(),
            name: name.to_owned(),
            email: email.to_owned(),
            avatar: None,
            created_at: Utc::now(),
        };
        let id = user.id;
        self.tables.write().await.users.push(user);
        id
    }

    /// Add a conversation last active at `updated_at`.
    pub async fn push_conversation(
        &self,
        agent_id: AgentId,
        user_id: UserId,
        updated_at: DateTime<Utc>,
    ) -> ConversationId {
        let conversation = Conversation {
            id: ConversationId::new(),
            agent_id,
            user_id,
            title: None,
            created_at: updated_at,
            updated_at,
        };
        let id = conversation.id;
        self.tables.write().await.conversations.push(conversation);
        id
    }

    /// Add a message to a conversation. Does nothing if the conversation
    /// does not exist.
    pub async fn push_message(&self, conversation_id: ConversationId, role: &str, content: &str) {
        let mut tables = self.tables.write().await;
        let Some(agent_id) = tables
            .conversations
            .iter()
            .find(|c| c.id == conversation_id)
            .map(|c| c.agent_id)
        else {
            return;
        };
        tables.messages.push(Message {
            id: MessageId::new(),
            conversation_id,
            agent_id,
            role: role.to_owned(),
            content: content.to_owned(),
            created_at: Utc::now(),
        });
    }

    /// Add a daily analytics row.
    pub async fn push_analytics(
        &self,
        agent_id: AgentId,
        date: NaiveDate,
        total_conversations: u32,
        total_messages: u32,
    ) -> AnalyticsId {
        let row = ChatAnalytics {
            id: AnalyticsId::new(),
            agent_id,
            date,
            total_conversations,
            total_messages,
            avg_response_time_ms: Decimal::new(1250, 1),
            satisfaction_score: None,
        };
        let id = row.id;
        self.tables.write().await.analytics.push(row);
        id
    }

    /// Add a log record stamped with the current time.
    pub async fn push_log(&self, event: &str, message: &str, status: LogStatus) -> LogId {
        let now = Utc::now();
        let log = Log {
            id: LogId::new(),
            event: event.to_owned(),
            message: message.to_owned(),
            status,
            created_at: now,
            updated_at: now,
        };
        let id = log.id;
        self.tables.write().await.logs.push(log);
        id
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_agent(&self, id: AgentId) -> Result<Option<AgentDetail>, DbError> {
        let tables = self.tables.read().await;
        let Some(agent) = tables.agents.iter().find(|a| a.id == id) else {
            return Ok(None);
        };
        let analytics_filter = AnalyticsFilter {
            agent_id: Some(id),
            date_range: None,
        };
        Ok(Some(AgentDetail {
            agent: agent.clone(),
            conversations: tables.conversation_summaries(id),
            analytics: tables
                .recent_analytics(&analytics_filter, AGENT_DETAIL_ANALYTICS)
                .into_iter()
                .cloned()
                .collect(),
        }))
    }

    async fn find_agents(
        &self,
        filter: &AgentFilter,
        sort: AgentSort,
        window: PageWindow,
    ) -> Result<Vec<AgentListItem>, DbError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<&Agent> = tables.agents.iter().filter(|a| filter.matches(a)).collect();
        matching.sort_by(|a, b| sort.compare(a, b));

        Ok(window
            .slice(&matching)
            .into_iter()
            .map(|agent| AgentListItem {
                agent: agent.clone(),
                counts: tables.counts_for(agent.id),
            })
            .collect())
    }

    async fn count_agents(&self, filter: &AgentFilter) -> Result<u64, DbError> {
        let tables = self.tables.read().await;
        Ok(count(tables.agents.iter().filter(|a| filter.matches(a))))
    }

    async fn insert_agent(&self, agent: &NewAgent) -> Result<Agent, DbError> {
        let mut tables = self.tables.write().await;
        if tables.agents.iter().any(|a| a.name == agent.name) {
            return Err(DbError::DuplicateName(agent.name.clone()));
        }

        let now = Utc::now();
        let created = Agent {
            id: AgentId::new(),
            name: agent.name.clone(),
            display_name: agent.display_name.clone(),
            description: agent.description.clone(),
            avatar: agent.avatar.clone(),
            model: agent.model.clone(),
            system_prompt: agent.system_prompt.clone(),
            capabilities: agent.capabilities.clone(),
            is_active: agent.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.agents.push(created.clone());
        Ok(created)
    }

    async fn update_agent(
        &self,
        id: AgentId,
        patch: &AgentPatch,
    ) -> Result<Option<Agent>, DbError> {
        let mut tables = self.tables.write().await;
        if let Some(name) = &patch.name
            && tables.agents.iter().any(|a| a.id != id && &a.name == name)
        {
            return Err(DbError::DuplicateName(name.clone()));
        }
        Ok(tables.agents.iter_mut().find(|a| a.id == id).map(|agent| {
            patch.apply_to(agent, Utc::now());
            agent.clone()
        }))
    }

    async fn delete_agent(&self, id: AgentId) -> Result<bool, DbError> {
        let mut tables = self.tables.write().await;
        let before = tables.agents.len();
        tables.agents.retain(|a| a.id != id);
        if tables.agents.len() == before {
            return Ok(false);
        }

        // Cascade like the foreign keys do.
        let removed: Vec<ConversationId> = tables
            .conversations
            .iter()
            .filter(|c| c.agent_id == id)
            .map(|c| c.id)
            .collect();
        tables.conversations.retain(|c| c.agent_id != id);
        tables
            .messages
            .retain(|m| m.agent_id != id && !removed.contains(&m.conversation_id));
        tables.analytics.retain(|r| r.agent_id != id);
        Ok(true)
    }

    async fn find_analytics(
        &self,
        filter: &AnalyticsFilter,
        limit: u32,
    ) -> Result<Vec<AnalyticsEntry>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .recent_analytics(filter, limit)
            .into_iter()
            .filter_map(|row| {
                let agent = tables.agents.iter().find(|a| a.id == row.agent_id)?;
                Some(AnalyticsEntry {
                    analytics: row.clone(),
                    agent: AgentRef::from(agent),
                })
            })
            .collect())
    }

    async fn find_logs(
        &self,
        filter: &LogFilter,
        sort: LogSort,
        window: PageWindow,
    ) -> Result<Vec<Log>, DbError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<&Log> = tables.logs.iter().filter(|l| filter.matches(l)).collect();
        matching.sort_by(|a, b| sort.compare(a, b));
        Ok(window.slice(&matching).into_iter().cloned().collect())
    }

    async fn count_logs(&self, filter: &LogFilter) -> Result<u64, DbError> {
        let tables = self.tables.read().await;
        Ok(count(tables.logs.iter().filter(|l| filter.matches(l))))
    }
}
