//! Record structs served by the AgentDesk API.
//!
//! Field names are serialized in camelCase. Derived relation counts are
//! nested under a `_count` key so dashboard clients can read
//! `agent._count.conversations` without a second request.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::LogStatus;
use crate::ids::{AgentId, AnalyticsId, ConversationId, LogId, MessageId, UserId};

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// A configured chat agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Agent {
    /// Primary key.
    pub id: AgentId,
    /// Unique machine name (e.g. `support-bot`).
    pub name: String,
    /// Human-facing name shown in the dashboard.
    pub display_name: String,
    /// Free-form description.
    pub description: String,
    /// Avatar image URL.
    pub avatar: Option<String>,
    /// Model identifier the agent runs on.
    pub model: String,
    /// System prompt prepended to every conversation.
    pub system_prompt: String,
    /// Ordered list of capability tags.
    pub capabilities: Vec<String>,
    /// Whether the agent accepts new conversations.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Relation counts attached to an agent listing row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentCounts {
    /// Number of conversations held by the agent.
    pub conversations: u64,
    /// Number of messages across all of the agent's conversations.
    pub messages: u64,
}

/// One row of the paginated agent listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentListItem {
    /// The agent record.
    #[serde(flatten)]
    pub agent: Agent,
    /// Derived relation counts.
    #[serde(rename = "_count")]
    pub counts: AgentCounts,
}

/// Full agent view: the record plus its conversations and recent analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentDetail {
    /// The agent record.
    #[serde(flatten)]
    pub agent: Agent,
    /// Conversations, most recently updated first.
    pub conversations: Vec<ConversationSummary>,
    /// Most recent analytics rows, newest date first.
    pub analytics: Vec<ChatAnalytics>,
}

/// Identity fields of an agent, embedded in analytics rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AgentRef {
    /// Primary key.
    pub id: AgentId,
    /// Machine name.
    pub name: String,
    /// Human-facing name.
    pub display_name: String,
}

impl From<&Agent> for AgentRef {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id,
            name: agent.name.clone(),
            display_name: agent.display_name.clone(),
        }
    }
}

/// Fields accepted when creating an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct NewAgent {
    /// Machine name.
    pub name: String,
    /// Human-facing name.
    pub display_name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar: Option<String>,
    /// Model identifier.
    pub model: String,
    /// System prompt.
    #[serde(default)]
    pub system_prompt: String,
    /// Capability tags.
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Whether the agent starts active.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

/// Deserialize a nullable field that may also be absent.
///
/// Pair with `#[serde(default)]`: an absent key stays `None`, an explicit
/// `null` becomes `Some(None)`, and a value becomes `Some(Some(v))`.
pub fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update of an agent. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AgentPatch {
    /// New machine name.
    pub name: Option<String>,
    /// New human-facing name.
    pub display_name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New avatar URL. `Some(None)` clears it.
    #[serde(
        default,
        deserialize_with = "deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(optional)]
    pub avatar: Option<Option<String>>,
    /// New model identifier.
    pub model: Option<String>,
    /// New system prompt.
    pub system_prompt: Option<String>,
    /// Replacement capability list.
    pub capabilities: Option<Vec<String>>,
    /// New activity flag.
    pub is_active: Option<bool>,
}

impl AgentPatch {
    /// Apply the present fields onto `agent` and bump `updated_at`.
    pub fn apply_to(&self, agent: &mut Agent, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            agent.name.clone_from(name);
        }
        if let Some(display_name) = &self.display_name {
            agent.display_name.clone_from(display_name);
        }
        if let Some(description) = &self.description {
            agent.description.clone_from(description);
        }
        if let Some(avatar) = &self.avatar {
            agent.avatar.clone_from(avatar);
        }
        if let Some(model) = &self.model {
            agent.model.clone_from(model);
        }
        if let Some(system_prompt) = &self.system_prompt {
            agent.system_prompt.clone_from(system_prompt);
        }
        if let Some(capabilities) = &self.capabilities {
            agent.capabilities.clone_from(capabilities);
        }
        if let Some(is_active) = self.is_active {
            agent.is_active = is_active;
        }
        agent.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// Users, conversations, messages
// ---------------------------------------------------------------------------

/// An end user who talks to agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct User {
    /// Primary key.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Avatar image URL.
    pub avatar: Option<String>,
    /// Sign-up time.
    pub created_at: DateTime<Utc>,
}

/// A conversation between one user and one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Conversation {
    /// Primary key.
    pub id: ConversationId,
    /// Owning agent.
    pub agent_id: AgentId,
    /// Participating user.
    pub user_id: UserId,
    /// Optional title.
    pub title: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the latest activity.
    pub updated_at: DateTime<Utc>,
}

/// Message count nested under `_count` on a conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConversationCounts {
    /// Number of messages in the conversation.
    pub messages: u64,
}

/// A conversation with its user and message count, as embedded in
/// [`AgentDetail`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConversationSummary {
    /// The conversation record.
    #[serde(flatten)]
    pub conversation: Conversation,
    /// The participating user.
    pub user: User,
    /// Derived counts.
    #[serde(rename = "_count")]
    pub counts: ConversationCounts,
}

/// A single chat message. Only counted by the API, never listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Message {
    /// Primary key.
    pub id: MessageId,
    /// Conversation the message belongs to.
    pub conversation_id: ConversationId,
    /// Agent that owns the conversation.
    pub agent_id: AgentId,
    /// Author role (`user`, `assistant`, `system`).
    pub role: String,
    /// Message body.
    pub content: String,
    /// Send time.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Daily usage metrics for one agent. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ChatAnalytics {
    /// Primary key.
    pub id: AnalyticsId,
    /// Agent the metrics belong to.
    pub agent_id: AgentId,
    /// The day these metrics cover.
    pub date: NaiveDate,
    /// Conversations started that day.
    pub total_conversations: u32,
    /// Messages exchanged that day.
    pub total_messages: u32,
    /// Mean response latency in milliseconds.
    #[ts(as = "String")]
    pub avg_response_time_ms: Decimal,
    /// Mean user rating (1.0 to 5.0), when any ratings were given.
    #[ts(as = "Option<String>")]
    pub satisfaction_score: Option<Decimal>,
}

/// An analytics row joined with its agent's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AnalyticsEntry {
    /// The analytics record.
    #[serde(flatten)]
    pub analytics: ChatAnalytics,
    /// The owning agent.
    pub agent: AgentRef,
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

/// A standalone activity log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Log {
    /// Primary key.
    pub id: LogId,
    /// Short event name (e.g. `agent.deployed`).
    pub event: String,
    /// Human-readable detail.
    pub message: String,
    /// Outcome of the logged operation.
    pub status: LogStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_agent() -> Agent {
        let now = Utc::now();
        Agent {
            id: AgentId::new(),
            name: String::from("support-bot"),
            display_name: String::from("Support Bot"),
            description: String::from("Answers billing questions"),
            avatar: None,
            model: String::from("gpt-4o-mini"),
            system_prompt: String::from("You are helpful."),
            capabilities: vec![String::from("billing"), String::from("refunds")],
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn agent_serializes_camel_case() {
        let json = serde_json::to_value(sample_agent()).unwrap_or_default();
        assert_eq!(json["displayName"], "Support Bot");
        assert_eq!(json["isActive"], true);
        assert_eq!(json["capabilities"][1], "refunds");
        assert!(json.get("display_name").is_none());
    }

    #[test]
    fn list_item_flattens_agent_and_nests_counts() {
        let item = AgentListItem {
            agent: sample_agent(),
            counts: AgentCounts {
                conversations: 3,
                messages: 42,
            },
        };
        let json = serde_json::to_value(&item).unwrap_or_default();
        assert_eq!(json["name"], "support-bot");
        assert_eq!(json["_count"]["conversations"], 3);
        assert_eq!(json["_count"]["messages"], 42);
    }

    #[test]
    fn new_agent_defaults_optional_fields() {
        let body = r#"{"name":"a","displayName":"A","model":"m"}"#;
        let parsed: Result<NewAgent, _> = serde_json::from_str(body);
        let parsed = parsed.ok();
        assert!(parsed.as_ref().is_some_and(|a| a.is_active));
        assert!(parsed.as_ref().is_some_and(|a| a.capabilities.is_empty()));
        assert!(parsed.is_some_and(|a| a.description.is_empty()));
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut agent = sample_agent();
        let before = agent.clone();
        let later = before.updated_at + chrono::Duration::seconds(5);
        let patch = AgentPatch {
            display_name: Some(String::from("Billing Bot")),
            is_active: Some(false),
            ..AgentPatch::default()
        };
        patch.apply_to(&mut agent, later);

        assert_eq!(agent.display_name, "Billing Bot");
        assert!(!agent.is_active);
        assert_eq!(agent.name, before.name);
        assert_eq!(agent.capabilities, before.capabilities);
        assert_eq!(agent.created_at, before.created_at);
        assert_eq!(agent.updated_at, later);
    }

    #[test]
    fn patch_distinguishes_null_avatar_from_absent() {
        let absent: Option<AgentPatch> = serde_json::from_str("{}").ok();
        assert_eq!(absent.map(|p| p.avatar), Some(None));

        let cleared: Option<AgentPatch> = serde_json::from_str(r#"{"avatar":null}"#).ok();
        assert_eq!(cleared.map(|p| p.avatar), Some(Some(None)));

        let set: Option<AgentPatch> = serde_json::from_str(r#"{"avatar":"/a.png"}"#).ok();
        assert_eq!(
            set.map(|p| p.avatar),
            Some(Some(Some(String::from("/a.png"))))
        );
    }

    #[test]
    fn patch_with_null_avatar_clears_it() {
        let mut agent = sample_agent();
        agent.avatar = Some(String::from("/old.png"));

        let keep = AgentPatch::default();
        keep.apply_to(&mut agent, Utc::now());
        assert_eq!(agent.avatar.as_deref(), Some("/old.png"));

        let clear = AgentPatch {
            avatar: Some(None),
            ..AgentPatch::default()
        };
        clear.apply_to(&mut agent, Utc::now());
        assert_eq!(agent.avatar, None);
    }
}
