//! Shared record types for the AgentDesk API.
//!
//! This crate is the single source of truth for the records the API reads
//! and writes. Types flow downstream to `TypeScript` via `ts-rs` for the
//! dashboard front end.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all record identifiers
//! - [`enums`] -- Enumeration types (log status)
//! - [`structs`] -- Agents, users, conversations, analytics, and logs

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{LogStatus, UnknownLogStatus};
pub use ids::{AgentId, AnalyticsId, ConversationId, LogId, MessageId, UserId};
pub use structs::{
    Agent, AgentCounts, AgentDetail, AgentListItem, AgentPatch, AgentRef, AnalyticsEntry,
    ChatAnalytics, Conversation, ConversationCounts, ConversationSummary, Log, Message, NewAgent,
    User, deserialize_nullable,
};
