//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every record has a strongly-typed ID so an agent id can never be passed
//! where a log id is expected. New IDs use UUID v7 (time-ordered) for
//! efficient B-tree indexing in `PostgreSQL`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a configured chat agent.
    AgentId
}

define_id! {
    /// Unique identifier for an end user talking to agents.
    UserId
}

define_id! {
    /// Unique identifier for a conversation between a user and an agent.
    ConversationId
}

define_id! {
    /// Unique identifier for a single chat message.
    MessageId
}

define_id! {
    /// Unique identifier for a daily analytics row.
    AnalyticsId
}

define_id! {
    /// Unique identifier for an activity log record.
    LogId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let agent = AgentId::new();
        let log = LogId::new();
        assert_ne!(agent.into_inner(), Uuid::nil());
        assert_ne!(log.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_serializes_as_bare_string() {
        let id = AgentId::new();
        let json = serde_json::to_value(id).ok();
        assert_eq!(json, Some(serde_json::Value::String(id.to_string())));
    }

    #[test]
    fn id_parses_from_str() {
        let id = AgentId::new();
        let parsed: Result<AgentId, _> = id.to_string().parse();
        assert_eq!(parsed.ok(), Some(id));
        assert!("not-a-uuid".parse::<AgentId>().is_err());
    }
}
