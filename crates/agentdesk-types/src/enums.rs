//! Enumeration types for AgentDesk records.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Log status
// ---------------------------------------------------------------------------

/// Outcome recorded on an activity [`Log`](crate::structs::Log).
///
/// Stored as `TEXT` in `PostgreSQL` and serialized in upper case on the
/// wire (`"SUCCESS"`, `"ERROR"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum LogStatus {
    /// The logged operation completed.
    Success,
    /// The logged operation failed.
    Error,
    /// The operation completed with a recoverable problem.
    Warning,
    /// The operation has not finished yet.
    Pending,
}

impl LogStatus {
    /// All statuses, in declaration order.
    pub const ALL: [Self; 4] = [Self::Success, Self::Error, Self::Warning, Self::Pending];

    /// The canonical upper-case name, as stored and serialized.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Pending => "PENDING",
        }
    }
}

impl core::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known [`LogStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLogStatus(pub String);

impl core::fmt::Display for UnknownLogStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown log status: {}", self.0)
    }
}

impl std::error::Error for UnknownLogStatus {}

impl FromStr for LogStatus {
    type Err = UnknownLogStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownLogStatus(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_status_wire_format_is_upper_case() {
        let json = serde_json::to_string(&LogStatus::Warning).ok();
        assert_eq!(json.as_deref(), Some("\"WARNING\""));
    }

    #[test]
    fn log_status_parses_canonical_names_only() {
        assert_eq!("ERROR".parse::<LogStatus>().ok(), Some(LogStatus::Error));
        assert_eq!("PENDING".parse::<LogStatus>().ok(), Some(LogStatus::Pending));
        assert!("error".parse::<LogStatus>().is_err());
        assert!("ALL".parse::<LogStatus>().is_err());
    }

    #[test]
    fn display_matches_as_str() {
        for status in LogStatus::ALL {
            assert_eq!(status.to_string(), status.as_str());
        }
    }
}
