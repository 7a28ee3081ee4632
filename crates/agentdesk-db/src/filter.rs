//! Typed filter, sort, and paging descriptions for listing queries.
//!
//! Every optional field means "apply this constraint when present". The
//! structs are built from request parameters by the functions in
//! [`crate::queries`] and consumed by both [`crate::PostgresPool`] (which
//! renders them to SQL) and [`crate::MemoryStore`] (which evaluates them
//! in process).

use std::cmp::Ordering;

use agentdesk_types::{Agent, AgentId, ChatAnalytics, Log, LogStatus};
use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Sort order
// ---------------------------------------------------------------------------

/// Direction of an `ORDER BY` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest first.
    Asc,
    /// Largest first.
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse `asc` / `desc` case-insensitively. Anything else is descending.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    /// SQL keyword for this direction.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Orient an ascending comparison result.
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

/// `OFFSET` / `LIMIT` pair for a paginated fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Number of rows to skip.
    pub offset: u64,
    /// Maximum number of rows to return.
    pub limit: u32,
}

impl PageWindow {
    /// Window for a 1-based `page` of `page_size` rows.
    ///
    /// Page 0 is treated as page 1.
    pub fn for_page(page: u32, page_size: u32) -> Self {
        let index = u64::from(page.saturating_sub(1));
        Self {
            offset: index.saturating_mul(u64::from(page_size)),
            limit: page_size,
        }
    }

    /// Offset as the signed integer `PostgreSQL` expects.
    pub fn offset_i64(self) -> i64 {
        i64::try_from(self.offset).unwrap_or(i64::MAX)
    }

    /// Limit as the signed integer `PostgreSQL` expects.
    pub fn limit_i64(self) -> i64 {
        i64::from(self.limit)
    }

    /// Slice the window out of an already filtered and sorted list.
    pub fn slice<T: Clone>(self, rows: &[T]) -> Vec<T> {
        let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        rows.iter().skip(offset).take(limit).cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// Constraints for the agent listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentFilter {
    /// Case-insensitive substring matched against name, display name, or
    /// description (any of them).
    pub search: Option<String>,
    /// Required value of `is_active`.
    pub is_active: Option<bool>,
}

impl AgentFilter {
    /// Build from raw `search` and `status` parameters.
    ///
    /// An empty search disables text matching. Status `active` and
    /// `inactive` filter on the activity flag; any other value (including
    /// `all`) leaves it unconstrained.
    pub fn from_params(search: &str, status: &str) -> Self {
        let search = (!search.is_empty()).then(|| search.to_owned());
        let is_active = match status {
            "active" => Some(true),
            "inactive" => Some(false),
            _ => None,
        };
        Self { search, is_active }
    }

    /// Evaluate the filter against an in-memory record.
    pub fn matches(&self, agent: &Agent) -> bool {
        if let Some(is_active) = self.is_active
            && agent.is_active != is_active
        {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            return [&agent.name, &agent.display_name, &agent.description]
                .into_iter()
                .any(|field| field.to_lowercase().contains(&needle));
        }
        true
    }
}

/// Columns the agent listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentSortField {
    /// `display_name`
    DisplayName,
    /// `created_at`
    CreatedAt,
    /// `updated_at`
    UpdatedAt,
}

impl AgentSortField {
    /// Column name in the `agents` table.
    pub const fn column(self) -> &'static str {
        match self {
            Self::DisplayName => "display_name",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// Resolved sort for the agent listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSort {
    /// Column to sort by.
    pub field: AgentSortField,
    /// Direction.
    pub order: SortOrder,
}

impl Default for AgentSort {
    fn default() -> Self {
        Self {
            field: AgentSortField::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

impl AgentSort {
    /// Resolve a caller-supplied field name through the allow-list.
    ///
    /// Unknown fields fall back to [`AgentSort::default`] and the requested
    /// order is ignored.
    pub fn from_params(sort: &str, order: &str) -> Self {
        let field = match sort {
            "displayName" => AgentSortField::DisplayName,
            "createdAt" => AgentSortField::CreatedAt,
            "updatedAt" => AgentSortField::UpdatedAt,
            _ => return Self::default(),
        };
        Self {
            field,
            order: SortOrder::parse(order),
        }
    }

    /// Compare two records under this sort.
    pub fn compare(self, a: &Agent, b: &Agent) -> Ordering {
        let ordering = match self.field {
            AgentSortField::DisplayName => a.display_name.cmp(&b.display_name),
            AgentSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            AgentSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        self.order.apply(ordering)
    }
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First day included.
    pub start: NaiveDate,
    /// Last day included.
    pub end: NaiveDate,
}

impl DateRange {
    /// Whether `date` falls inside the range.
    pub fn contains(self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Constraints for the analytics query. Both fields combine with AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyticsFilter {
    /// Restrict to one agent.
    pub agent_id: Option<AgentId>,
    /// Restrict to a date range.
    pub date_range: Option<DateRange>,
}

impl AnalyticsFilter {
    /// Build from optional parameters.
    ///
    /// The date range only applies when both bounds are present; a single
    /// bound is ignored.
    pub fn from_params(
        agent_id: Option<AgentId>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Self {
        let date_range = match (start_date, end_date) {
            (Some(start), Some(end)) => Some(DateRange { start, end }),
            _ => None,
        };
        Self {
            agent_id,
            date_range,
        }
    }

    /// Evaluate the filter against an in-memory record.
    pub fn matches(&self, row: &ChatAnalytics) -> bool {
        if let Some(agent_id) = self.agent_id
            && row.agent_id != agent_id
        {
            return false;
        }
        self.date_range.is_none_or(|range| range.contains(row.date))
    }
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

/// Status value that disables log status filtering.
pub const ALL_STATUSES: &str = "ALL";

/// Constraints for the log listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Required status.
    pub status: Option<LogStatus>,
}

impl LogFilter {
    /// Build from the raw `status` parameter.
    ///
    /// Empty and [`ALL_STATUSES`] disable the filter.
    pub fn from_params(status: &str) -> Result<Self, agentdesk_types::UnknownLogStatus> {
        if status.is_empty() || status == ALL_STATUSES {
            return Ok(Self::default());
        }
        Ok(Self {
            status: Some(status.parse()?),
        })
    }

    /// Evaluate the filter against an in-memory record.
    pub fn matches(&self, log: &Log) -> bool {
        self.status.is_none_or(|status| log.status == status)
    }
}

/// Columns the log listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSortField {
    /// `created_at`
    CreatedAt,
    /// `updated_at`
    UpdatedAt,
    /// `status`
    Status,
}

impl LogSortField {
    /// Column name in the `logs` table.
    pub const fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Status => "status",
        }
    }
}

/// Resolved sort for the log listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSort {
    /// Column to sort by.
    pub field: LogSortField,
    /// Direction.
    pub order: SortOrder,
}

impl Default for LogSort {
    fn default() -> Self {
        Self {
            field: LogSortField::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

impl LogSort {
    /// Resolve a caller-supplied field name through the allow-list.
    ///
    /// Unknown fields fall back to [`LogSort::default`].
    pub fn from_params(sort_by: &str, sort_order: &str) -> Self {
        let field = match sort_by {
            "createdAt" => LogSortField::CreatedAt,
            "updatedAt" => LogSortField::UpdatedAt,
            "status" => LogSortField::Status,
            _ => return Self::default(),
        };
        Self {
            field,
            order: SortOrder::parse(sort_order),
        }
    }

    /// Compare two records under this sort.
    pub fn compare(self, a: &Log, b: &Log) -> Ordering {
        let ordering = match self.field {
            LogSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            LogSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            LogSortField::Status => a.status.as_str().cmp(b.status.as_str()),
        };
        self.order.apply(ordering)
    }
}

/// Escape `%`, `_`, and `\` so `term` matches literally inside `ILIKE`,
/// and wrap it for a substring match.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len().saturating_add(2));
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
