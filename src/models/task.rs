use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::account::not_blank;

/// A task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// What needs doing. Trimmed, never empty.
    pub description: String,
    pub completed: bool,
    /// Identifier of the owning account. Set at creation from the
    /// authenticated caller and never reassigned.
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(custom(function = "not_blank", message = "description must not be blank"))]
    pub description: String,

    pub completed: Option<bool>,
}

/// Partial update payload for `PATCH /tasks/{id}`.
///
/// Like [`crate::models::AccountUpdate`], the allowed-field check runs on
/// the raw JSON map before deserialization.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(custom(function = "not_blank", message = "description must not be blank"))]
    pub description: Option<String>,

    pub completed: Option<bool>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.completed.is_none()
    }
}

/// Raw query parameters for `GET /tasks`, exactly as they arrive on the
/// URL. Everything is a string here so that malformed values can be
/// treated leniently instead of failing deserialization; see
/// [`TaskQuery::normalize`].
#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    /// Completion filter, `"true"` or `"false"`.
    pub completed: Option<String>,
    /// Sort spec in `field:direction` form, e.g. `createdAt:desc`.
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub limit: Option<String>,
    pub skip: Option<String>,
}

/// Fields a task list may be sorted by. The whitelist keeps user input
/// out of the generated SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortField {
    Description,
    Completed,
    CreatedAt,
    UpdatedAt,
}

impl TaskSortField {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "description" => Some(Self::Description),
            "completed" => Some(Self::Completed),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Completed => "completed",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Normalized query options ready to be turned into SQL.
#[derive(Debug, PartialEq, Eq)]
pub struct TaskQueryOptions {
    pub completed: Option<bool>,
    pub sort: Option<(TaskSortField, SortDirection)>,
    pub limit: Option<i64>,
    pub skip: i64,
}

impl TaskQuery {
    /// Coerces the raw string parameters into typed options.
    ///
    /// Malformed input never faults a request: an unparseable `completed`
    /// value, an unknown sort field, and a non-numeric or negative
    /// `limit`/`skip` are each treated as if the parameter were absent.
    /// A sort direction other than `desc` sorts ascending.
    pub fn normalize(&self) -> TaskQueryOptions {
        let completed = self
            .completed
            .as_deref()
            .and_then(|value| value.parse::<bool>().ok());

        let sort = self.sort_by.as_deref().and_then(|spec| {
            let (field, direction) = match spec.split_once(':') {
                Some((field, direction)) => (field, direction),
                None => (spec, ""),
            };
            let field = TaskSortField::parse(field)?;
            let direction = if direction == "desc" {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            Some((field, direction))
        });

        TaskQueryOptions {
            completed,
            sort,
            limit: parse_non_negative(self.limit.as_deref()),
            skip: parse_non_negative(self.skip.as_deref()).unwrap_or(0),
        }
    }
}

fn parse_non_negative(value: Option<&str>) -> Option<i64> {
    value
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|parsed| *parsed >= 0)
}
