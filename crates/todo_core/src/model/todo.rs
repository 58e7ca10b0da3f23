//! Todo domain model.
//!
//! # Responsibility
//! - Define the persisted todo record and its wire field names.
//! - Validate loosely-typed create/update input into typed values.
//! - Provide completion and overdue predicates used by list views.
//!
//! # Invariants
//! - `id` is assigned by the system on create and never taken from input.
//! - `name` is never blank.
//! - Timestamps are UTC with millisecond precision, so save/load is lossless.
//! - `created` should not be later than `due`; this is expected, not enforced.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque todo identifier.
///
/// Generated ids are v4 UUID strings, but persisted ids are not required to
/// be UUID-shaped; any non-blank string is a valid identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing identifier, rejecting blank values.
    pub fn parse(value: impl Into<String>) -> Result<Self, TodoValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(TodoValidationError::BlankId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TodoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validation failures for todo input and persisted records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    /// `name` is absent or `null`.
    MissingName,
    /// `name` is present but not a string.
    NameNotString,
    /// `name` is blank after trimming.
    EmptyName,
    /// `due` is present but not a string.
    DueNotString,
    /// `due` is a string that does not parse as a timestamp.
    InvalidDue(String),
    /// Identifier is blank.
    BlankId,
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "todo name is required"),
            Self::NameNotString => write!(f, "todo name must be a string"),
            Self::EmptyName => write!(f, "todo name must not be blank"),
            Self::DueNotString => write!(f, "todo due date must be an ISO-8601 string"),
            Self::InvalidDue(raw) => write!(f, "invalid todo due date `{raw}`"),
            Self::BlankId => write!(f, "todo id must not be blank"),
        }
    }
}

impl Error for TodoValidationError {}

/// Canonical todo record.
///
/// Field order matches the persisted JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    /// Absent means the todo can never be overdue.
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
}

impl Todo {
    /// Validates external input and builds a new todo with a generated id.
    ///
    /// # Invariants
    /// - `completed` starts as `false`.
    /// - `created` is `now` truncated to milliseconds.
    pub fn create(input: &TodoInput, now: DateTime<Utc>) -> Result<Self, TodoValidationError> {
        let name = validate_name(input.name.as_ref())?;
        let due = validate_due(input.due.as_ref())?;
        Ok(Self {
            id: TodoId::generate(),
            name,
            completed: false,
            due,
            created: now.trunc_subsecs(3),
        })
    }

    /// Builds a todo with a caller-provided id.
    ///
    /// Used by seeding/import paths where identity already exists. Never
    /// reachable from untrusted create input.
    pub fn with_id(
        id: TodoId,
        name: impl Into<String>,
        created: DateTime<Utc>,
    ) -> Result<Self, TodoValidationError> {
        let todo = Self {
            id,
            name: name.into(),
            completed: false,
            due: None,
            created: created.trunc_subsecs(3),
        };
        todo.validate()?;
        Ok(todo)
    }

    /// Checks invariants that must hold for any stored todo.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(TodoValidationError::BlankId);
        }
        if self.name.trim().is_empty() {
            return Err(TodoValidationError::EmptyName);
        }
        Ok(())
    }

    pub fn complete(&mut self) {
        self.completed = true;
    }

    pub fn undo(&mut self) {
        self.completed = false;
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Returns whether the due date has passed while the todo is incomplete.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due.is_some_and(|due| due < now)
    }

    /// Merges validated changes. `id`, `created` and `completed` are untouched.
    pub fn apply(&mut self, changes: TodoChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(due) = changes.due {
            self.due = due;
        }
    }
}

/// Raw create input as received from a client.
///
/// Fields stay untyped so type mismatches surface as validation errors
/// instead of decode failures. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TodoInput {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub due: Option<Value>,
}

impl TodoInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(Value::String(name.into())),
            due: None,
        }
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due = Some(Value::String(timestamp::format(&due)));
        self
    }
}

/// Raw partial update input.
///
/// `due: null` is kept as `Some(Value::Null)` and clears the due date;
/// an absent field leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TodoPatch {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub due: Option<Value>,
}

impl TodoPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(Value::String(name.into())),
            due: None,
        }
    }

    pub fn reschedule(due: Option<DateTime<Utc>>) -> Self {
        Self {
            name: None,
            due: Some(due.map_or(Value::Null, |value| Value::String(timestamp::format(&value)))),
        }
    }

    /// Validates every present field; nothing is applied on failure.
    pub fn validate(&self) -> Result<TodoChanges, TodoValidationError> {
        let name = match self.name.as_ref() {
            Some(value) => Some(validate_name(Some(value))?),
            None => None,
        };
        let due = match self.due.as_ref() {
            Some(value) => Some(validate_due(Some(value))?),
            None => None,
        };
        Ok(TodoChanges { name, due })
    }
}

/// Typed, validated form of `TodoPatch`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub name: Option<String>,
    /// Outer `None` keeps the current value; `Some(None)` clears it.
    pub due: Option<Option<DateTime<Utc>>>,
}

fn validate_name(value: Option<&Value>) -> Result<String, TodoValidationError> {
    match value {
        None | Some(Value::Null) => Err(TodoValidationError::MissingName),
        Some(Value::String(name)) => {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                Err(TodoValidationError::EmptyName)
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(_) => Err(TodoValidationError::NameNotString),
    }
}

fn validate_due(value: Option<&Value>) -> Result<Option<DateTime<Utc>>, TodoValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => parse_timestamp(raw)
            .map(Some)
            .ok_or_else(|| TodoValidationError::InvalidDue(raw.clone())),
        Some(_) => Err(TodoValidationError::DueNotString),
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Parses an ISO-8601 timestamp into UTC with millisecond precision.
///
/// Accepts RFC 3339 with any offset, a naive date-time read as UTC, or a
/// bare date read as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    let parsed = if let Ok(value) = DateTime::parse_from_rfc3339(trimmed) {
        value.with_timezone(&Utc)
    } else if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        value.and_utc()
    } else {
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()?
            .and_hms_opt(0, 0, 0)?
            .and_utc()
    };
    Some(parsed.trunc_subsecs(3))
}

/// Serde adapter writing `2021-12-30T14:48:00.000Z`-style timestamps.
pub mod timestamp {
    use crate::model::todo::parse_timestamp;
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
    }

    pub mod option {
        use super::format;
        use crate::model::todo::parse_timestamp;
        use chrono::{DateTime, Utc};
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_str(&format(value)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => parse_timestamp(&raw)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`"))),
                None => Ok(None),
            }
        }
    }
}
