//! Core types for the task tracker.

use crate::error::ValidationError;
use crate::store::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A task as persisted in the store file.
///
/// `status` is kept as a plain string; the store never validates it.
/// Callers that need the closed set of states go through [`TaskStatus`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Task {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

/// The known task states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "in-progress" | "in_progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(ValidationError::UnknownStatus(s.to_string())),
        }
    }
}

/// The persisted container: the id counter plus every record, in creation order.
///
/// `current_increment` is the last id handed out and never goes down, even
/// when the record carrying that id is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "R: Deserialize<'de>"))]
pub struct Envelope<R> {
    #[serde(default)]
    pub current_increment: u64,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub records: Vec<R>,
}

impl<R> Default for Envelope<R> {
    fn default() -> Self {
        Self {
            current_increment: 0,
            records: Vec::new(),
        }
    }
}

impl<R: Record> Envelope<R> {
    /// Largest id currently present in `records`.
    pub fn max_id(&self) -> u64 {
        self.records.iter().map(Record::id).max().unwrap_or(0)
    }
}

// Older files may carry `"records": null`.
fn null_as_empty<'de, D, R>(deserializer: D) -> Result<Vec<R>, D::Error>
where
    D: Deserializer<'de>,
    R: Deserialize<'de>,
{
    Ok(Option::<Vec<R>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_serializes_with_stored_field_names() {
        let task = Task {
            id: 3,
            description: "buy milk".to_string(),
            status: "todo".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&task).unwrap();
        let obj = value.as_object().unwrap();

        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["created_at", "description", "id", "status", "updated_at"]
        );
        assert_eq!(obj["id"], json!(3));
    }

    #[test]
    fn test_envelope_reads_existing_file_layout() {
        let raw = r#"{
            "current_increment": 2,
            "records": [
                {
                    "id": 2,
                    "description": "clean house",
                    "status": "in-progress",
                    "created_at": "2024-10-02T09:30:00.123456789+02:00",
                    "updated_at": "2024-10-02T10:00:00Z"
                }
            ]
        }"#;

        let envelope: Envelope<Task> = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.current_increment, 2);
        assert_eq!(envelope.records.len(), 1);
        assert_eq!(envelope.records[0].status, "in-progress");
        assert_eq!(
            envelope.records[0].created_at.to_rfc3339(),
            "2024-10-02T07:30:00.123456789+00:00"
        );
    }

    #[test]
    fn test_envelope_accepts_null_records() {
        let envelope: Envelope<Task> =
            serde_json::from_str(r#"{"current_increment": 4, "records": null}"#).unwrap();
        assert_eq!(envelope.current_increment, 4);
        assert!(envelope.records.is_empty());
    }

    #[test]
    fn test_envelope_max_id() {
        let mut envelope = Envelope::<Task>::default();
        assert_eq!(envelope.max_id(), 0);

        envelope.records.push(Task {
            id: 7,
            ..Default::default()
        });
        envelope.records.push(Task {
            id: 2,
            ..Default::default()
        });
        assert_eq!(envelope.max_id(), 7);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("todo".parse::<TaskStatus>().unwrap(), TaskStatus::Todo);
        assert_eq!(
            "In-Progress".parse::<TaskStatus>().unwrap(),
            TaskStatus::InProgress
        );
        assert_eq!("done".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert!(matches!(
            "later".parse::<TaskStatus>(),
            Err(ValidationError::UnknownStatus(s)) if s == "later"
        ));
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
    }
}
