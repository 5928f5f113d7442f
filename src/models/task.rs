use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    ToDo,
    Doing,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "ToDo",
            TaskStatus::Doing => "Doing",
            TaskStatus::Done => "Done",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown task status: {}", self.0)
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ToDo" => Ok(TaskStatus::ToDo),
            "Doing" => Ok(TaskStatus::Doing),
            "Done" => Ok(TaskStatus::Done),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds an unsaved task. Identity and timestamps are assigned by the repository.
    pub fn new(
        title: String,
        description: String,
        due_date: Option<NaiveDate>,
        status: TaskStatus,
        owner_id: i64,
    ) -> Self {
        let epoch = DateTime::<Utc>::default();
        Task {
            id: 0,
            title,
            description,
            due_date,
            status,
            owner_id,
            created_at: epoch,
            updated_at: epoch,
        }
    }

    /// Listing order: unfinished before done, then due date ascending with
    /// undated tasks last, then newest first.
    pub fn list_order(a: &Task, b: &Task) -> Ordering {
        a.status
            .is_done()
            .cmp(&b.status.is_done())
            .then_with(|| match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| b.created_at.cmp(&a.created_at))
    }
}

/// Fields a PATCH may carry. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub owner_id: Option<i64>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
            && self.owner_id.is_none()
    }

    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(owner_id) = self.owner_id {
            task.owner_id = owner_id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(status: TaskStatus, due: Option<&str>, created_secs: i64) -> Task {
        let mut t = Task::new(
            "t".into(),
            "d".into(),
            due.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            status,
            1,
        );
        t.created_at = Utc.timestamp_opt(created_secs, 0).unwrap();
        t
    }

    #[test]
    fn pending_sorts_before_done_regardless_of_due_date() {
        let pending = task(TaskStatus::Doing, Some("2030-01-01"), 0);
        let done = task(TaskStatus::Done, Some("2020-01-01"), 0);
        assert_eq!(Task::list_order(&pending, &done), Ordering::Less);
        assert_eq!(Task::list_order(&done, &pending), Ordering::Greater);
    }

    #[test]
    fn earlier_due_date_first_then_newest_created() {
        let mut tasks = vec![
            task(TaskStatus::ToDo, Some("2025-03-01"), 10),
            task(TaskStatus::ToDo, None, 50),
            task(TaskStatus::ToDo, Some("2025-01-01"), 10),
            task(TaskStatus::ToDo, Some("2025-03-01"), 20),
        ];
        tasks.sort_by(Task::list_order);

        let keys: Vec<_> = tasks
            .iter()
            .map(|t| (t.due_date.map(|d| d.to_string()), t.created_at.timestamp()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (Some("2025-01-01".to_string()), 10),
                (Some("2025-03-01".to_string()), 20),
                (Some("2025-03-01".to_string()), 10),
                (None, 50),
            ]
        );
    }

    #[test]
    fn status_uses_exact_wire_names() {
        assert_eq!(serde_json::to_string(&TaskStatus::ToDo).unwrap(), "\"ToDo\"");
        assert_eq!("Doing".parse::<TaskStatus>(), Ok(TaskStatus::Doing));
        assert!("done".parse::<TaskStatus>().is_err());
        assert!(serde_json::from_str::<TaskStatus>("\"Todo\"").is_err());
    }

    #[test]
    fn patch_with_one_field_changes_only_that_field() {
        let original = task(TaskStatus::ToDo, Some("2025-06-15"), 0);
        let mut merged = original.clone();
        let patch: TaskPatch = serde_json::from_str(r#"{"status":"Done"}"#).unwrap();
        assert!(!patch.is_empty());
        patch.apply_to(&mut merged);

        assert_eq!(merged.status, TaskStatus::Done);
        assert_eq!(merged.title, original.title);
        assert_eq!(merged.description, original.description);
        assert_eq!(merged.due_date, original.due_date);
        assert_eq!(merged.owner_id, original.owner_id);
    }

    #[test]
    fn patch_of_nulls_is_empty() {
        let patch: TaskPatch =
            serde_json::from_str(r#"{"title":null,"status":null}"#).unwrap();
        assert!(patch.is_empty());
        assert!(TaskPatch::default().is_empty());
    }
}
