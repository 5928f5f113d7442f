use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::task::{Task, TaskStatus};

// Create request. Absent text fields decode as empty and are rejected by `into_task`.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub owner_id: i64,
}

impl CreateTaskRequest {
    pub fn into_task(self) -> Option<Task> {
        if self.title.is_empty() || self.description.is_empty() || self.owner_id == 0 {
            return None;
        }
        let status = self.status?;
        Some(Task::new(
            self.title,
            self.description,
            self.due_date,
            status,
            self.owner_id,
        ))
    }
}
