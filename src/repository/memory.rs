//! In-process backend used when `DB_TYPE=memory`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{RepositoryResult, TaskRepository, UserRepository};
use crate::models::task::Task;
use crate::models::user::User;

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryTaskRepository {
    table: RwLock<Table<Task>>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn create(&self, task: &mut Task) -> RepositoryResult<()> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        task.id = table.next_id();
        task.created_at = now;
        task.updated_at = now;
        table.rows.insert(task.id, task.clone());
        Ok(())
    }

    async fn get_all(&self) -> RepositoryResult<Vec<Task>> {
        let table = self.table.read().await;
        let mut tasks: Vec<Task> = table.rows.values().cloned().collect();
        tasks.sort_by(Task::list_order);
        Ok(tasks)
    }

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<Task>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn get_by_owner_id(&self, owner_id: i64) -> RepositoryResult<Vec<Task>> {
        let table = self.table.read().await;
        let mut tasks: Vec<Task> = table
            .rows
            .values()
            .filter(|task| task.owner_id == owner_id)
            .cloned()
            .collect();
        tasks.sort_by(Task::list_order);
        Ok(tasks)
    }

    async fn update(&self, task: &mut Task) -> RepositoryResult<()> {
        let mut table = self.table.write().await;
        task.updated_at = Utc::now();
        // Like an UPDATE matching no row, a vanished id is silently ignored.
        if let Some(stored) = table.rows.get_mut(&task.id) {
            *stored = task.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        self.table.write().await.rows.remove(&id);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    table: RwLock<Table<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &mut User) -> RepositoryResult<()> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        user.id = table.next_id();
        user.created_at = now;
        user.updated_at = now;
        table.rows.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_all(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn update(&self, user: &mut User) -> RepositoryResult<()> {
        let mut table = self.table.write().await;
        user.updated_at = Utc::now();
        if let Some(stored) = table.rows.get_mut(&user.id) {
            *stored = user.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        self.table.write().await.rows.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskStatus;
    use chrono::NaiveDate;

    fn new_task(title: &str, status: TaskStatus, due: Option<(i32, u32, u32)>, owner_id: i64) -> Task {
        Task::new(
            title.into(),
            "desc".into(),
            due.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            status,
            owner_id,
        )
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids_and_timestamps() {
        let repo = MemoryTaskRepository::new();
        let mut first = new_task("a", TaskStatus::ToDo, None, 1);
        let mut second = new_task("b", TaskStatus::ToDo, None, 1);
        repo.create(&mut first).await.unwrap();
        repo.create(&mut second).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.created_at, first.updated_at);

        let stored = repo.get_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(stored, first);
    }

    #[tokio::test]
    async fn listings_follow_task_order_and_filter_by_owner() {
        let repo = MemoryTaskRepository::new();
        for mut task in [
            new_task("done-early", TaskStatus::Done, Some((2024, 1, 1)), 1),
            new_task("late", TaskStatus::ToDo, Some((2025, 12, 1)), 1),
            new_task("other-owner", TaskStatus::ToDo, Some((2025, 1, 1)), 2),
            new_task("soon", TaskStatus::Doing, Some((2025, 2, 1)), 1),
        ] {
            repo.create(&mut task).await.unwrap();
        }

        let titles: Vec<_> = repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["other-owner", "soon", "late", "done-early"]);

        let owned: Vec<_> = repo
            .get_by_owner_id(1)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(owned, vec!["soon", "late", "done-early"]);
        assert!(repo.get_by_owner_id(99).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_rows_are_absent_not_errors() {
        let tasks = MemoryTaskRepository::new();
        assert!(tasks.get_by_id(42).await.unwrap().is_none());
        tasks.delete(42).await.unwrap();

        let users = MemoryUserRepository::new();
        assert!(users.get_by_username("nobody").await.unwrap().is_none());
        users.delete(42).await.unwrap();
    }

    #[tokio::test]
    async fn update_replaces_stored_user() {
        let repo = MemoryUserRepository::new();
        let mut user = User::new("jdoe".into(), "j@example.com".into(), "John".into(), "Doe".into());
        repo.create(&mut user).await.unwrap();

        user.email = "john@example.com".into();
        repo.update(&mut user).await.unwrap();

        let stored = repo.get_by_username("jdoe").await.unwrap().unwrap();
        assert_eq!(stored.email, "john@example.com");
        assert!(stored.updated_at >= stored.created_at);
    }
}
