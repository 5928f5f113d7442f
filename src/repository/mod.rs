pub mod dialect;
pub mod memory;
pub mod task_repository;
pub mod user_repository;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::task::Task;
use crate::models::user::User;

pub use memory::{MemoryTaskRepository, MemoryUserRepository};
pub use task_repository::SqlTaskRepository;
pub use user_repository::SqlUserRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("unreadable row: {0}")]
    CorruptRow(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores `task`, stamping its timestamps and generated id in place.
    async fn create(&self, task: &mut Task) -> RepositoryResult<()>;

    /// All tasks in listing order.
    async fn get_all(&self) -> RepositoryResult<Vec<Task>>;

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<Task>>;

    /// Tasks of one owner in listing order.
    async fn get_by_owner_id(&self, owner_id: i64) -> RepositoryResult<Vec<Task>>;

    /// Writes every mutable column of `task` and refreshes `updated_at` in place.
    async fn update(&self, task: &mut Task) -> RepositoryResult<()>;

    /// Deleting an unknown id is not an error.
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &mut User) -> RepositoryResult<()>;

    async fn get_all(&self) -> RepositoryResult<Vec<User>>;

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;

    async fn get_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;

    async fn update(&self, user: &mut User) -> RepositoryResult<()>;

    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}
