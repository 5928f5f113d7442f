#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::from_fn;
use actix_web::{web, App};
use async_trait::async_trait;

use todo_api::models::task::Task;
use todo_api::models::user::User;
use todo_api::repository::{
    MemoryTaskRepository, MemoryUserRepository, RepositoryError, RepositoryResult,
    TaskRepository, UserRepository,
};
use todo_api::routes::cors::{cors, CorsConfig};
use todo_api::routes::routes::api_configure;

pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// The production app wiring around the given repositories.
pub fn app(
    tasks: Arc<dyn TaskRepository>,
    users: Arc<dyn UserRepository>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(CorsConfig::new(vec![ALLOWED_ORIGIN.to_string()])))
        .wrap(from_fn(cors))
        .configure(api_configure(tasks, users))
}

pub fn memory_repositories() -> (Arc<MemoryTaskRepository>, Arc<MemoryUserRepository>) {
    (
        Arc::new(MemoryTaskRepository::new()),
        Arc::new(MemoryUserRepository::new()),
    )
}

/// Memory task repository that counts writes.
#[derive(Default)]
pub struct RecordingTaskRepository {
    inner: MemoryTaskRepository,
    updates: AtomicUsize,
}

impl RecordingTaskRepository {
    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskRepository for RecordingTaskRepository {
    async fn create(&self, task: &mut Task) -> RepositoryResult<()> {
        self.inner.create(task).await
    }

    async fn get_all(&self) -> RepositoryResult<Vec<Task>> {
        self.inner.get_all().await
    }

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<Task>> {
        self.inner.get_by_id(id).await
    }

    async fn get_by_owner_id(&self, owner_id: i64) -> RepositoryResult<Vec<Task>> {
        self.inner.get_by_owner_id(owner_id).await
    }

    async fn update(&self, task: &mut Task) -> RepositoryResult<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update(task).await
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        self.inner.delete(id).await
    }
}

fn unavailable() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

/// Every call fails the way an unreachable database does.
pub struct FailingTaskRepository;

#[async_trait]
impl TaskRepository for FailingTaskRepository {
    async fn create(&self, _task: &mut Task) -> RepositoryResult<()> {
        Err(unavailable())
    }

    async fn get_all(&self) -> RepositoryResult<Vec<Task>> {
        Err(unavailable())
    }

    async fn get_by_id(&self, _id: i64) -> RepositoryResult<Option<Task>> {
        Err(unavailable())
    }

    async fn get_by_owner_id(&self, _owner_id: i64) -> RepositoryResult<Vec<Task>> {
        Err(unavailable())
    }

    async fn update(&self, _task: &mut Task) -> RepositoryResult<()> {
        Err(unavailable())
    }

    async fn delete(&self, _id: i64) -> RepositoryResult<()> {
        Err(unavailable())
    }
}

pub struct FailingUserRepository;

#[async_trait]
impl UserRepository for FailingUserRepository {
    async fn create(&self, _user: &mut User) -> RepositoryResult<()> {
        Err(unavailable())
    }

    async fn get_all(&self) -> RepositoryResult<Vec<User>> {
        Err(unavailable())
    }

    async fn get_by_id(&self, _id: i64) -> RepositoryResult<Option<User>> {
        Err(unavailable())
    }

    async fn get_by_username(&self, _username: &str) -> RepositoryResult<Option<User>> {
        Err(unavailable())
    }

    async fn update(&self, _user: &mut User) -> RepositoryResult<()> {
        Err(unavailable())
    }

    async fn delete(&self, _id: i64) -> RepositoryResult<()> {
        Err(unavailable())
    }
}
