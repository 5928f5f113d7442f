use actix_web::http::Method;
use actix_web::{HttpRequest, HttpResponse};
use log::{error, info, warn};

use super::task_models::CreateTaskRequest;
use crate::models::task::TaskPatch;
use crate::repository::TaskRepository;
use crate::routes::common::{decode_json, extract_id_from_path, extract_owner_id_from_path, ApiError};

const TASKS_PATH: &str = "/tasks";
const TASK_PREFIX: &str = "/tasks/";
const USERS_PREFIX: &str = "/users/";

/// Routes a request the router assigned to tasks.
pub async fn dispatch(
    req: &HttpRequest,
    body: &[u8],
    repo: &dyn TaskRepository,
) -> Result<HttpResponse, ApiError> {
    let path = req.path();

    // `/users/{id}/tasks` is read-only.
    if path.starts_with(USERS_PREFIX) {
        return match *req.method() {
            Method::GET => get_tasks_by_owner(repo, path).await,
            _ => Err(ApiError::MethodNotAllowed),
        };
    }

    let is_collection = path == TASKS_PATH;
    match (req.method(), is_collection) {
        (&Method::POST, true) => create_task(repo, body).await,
        (&Method::GET, true) => get_tasks(repo).await,
        (&Method::GET, false) => get_task(repo, path).await,
        (&Method::PATCH, false) => update_task(repo, path, body).await,
        (&Method::DELETE, false) => delete_task(repo, path).await,
        (method, _) => {
            info!("Method {} not allowed on {}", method, path);
            Err(ApiError::MethodNotAllowed)
        }
    }
}

pub async fn create_task(repo: &dyn TaskRepository, body: &[u8]) -> Result<HttpResponse, ApiError> {
    let request: CreateTaskRequest = decode_json(body).map_err(|e| {
        warn!("Failed to decode create task request: {}", e);
        e
    })?;

    let mut task = request
        .into_task()
        .ok_or(ApiError::Validation("all fields are required"))?;

    repo.create(&mut task).await.map_err(|e| {
        error!("Failed to create task: {}", e);
        e
    })?;

    info!("Task {} created for owner {}", task.id, task.owner_id);
    Ok(HttpResponse::Created().json(task))
}

pub async fn get_tasks(repo: &dyn TaskRepository) -> Result<HttpResponse, ApiError> {
    let tasks = repo.get_all().await.map_err(|e| {
        error!("Failed to list tasks: {}", e);
        e
    })?;
    Ok(HttpResponse::Ok().json(tasks))
}

pub async fn get_task(repo: &dyn TaskRepository, path: &str) -> Result<HttpResponse, ApiError> {
    let id = extract_id_from_path(path, TASK_PREFIX)?;

    match repo.get_by_id(id).await {
        Ok(Some(task)) => Ok(HttpResponse::Ok().json(task)),
        Ok(None) => {
            info!("Task not found: {}", id);
            Err(ApiError::NotFound("task"))
        }
        Err(e) => {
            error!("Failed to fetch task {}: {}", id, e);
            Err(e.into())
        }
    }
}

pub async fn get_tasks_by_owner(repo: &dyn TaskRepository, path: &str) -> Result<HttpResponse, ApiError> {
    let owner_id = extract_owner_id_from_path(path)?;

    let tasks = repo.get_by_owner_id(owner_id).await.map_err(|e| {
        error!("Failed to list tasks of owner {}: {}", owner_id, e);
        e
    })?;
    Ok(HttpResponse::Ok().json(tasks))
}

pub async fn update_task(
    repo: &dyn TaskRepository,
    path: &str,
    body: &[u8],
) -> Result<HttpResponse, ApiError> {
    let id = extract_id_from_path(path, TASK_PREFIX)?;

    // A missing task wins over anything wrong with the body.
    let mut task = match repo.get_by_id(id).await {
        Ok(Some(task)) => task,
        Ok(None) => {
            info!("Task not found for update: {}", id);
            return Err(ApiError::NotFound("task"));
        }
        Err(e) => {
            error!("Failed to fetch task {} for update: {}", id, e);
            return Err(e.into());
        }
    };

    let patch: TaskPatch = decode_json(body).map_err(|e| {
        warn!("Failed to decode update for task {}: {}", id, e);
        e
    })?;
    if patch.is_empty() {
        return Err(ApiError::Validation(
            "at least one field must be provided for update",
        ));
    }
    patch.apply_to(&mut task);

    repo.update(&mut task).await.map_err(|e| {
        error!("Failed to update task {}: {}", id, e);
        e
    })?;

    info!("Task {} updated", id);
    Ok(HttpResponse::Ok().json(task))
}

pub async fn delete_task(repo: &dyn TaskRepository, path: &str) -> Result<HttpResponse, ApiError> {
    let id = extract_id_from_path(path, TASK_PREFIX)?;

    repo.delete(id).await.map_err(|e| {
        error!("Failed to delete task {}: {}", id, e);
        e
    })?;

    info!("Task {} deleted", id);
    Ok(HttpResponse::NoContent().finish())
}
