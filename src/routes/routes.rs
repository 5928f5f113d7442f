use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use log::info;

use super::common::ApiError;
use super::task::task_handlers;
use super::user::user_handlers;
use crate::repository::{TaskRepository, UserRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Tasks,
    Users,
}

/// Picks the handler for `path`. Checked most specific first so that
/// `/users/{id}/tasks` is not taken for a user lookup.
pub fn resolve(path: &str) -> Option<Target> {
    if path == "/users" || path == "/users/" {
        Some(Target::Users)
    } else if path.starts_with("/users/username/") {
        Some(Target::Users)
    } else if path.starts_with("/users/") && path.split('/').nth(3) == Some("tasks") {
        Some(Target::Tasks)
    } else if path.starts_with("/users/") {
        Some(Target::Users)
    } else if path == "/tasks" || path.starts_with("/tasks/") {
        Some(Target::Tasks)
    } else {
        None
    }
}

pub async fn route_request(
    req: HttpRequest,
    body: web::Bytes,
    tasks: web::Data<dyn TaskRepository>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, ApiError> {
    match resolve(req.path()) {
        Some(Target::Tasks) => task_handlers::dispatch(&req, &body, tasks.get_ref()).await,
        Some(Target::Users) => user_handlers::dispatch(&req, &body, users.get_ref()).await,
        None => {
            info!("No route for {} {}", req.method(), req.path());
            Err(ApiError::NotFound("resource"))
        }
    }
}

pub fn api_configure(
    tasks: Arc<dyn TaskRepository>,
    users: Arc<dyn UserRepository>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::from(tasks))
            .app_data(web::Data::from(users))
            .default_service(web::to(route_request));
    }
}
