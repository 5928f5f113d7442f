use actix_web::http::Method;
use actix_web::{HttpRequest, HttpResponse};
use log::{error, info, warn};

use super::user_models::CreateUserRequest;
use crate::models::user::UserPatch;
use crate::repository::UserRepository;
use crate::routes::common::{decode_json, decode_path_segment, extract_id_from_path, ApiError};

const USERS_PATH: &str = "/users";
const USER_PREFIX: &str = "/users/";
const USERNAME_PREFIX: &str = "/users/username/";

pub async fn dispatch(
    req: &HttpRequest,
    body: &[u8],
    repo: &dyn UserRepository,
) -> Result<HttpResponse, ApiError> {
    let path = req.path();

    if let Some(username) = path.strip_prefix(USERNAME_PREFIX) {
        return match *req.method() {
            Method::GET => get_user_by_username(repo, username).await,
            _ => Err(ApiError::MethodNotAllowed),
        };
    }

    let is_collection = path == USERS_PATH;
    match (req.method(), is_collection) {
        (&Method::POST, true) => create_user(repo, body).await,
        (&Method::GET, true) => get_users(repo).await,
        (&Method::GET, false) => get_user(repo, path).await,
        (&Method::PATCH, false) => update_user(repo, path, body).await,
        (&Method::DELETE, false) => delete_user(repo, path).await,
        (method, _) => {
            info!("Method {} not allowed on {}", method, path);
            Err(ApiError::MethodNotAllowed)
        }
    }
}

pub async fn create_user(repo: &dyn UserRepository, body: &[u8]) -> Result<HttpResponse, ApiError> {
    let request: CreateUserRequest = decode_json(body).map_err(|e| {
        warn!("Failed to decode create user request: {}", e);
        e
    })?;
    let mut user = request
        .into_user()
        .ok_or(ApiError::Validation("all fields are required"))?;

    if let Err(e) = repo.create(&mut user).await {
        error!("Failed to create user {}: {}", user.username, e);
        return Err(e.into());
    }

    info!("User {} registered with id {}", user.username, user.id);
    Ok(HttpResponse::Created().json(user))
}

pub async fn get_users(repo: &dyn UserRepository) -> Result<HttpResponse, ApiError> {
    match repo.get_all().await {
        Ok(users) => Ok(HttpResponse::Ok().json(users)),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(e.into())
        }
    }
}

pub async fn get_user(repo: &dyn UserRepository, path: &str) -> Result<HttpResponse, ApiError> {
    let id = extract_id_from_path(path, USER_PREFIX)?;

    match repo.get_by_id(id).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(user)),
        Ok(None) => {
            info!("User not found: {}", id);
            Err(ApiError::NotFound("user"))
        }
        Err(e) => {
            error!("Failed to fetch user {}: {}", id, e);
            Err(e.into())
        }
    }
}

pub async fn get_user_by_username(
    repo: &dyn UserRepository,
    username: &str,
) -> Result<HttpResponse, ApiError> {
    let username = decode_path_segment(username)?;
    if username.is_empty() || username.contains('/') {
        return Err(ApiError::InvalidPathFormat);
    }
    let username: &str = &username;

    match repo.get_by_username(username).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(user)),
        Ok(None) => {
            info!("User not found: {}", username);
            Err(ApiError::NotFound("user"))
        }
        Err(e) => {
            error!("Failed to fetch user {}: {}", username, e);
            Err(e.into())
        }
    }
}

pub async fn update_user(
    repo: &dyn UserRepository,
    path: &str,
    body: &[u8],
) -> Result<HttpResponse, ApiError> {
    let id = extract_id_from_path(path, USER_PREFIX)?;

    let mut user = match repo.get_by_id(id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            info!("User not found for update: {}", id);
            return Err(ApiError::NotFound("user"));
        }
        Err(e) => {
            error!("Failed to fetch user {} for update: {}", id, e);
            return Err(e.into());
        }
    };

    let patch: UserPatch = decode_json(body).map_err(|e| {
        warn!("Failed to decode update for user {}: {}", id, e);
        e
    })?;
    if patch.is_empty() {
        return Err(ApiError::Validation(
            "at least one field must be provided for update",
        ));
    }
    patch.apply_to(&mut user);

    if let Err(e) = repo.update(&mut user).await {
        error!("Failed to update user {}: {}", id, e);
        return Err(e.into());
    }

    Ok(HttpResponse::Ok().json(user))
}

pub async fn delete_user(repo: &dyn UserRepository, path: &str) -> Result<HttpResponse, ApiError> {
    let id = extract_id_from_path(path, USER_PREFIX)?;

    if let Err(e) = repo.delete(id).await {
        error!("Failed to delete user {}: {}", id, e);
        return Err(e.into());
    }

    info!("User {} deleted", id);
    Ok(HttpResponse::NoContent().finish())
}
