use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{self, HeaderValue};
use actix_web::http::Method;
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpResponse};
use log::warn;

use super::common::ErrorResponse;

const ALLOWED_METHODS: &str = "GET, POST, PATCH, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Origins allowed to call the API. `*` admits any origin.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    origins: Vec<String>,
}

impl CorsConfig {
    pub fn new(origins: Vec<String>) -> Self {
        CorsConfig { origins }
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.origins.iter().any(|allowed| allowed == "*" || allowed == origin)
    }
}

/// Echoes an allowed `Origin`, rejects any other with 403 and answers
/// preflight `OPTIONS` itself. Reads `web::Data<CorsConfig>` from app data.
pub async fn cors<B: MessageBody + 'static>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let origin = req.headers().get(header::ORIGIN).cloned();

    if let Some(origin) = &origin {
        let permitted = match (req.app_data::<web::Data<CorsConfig>>(), origin.to_str()) {
            (Some(config), Ok(origin)) => config.allows(origin),
            _ => false,
        };
        if !permitted {
            warn!("Rejected request from origin {:?}", origin);
            let response = HttpResponse::Forbidden().json(ErrorResponse {
                message: "not allowed origin".to_string(),
            });
            return Ok(req.into_response(response));
        }
    }

    let mut response = if req.method() == Method::OPTIONS {
        req.into_response(HttpResponse::Ok().finish())
    } else {
        next.call(req).await?.map_into_boxed_body()
    };

    let headers = response.headers_mut();
    if let Some(origin) = origin {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    Ok(response)
}
