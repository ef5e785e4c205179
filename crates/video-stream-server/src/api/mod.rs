//! HTTP API handlers.
//!
//! Defines the Actix routes and the request body parsing shared by them.

#[path = "health.rs"]
mod health_handler;

use actix_web::{HttpResponse, error, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use health_handler::{HealthResponse, __path_health, health};

/// Error body returned for rejected requests.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// JSON body parsing: size limit plus a JSON error body instead of plain text.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, req| {
            tracing::debug!(path = %req.path(), error = %err, "rejected json body");
            let response = HttpResponse::BadRequest().json(ErrorResponse {
                error: err.to_string(),
            });
            error::InternalError::from_response(err, response).into()
        })
}
