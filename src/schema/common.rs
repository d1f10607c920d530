use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Every error body is `{ "error": string }`.
#[derive(Object, Deserialize, Serialize)]
pub struct BadRequestResponse {
    pub error: String,
}

impl BadRequestResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct UnauthorizedResponse {
    pub error: String,
}

impl Default for UnauthorizedResponse {
    fn default() -> Self {
        Self {
            error: "unauthenticated".to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct ForbiddenResponse {
    pub error: String,
}

impl Default for ForbiddenResponse {
    fn default() -> Self {
        Self {
            error: "forbidden".to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct NotFoundResponse {
    pub error: String,
}

impl NotFoundResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct BadGatewayResponse {
    pub error: String,
}

impl Default for BadGatewayResponse {
    fn default() -> Self {
        Self {
            error: "upload failed".to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct InternalServerErrorResponse {
    pub error: String,
}

impl InternalServerErrorResponse {
    /// Logs the cause with its location and returns the generic body; the
    /// cause never reaches the client.
    pub fn new(module: &str, function: &str, step: &str, cause: &str) -> Self {
        tracing::error!(
            module = module,
            function = function,
            step = step,
            "request failed: {}",
            cause
        );
        Self {
            error: "internal server error".to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
