use poem_openapi::{
    payload::Json, types::multipart::Upload, ApiResponse, Multipart, Object,
};
use serde::{Deserialize, Serialize};

use super::common::{
    BadGatewayResponse, BadRequestResponse, InternalServerErrorResponse, NotFoundResponse,
    UnauthorizedResponse,
};

#[derive(Multipart)]
pub struct UploadPayload {
    pub file: Option<Upload>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(ApiResponse)]
pub enum UploadResponses {
    #[oai(status = 201)]
    Created(Json<UploadResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 502)]
    BadGateway(Json<BadGatewayResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
