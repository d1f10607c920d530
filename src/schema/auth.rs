use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::Deserialize;

use super::common::{InternalServerErrorResponse, UnauthorizedResponse};

#[derive(Object, Deserialize)]
#[oai(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Assertion JWT issued by the identity provider.
    pub id_token: String,
}

#[derive(Object, Deserialize)]
#[oai(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub exp: String,
    pub exp_in: i64,
    pub exp_refresh_token: String,
    pub refresh_token: String,
    pub token: String,
    pub token_type: String,
}

#[derive(ApiResponse)]
pub enum LoginResponses {
    #[oai(status = 200)]
    Ok(Json<LoginResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
#[oai(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(ApiResponse)]
pub enum RefreshTokenResponses {
    #[oai(status = 200)]
    Ok(Json<LoginResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum LogoutResponses {
    #[oai(status = 204)]
    NoContent,

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
