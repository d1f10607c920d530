use poem_openapi::{payload::Json, types::MaybeUndefined, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::{
    common::{
        BadRequestResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    project::ProjectFeedItem,
};
use crate::{core::caller::Caller, model::profile::UserCategory};

#[derive(Object, Deserialize, Serialize)]
#[oai(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetail {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub cpf: Option<String>,
    pub age: Option<i32>,
    pub linkedin: Option<String>,
    pub academic_cv_url: Option<String>,
    pub bio: Option<String>,
    pub category: UserCategory,
    pub avatar_url: Option<String>,
    pub auto_created: bool,
}

impl From<&Caller> for ProfileDetail {
    fn from(value: &Caller) -> Self {
        let profile = &value.profile;
        Self {
            id: profile.id.to_string(),
            email: value.identity.email.clone(),
            name: profile.full_name.clone(),
            phone: profile.phone.clone(),
            cpf: profile.cpf.clone(),
            age: profile.age,
            linkedin: profile.linkedin.clone(),
            academic_cv_url: profile.academic_cv_url.clone(),
            bio: profile.bio.clone(),
            category: profile.category,
            avatar_url: profile.avatar_url.clone(),
            auto_created: profile.auto_created,
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct ProfileWithProjectsResponse {
    #[oai(flatten)]
    #[serde(flatten)]
    pub profile: ProfileDetail,
    pub projects: Vec<ProjectFeedItem>,
}

#[derive(ApiResponse)]
pub enum ProfileGetResponses {
    #[oai(status = 200)]
    Ok(Json<ProfileWithProjectsResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

/// Absent fields are left unchanged, `null` clears them.
#[derive(Object)]
#[oai(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub name: MaybeUndefined<String>,
    pub phone: MaybeUndefined<String>,
    pub cpf: MaybeUndefined<String>,
    /// Integer or numeric string; an empty string clears the age.
    pub age: MaybeUndefined<serde_json::Value>,
    pub linkedin: MaybeUndefined<String>,
    pub academic_cv_url: MaybeUndefined<String>,
    pub bio: MaybeUndefined<String>,
    pub category: Option<UserCategory>,
}

#[derive(ApiResponse)]
pub enum ProfileUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<ProfileDetail>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
