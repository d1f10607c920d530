use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::{
    core::{
        caller::{authenticate_caller, CallerError},
        security::BearerAuthorization,
    },
    schema::{
        common::{
            BadGatewayResponse, BadRequestResponse, InternalServerErrorResponse,
            NotFoundResponse, UnauthorizedResponse,
        },
        upload::{UploadPayload, UploadResponse, UploadResponses},
    },
    AppState,
};

#[derive(Tags)]
enum ApiUploadTags {
    Upload,
}

pub struct ApiUpload;

#[OpenApi]
impl ApiUpload {
    /// Stores one file with the upload gateway and returns its permanent URL.
    #[oai(path = "/upload", method = "post", tag = "ApiUploadTags::Upload")]
    async fn upload_file_api(
        &self,
        payload: UploadPayload,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UploadResponses {
        let caller = match authenticate_caller(&state, auth.0.token).await {
            Ok(val) => val,
            Err(CallerError::Unauthenticated) => {
                return UploadResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(err @ CallerError::IdentityNotFound(_)) => {
                return UploadResponses::NotFound(Json(NotFoundResponse::new(err.to_string())))
            }
            Err(CallerError::Internal(err)) => {
                return UploadResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.upload",
                        "upload_file_api",
                        "authenticate caller",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let Some(file) = payload.file.filter(|x| x.size() > 0) else {
            return UploadResponses::BadRequest(Json(BadRequestResponse::new("file is required")));
        };
        let file_name = file.file_name().unwrap_or("upload").to_string();
        let content_type = file.content_type().map(|x| x.to_string());
        let content = match file.into_vec().await {
            Ok(val) => val,
            Err(err) => {
                return UploadResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.upload",
                        "upload_file_api",
                        "read multipart file",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let url = match state
            .upload_gateway
            .upload(&file_name, content_type.as_deref(), content)
            .await
        {
            Ok(val) => val,
            Err(err) => {
                tracing::error!(
                    module = "route.upload",
                    function = "upload_file_api",
                    step = "upload to gateway",
                    "upload failed: {}",
                    err
                );
                return UploadResponses::BadGateway(Json(BadGatewayResponse::default()));
            }
        };
        tracing::info!("profile {} uploaded {}", caller.profile.id, url);
        UploadResponses::Created(Json(UploadResponse { url }))
    }
}
