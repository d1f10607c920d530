use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    repository::{
        profile::get_profile_by_id, project::get_project_with_attachments,
        user_identity::get_identity_by_id,
    },
    schema::{
        common::{BadRequestResponse, InternalServerErrorResponse, NotFoundResponse},
        project::{
            AttachmentDetail, ProjectDetailOwner, ProjectDetailResponse, ProjectDetailResponses,
            ProjectFeedItem, UNKNOWN_OWNER_NAME,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiProjectDetailTags {
    ProjectDetail,
}

pub struct ApiProjectDetail;

#[OpenApi]
impl ApiProjectDetail {
    /// Public project page: every attachment plus the owner's public profile.
    #[oai(
        path = "/project-detail",
        method = "get",
        tag = "ApiProjectDetailTags::ProjectDetail"
    )]
    async fn get_project_detail_api(
        &self,
        Query(id): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
    ) -> ProjectDetailResponses {
        let Some(project_id) = id.and_then(|x| Uuid::parse_str(x.trim()).ok()) else {
            return ProjectDetailResponses::BadRequest(Json(BadRequestResponse::new(
                "invalid project id",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProjectDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.project_detail",
                        "get_project_detail_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        let detail = match get_project_with_attachments(&mut tx, &project_id).await {
            Ok(val) => val,
            Err(err) => {
                return ProjectDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.project_detail",
                        "get_project_detail_api",
                        "get project with attachments",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some((project, attachments)) = detail else {
            return ProjectDetailResponses::NotFound(Json(NotFoundResponse::new(
                "project not found",
            )));
        };

        let profile = match get_profile_by_id(&mut tx, &project.project.owner_id).await {
            Ok(val) => val,
            Err(err) => {
                return ProjectDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.project_detail",
                        "get_project_detail_api",
                        "get owner profile",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let identity = match get_identity_by_id(&mut tx, &project.owner_identity_id).await {
            Ok(val) => val,
            Err(err) => {
                return ProjectDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.project_detail",
                        "get_project_detail_api",
                        "get owner identity",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let (Some(profile), Some(identity)) = (profile, identity) else {
            return ProjectDetailResponses::NotFound(Json(NotFoundResponse::new(
                "project owner not found",
            )));
        };

        let owner = ProjectDetailOwner {
            id: identity.id.to_string(),
            name: profile
                .full_name
                .or(identity.name)
                .unwrap_or(UNKNOWN_OWNER_NAME.to_string()),
            email: identity.email,
            phone: profile.phone,
            age: profile.age,
            linkedin: profile.linkedin,
            academic_cv_url: profile.academic_cv_url,
            avatar_url: profile.avatar_url.or(identity.image),
            bio: profile.bio,
            category: profile.category,
        };
        ProjectDetailResponses::Ok(Json(ProjectDetailResponse {
            attachments: attachments.iter().map(AttachmentDetail::from).collect(),
            project: ProjectFeedItem::new(project, &attachments),
            owner,
        }))
    }
}
