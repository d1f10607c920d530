use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::{
        caller::{authenticate_caller, CallerError},
        classifier::{validate_project_input, AttachmentBuckets},
        security::BearerAuthorization,
        utils::clean_urls,
    },
    model::project::{ProjectCategory, ProjectWithOwner},
    repository::{
        attachment::get_attachments_by_project_ids,
        project::{
            create_project, delete_project, get_project_by_id, list_projects, update_project,
        },
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, MessageResponse,
            NotFoundResponse, UnauthorizedResponse,
        },
        project::{
            build_feed, ProjectCreateRequest, ProjectCreateResponses, ProjectDeleteRequest,
            ProjectDeleteResponses, ProjectListResponses, ProjectUpdateRequest,
            ProjectUpdateResponses, ProjectWithAttachmentsResponse,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiProjectTags {
    Project,
}

pub struct ApiProject;

/// Empty after trimming means no search.
fn normalize_search(search: Option<String>) -> Option<String> {
    search
        .map(|x| x.trim().to_lowercase())
        .filter(|x| !x.is_empty())
}

/// Unknown values disable the filter instead of failing the request.
fn parse_category_filter(category: Option<String>) -> Option<ProjectCategory> {
    category.and_then(|x| x.parse::<ProjectCategory>().ok())
}

#[OpenApi]
impl ApiProject {
    /// Public feed, newest first.
    #[oai(path = "/projects", method = "get", tag = "ApiProjectTags::Project")]
    async fn list_projects_api(
        &self,
        Query(search): Query<Option<String>>,
        #[oai(name = "type")] Query(category): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
    ) -> ProjectListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProjectListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.project",
                        "list_projects_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        let projects = match list_projects(
            &mut tx,
            normalize_search(search),
            parse_category_filter(category),
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return ProjectListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.project",
                        "list_projects_api",
                        "list projects",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let project_ids: Vec<Uuid> = projects.iter().map(|x| x.project.id).collect();
        let attachments = match get_attachments_by_project_ids(&mut tx, &project_ids).await {
            Ok(val) => val,
            Err(err) => {
                return ProjectListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.project",
                        "list_projects_api",
                        "get attachments",
                        &err.to_string(),
                    ),
                ))
            }
        };

        ProjectListResponses::Ok(Json(build_feed(projects, attachments)))
    }

    #[oai(path = "/projects", method = "post", tag = "ApiProjectTags::Project")]
    async fn create_project_api(
        &self,
        json: Json<ProjectCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProjectCreateResponses {
        let caller = match authenticate_caller(&state, auth.0.token).await {
            Ok(val) => val,
            Err(CallerError::Unauthenticated) => {
                return ProjectCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(err @ CallerError::IdentityNotFound(_)) => {
                return ProjectCreateResponses::NotFound(Json(NotFoundResponse::new(
                    err.to_string(),
                )))
            }
            Err(CallerError::Internal(err)) => {
                return ProjectCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.project",
                        "create_project_api",
                        "authenticate caller",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let Json(payload) = json;
        let buckets = AttachmentBuckets::new(
            clean_urls(payload.image_urls),
            clean_urls(payload.pdf_urls),
            clean_urls(payload.youtube_links),
        );
        let category = match validate_project_input(&payload.title, &buckets) {
            Ok(val) => val,
            Err(err) => {
                return ProjectCreateResponses::BadRequest(Json(BadRequestResponse::new(
                    err.to_string(),
                )))
            }
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProjectCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.project",
                        "create_project_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        let (project, attachments) = match create_project(
            &mut tx,
            &caller.profile.id,
            payload.title,
            payload.description,
            category,
            &buckets.to_new_attachments(),
            None,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return ProjectCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.project",
                        "create_project_api",
                        "create project",
                        &err.to_string(),
                    ),
                ))
            }
        };

        if let Err(err) = tx.commit().await {
            return ProjectCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.project",
                    "create_project_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        tracing::info!(
            "profile {} created project {} ({})",
            caller.profile.id,
            project.id,
            project.category.as_str()
        );

        let project = ProjectWithOwner {
            project,
            owner_identity_id: caller.identity.id,
            owner_name: caller.identity.name,
        };
        ProjectCreateResponses::Created(Json(ProjectWithAttachmentsResponse::new(
            project,
            &attachments,
        )))
    }

    /// Replaces title, description and the whole attachment set.
    #[oai(path = "/projects", method = "put", tag = "ApiProjectTags::Project")]
    async fn update_project_api(
        &self,
        json: Json<ProjectUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProjectUpdateResponses {
        let caller = match authenticate_caller(&state, auth.0.token).await {
            Ok(val) => val,
            Err(CallerError::Unauthenticated) => {
                return ProjectUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(err @ CallerError::IdentityNotFound(_)) => {
                return ProjectUpdateResponses::NotFound(Json(NotFoundResponse::new(
                    err.to_string(),
                )))
            }
            Err(CallerError::Internal(err)) => {
                return ProjectUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.project",
                        "update_project_api",
                        "authenticate caller",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let Json(payload) = json;
        let Ok(project_id) = Uuid::parse_str(payload.id.trim()) else {
            return ProjectUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                "invalid project id",
            )));
        };
        let buckets = AttachmentBuckets::new(
            clean_urls(payload.image_urls),
            clean_urls(payload.pdf_urls),
            clean_urls(payload.youtube_links),
        );
        let category = match validate_project_input(&payload.title, &buckets) {
            Ok(val) => val,
            Err(err) => {
                return ProjectUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                    err.to_string(),
                )))
            }
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProjectUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.project",
                        "update_project_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        let project = match get_project_by_id(&mut tx, &project_id).await {
            Ok(val) => val,
            Err(err) => {
                return ProjectUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.project",
                        "update_project_api",
                        "get project by id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(mut project) = project else {
            return ProjectUpdateResponses::NotFound(Json(NotFoundResponse::new(
                "project not found",
            )));
        };
        if state.config.enforce_project_ownership && project.project.owner_id != caller.profile.id
        {
            return ProjectUpdateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let attachments = match update_project(
            &mut tx,
            &mut project.project,
            payload.title,
            payload.description,
            category,
            &buckets.to_new_attachments(),
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return ProjectUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.project",
                        "update_project_api",
                        "update project",
                        &err.to_string(),
                    ),
                ))
            }
        };

        if let Err(err) = tx.commit().await {
            return ProjectUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.project",
                    "update_project_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        tracing::info!(
            "profile {} updated project {}",
            caller.profile.id,
            project.project.id
        );
        ProjectUpdateResponses::Ok(Json(ProjectWithAttachmentsResponse::new(
            project,
            &attachments,
        )))
    }

    #[oai(path = "/projects", method = "delete", tag = "ApiProjectTags::Project")]
    async fn delete_project_api(
        &self,
        json: Json<ProjectDeleteRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProjectDeleteResponses {
        let caller = match authenticate_caller(&state, auth.0.token).await {
            Ok(val) => val,
            Err(CallerError::Unauthenticated) => {
                return ProjectDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(err @ CallerError::IdentityNotFound(_)) => {
                return ProjectDeleteResponses::NotFound(Json(NotFoundResponse::new(
                    err.to_string(),
                )))
            }
            Err(CallerError::Internal(err)) => {
                return ProjectDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.project",
                        "delete_project_api",
                        "authenticate caller",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let Ok(project_id) = Uuid::parse_str(json.id.trim()) else {
            return ProjectDeleteResponses::BadRequest(Json(BadRequestResponse::new(
                "invalid project id",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProjectDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.project",
                        "delete_project_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        let project = match get_project_by_id(&mut tx, &project_id).await {
            Ok(val) => val,
            Err(err) => {
                return ProjectDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.project",
                        "delete_project_api",
                        "get project by id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(project) = project else {
            return ProjectDeleteResponses::NotFound(Json(NotFoundResponse::new(
                "project not found",
            )));
        };
        if state.config.enforce_project_ownership && project.project.owner_id != caller.profile.id
        {
            return ProjectDeleteResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        if let Err(err) = delete_project(&mut tx, &project_id).await {
            return ProjectDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.project",
                    "delete_project_api",
                    "delete project",
                    &err.to_string(),
                ),
            ));
        }

        if let Err(err) = tx.commit().await {
            return ProjectDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.project",
                    "delete_project_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        tracing::info!("profile {} deleted project {}", caller.profile.id, project_id);
        ProjectDeleteResponses::Ok(Json(MessageResponse {
            message: "project deleted".to_string(),
        }))
    }
}
