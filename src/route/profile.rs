use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{payload::Json, types::MaybeUndefined, OpenApi, Tags};

use crate::{
    core::{
        caller::{authenticate_caller, CallerError},
        security::BearerAuthorization,
    },
    model::profile::{parse_age, ProfileChanges},
    repository::{
        attachment::get_attachments_by_project_ids,
        profile::{get_profile_by_id_for_update, update_profile},
        project::get_projects_by_owner_id,
    },
    schema::{
        common::{
            BadRequestResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
        profile::{
            ProfileDetail, ProfileGetResponses, ProfileUpdateRequest, ProfileUpdateResponses,
            ProfileWithProjectsResponse,
        },
        project::build_feed,
    },
    AppState,
};

#[derive(Tags)]
enum ApiProfileTags {
    Profile,
}

pub struct ApiProfile;

fn tri_state<T>(value: MaybeUndefined<T>) -> Option<Option<T>> {
    match value {
        MaybeUndefined::Undefined => None,
        MaybeUndefined::Null => Some(None),
        MaybeUndefined::Value(val) => Some(Some(val)),
    }
}

#[OpenApi]
impl ApiProfile {
    /// The caller's profile with every project it owns, newest first.
    #[oai(path = "/profile", method = "get", tag = "ApiProfileTags::Profile")]
    async fn get_profile_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProfileGetResponses {
        let caller = match authenticate_caller(&state, auth.0.token).await {
            Ok(val) => val,
            Err(CallerError::Unauthenticated) => {
                return ProfileGetResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(err @ CallerError::IdentityNotFound(_)) => {
                return ProfileGetResponses::NotFound(Json(NotFoundResponse::new(
                    err.to_string(),
                )))
            }
            Err(CallerError::Internal(err)) => {
                return ProfileGetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "get_profile_api",
                        "authenticate caller",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProfileGetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "get_profile_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        let projects = match get_projects_by_owner_id(&mut tx, &caller.profile.id).await {
            Ok(val) => val,
            Err(err) => {
                return ProfileGetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "get_profile_api",
                        "get projects by owner",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let project_ids: Vec<_> = projects.iter().map(|x| x.project.id).collect();
        let attachments = match get_attachments_by_project_ids(&mut tx, &project_ids).await {
            Ok(val) => val,
            Err(err) => {
                return ProfileGetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "get_profile_api",
                        "get attachments",
                        &err.to_string(),
                    ),
                ))
            }
        };

        ProfileGetResponses::Ok(Json(ProfileWithProjectsResponse {
            profile: ProfileDetail::from(&caller),
            projects: build_feed(projects, attachments),
        }))
    }

    #[oai(path = "/profile", method = "put", tag = "ApiProfileTags::Profile")]
    async fn update_profile_api(
        &self,
        json: Json<ProfileUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProfileUpdateResponses {
        let mut caller = match authenticate_caller(&state, auth.0.token).await {
            Ok(val) => val,
            Err(CallerError::Unauthenticated) => {
                return ProfileUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(err @ CallerError::IdentityNotFound(_)) => {
                return ProfileUpdateResponses::NotFound(Json(NotFoundResponse::new(
                    err.to_string(),
                )))
            }
            Err(CallerError::Internal(err)) => {
                return ProfileUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "update_profile_api",
                        "authenticate caller",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let Json(payload) = json;
        let age = match payload.age {
            MaybeUndefined::Undefined => None,
            MaybeUndefined::Null => Some(None),
            MaybeUndefined::Value(val) => match parse_age(&val) {
                Ok(val) => Some(val),
                Err(err) => {
                    return ProfileUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                        err.to_string(),
                    )))
                }
            },
        };
        let changes = ProfileChanges {
            full_name: tri_state(payload.name),
            phone: tri_state(payload.phone),
            cpf: tri_state(payload.cpf),
            age,
            linkedin: tri_state(payload.linkedin),
            academic_cv_url: tri_state(payload.academic_cv_url),
            bio: tri_state(payload.bio),
            category: payload.category,
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProfileUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "update_profile_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        let profile = match get_profile_by_id_for_update(&mut tx, &caller.profile.id).await {
            Ok(val) => val,
            Err(err) => {
                return ProfileUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "update_profile_api",
                        "lock profile",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(profile) = profile else {
            return ProfileUpdateResponses::NotFound(Json(NotFoundResponse::new(
                "profile not found",
            )));
        };
        caller.profile = profile;
        caller.profile.apply_changes(changes);

        if let Err(err) = update_profile(&mut tx, &mut caller.profile, None).await {
            return ProfileUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.profile",
                    "update_profile_api",
                    "update profile",
                    &err.to_string(),
                ),
            ));
        }

        if let Err(err) = tx.commit().await {
            return ProfileUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.profile",
                    "update_profile_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        ProfileUpdateResponses::Ok(Json(ProfileDetail::from(&caller)))
    }
}
