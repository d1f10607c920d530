use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::{
    core::{
        security::{
            decode_identity_assertion, get_identity_from_refresh_token,
            get_identity_id_from_token, issue_tokens, BearerAuthorization, IssuedTokens,
        },
        session::remove_session,
        utils::datetime_to_string,
    },
    repository::user_identity::upsert_identity,
    schema::{
        auth::{
            LoginRequest, LoginResponse, LoginResponses, LogoutResponses, RefreshTokenRequest,
            RefreshTokenResponses,
        },
        common::{InternalServerErrorResponse, UnauthorizedResponse},
    },
    AppState,
};

#[derive(Tags)]
enum ApiAuthTags {
    Auth,
}

pub struct ApiAuth;

fn login_response(tokens: IssuedTokens, jwt_exp: u16) -> LoginResponse {
    LoginResponse {
        exp: datetime_to_string(tokens.exp),
        exp_in: jwt_exp as i64 * 60,
        exp_refresh_token: datetime_to_string(tokens.exp_refresh_token),
        refresh_token: tokens.refresh_token,
        token: tokens.token,
        token_type: "Bearer".to_string(),
    }
}

#[OpenApi]
impl ApiAuth {
    /// Exchanges an identity provider assertion for a session.
    #[oai(path = "/auth/login", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_login(
        &self,
        json: Json<LoginRequest>,
        state: Data<&Arc<AppState>>,
    ) -> LoginResponses {
        let assertion =
            match decode_identity_assertion(&json.id_token, &state.config.identity_secret) {
                Ok(val) => val,
                Err(err) => {
                    tracing::info!("rejected identity assertion: {}", err);
                    return LoginResponses::Unauthorized(Json(UnauthorizedResponse::default()));
                }
            };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_login",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        let identity = match upsert_identity(
            &mut tx,
            assertion.email.trim(),
            assertion.name,
            assertion.picture,
            None,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_login",
                        "upsert identity",
                        &err.to_string(),
                    ),
                ));
            }
        };

        if let Err(err) = tx.commit().await {
            return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_login",
                "commit transaction",
                &err.to_string(),
            )));
        }

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_login",
                    "get redis pool connection",
                    &err.to_string(),
                )))
            }
        };

        let tokens = match issue_tokens(&mut redis_conn, &identity, &state.config) {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_login",
                    "issue tokens",
                    &err.to_string(),
                )))
            }
        };
        tracing::info!("identity {} logged in", identity.id);
        LoginResponses::Ok(Json(login_response(tokens, state.config.jwt_exp)))
    }

    #[oai(
        path = "/auth/refresh-token",
        method = "post",
        tag = "ApiAuthTags::Auth"
    )]
    async fn auth_refresh_token(
        &self,
        json: Json<RefreshTokenRequest>,
        state: Data<&Arc<AppState>>,
    ) -> RefreshTokenResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        let identity =
            match get_identity_from_refresh_token(&mut tx, &json.refresh_token, &state.config)
                .await
            {
                Ok(val) => val,
                Err(err) => {
                    return RefreshTokenResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.auth",
                            "auth_refresh_token",
                            "get identity from refresh token",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        let Some(identity) = identity else {
            return RefreshTokenResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let tokens = match issue_tokens(&mut redis_conn, &identity, &state.config) {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "issue tokens",
                        &err.to_string(),
                    ),
                ))
            }
        };
        RefreshTokenResponses::Ok(Json(login_response(tokens, state.config.jwt_exp)))
    }

    #[oai(path = "/auth/logout", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_logout(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LogoutResponses {
        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return LogoutResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_logout",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate session token
        let Some(jwt_token) = auth.0.token else {
            return LogoutResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        let identity_id = match get_identity_id_from_token(&mut redis_conn, &jwt_token) {
            Ok(val) => val,
            Err(err) => {
                return LogoutResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_logout",
                        "get identity from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if identity_id.is_none() {
            return LogoutResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        if let Err(err) = remove_session(&mut redis_conn, &jwt_token) {
            return LogoutResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_logout",
                "remove session",
                &err.to_string(),
            )));
        }
        LogoutResponses::NoContent
    }
}
