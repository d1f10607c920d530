use std::sync::Arc;

use poem::{
    middleware::{AddData, Cors},
    web::Json,
    Endpoint, EndpointExt, IntoResponse, Response, Route,
};
use poem_openapi::OpenApiService;
use r2d2::Pool as r2d2Pool;
use redis::Client;
use route::{
    auth::ApiAuth, profile::ApiProfile, project::ApiProject, project_detail::ApiProjectDetail,
    upload::ApiUpload,
};
use serde_json::json;
use settings::Config;
use sqlx::{Pool, Postgres};

use crate::core::upload::UploadGateway;

pub mod cli;
pub mod core;
pub mod factory;
pub mod model;
pub mod repository;
pub mod route;
pub mod schema;
pub mod settings;

pub struct AppState {
    pub db: Pool<Postgres>,
    pub redis_conn: r2d2Pool<Client>,
    pub config: Config,
    pub upload_gateway: Arc<dyn UploadGateway>,
}

/// Errors raised by poem itself (unknown verb, unparsable body, missing
/// bearer, unknown path) keep their status but get the `{ "error" }` body.
async fn render_error(err: poem::Error) -> Response {
    let status = err.status();
    let message = if status.is_server_error() {
        tracing::error!("unhandled error: {}", err);
        "internal server error".to_string()
    } else {
        err.to_string()
    };
    Json(json!({ "error": message }))
        .with_status(status)
        .into_response()
}

pub fn init_openapi_route(app_state: Arc<AppState>) -> impl Endpoint {
    let prefix = app_state
        .config
        .prefix
        .clone()
        .unwrap_or("/api".to_string());
    let openapi_route = OpenApiService::new(
        (ApiAuth, ApiProfile, ApiProject, ApiProjectDetail, ApiUpload),
        "Jornalista 360",
        "1.0",
    )
    .server(prefix.clone());
    let openapi_json_endpoint = openapi_route.spec_endpoint();
    let ui = openapi_route.swagger_ui();
    Route::new()
        .nest(prefix, openapi_route)
        .nest("/docs", ui)
        .at("openapi.json", openapi_json_endpoint)
        .with(AddData::new(app_state))
        .with(Cors::new())
        .catch_all_error(render_error)
}
