use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    security::{generate_refresh_token_from_identity, generate_token_from_identity},
    session::add_session,
    upload::UploadGateway,
};
use crate::{
    model::user_identity::UserIdentity, repository::user_identity::upsert_identity,
    settings::Config, AppState,
};

/// Upload gateway that never leaves the process. URLs are derived from the
/// file name so tests can predict them.
#[derive(Default)]
pub struct FakeUploadGateway {
    pub fail: bool,
}

#[async_trait]
impl UploadGateway for FakeUploadGateway {
    async fn upload(
        &self,
        file_name: &str,
        _content_type: Option<&str>,
        content: Vec<u8>,
    ) -> anyhow::Result<String> {
        if self.fail {
            anyhow::bail!("upload gateway unavailable");
        }
        Ok(format!(
            "https://cdn.test/{}/{}",
            content.len(),
            file_name
        ))
    }
}

pub fn init_test_app_state(pool: PgPool, config: Config) -> Arc<AppState> {
    init_test_app_state_with_gateway(pool, config, Arc::new(FakeUploadGateway::default()))
}

pub fn init_test_app_state_with_gateway(
    pool: PgPool,
    config: Config,
    upload_gateway: Arc<dyn UploadGateway>,
) -> Arc<AppState> {
    let client = redis::Client::open(config.redis_url.clone()).unwrap();
    let redis_pool = r2d2::Pool::builder().build(client).unwrap();
    Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
        config,
        upload_gateway,
    })
}

pub struct TestIdentity {
    pub identity: UserIdentity,
    pub token: String,
    pub refresh_token: String,
}

/// Creates an identity as a first login would and opens a session for it.
/// The profile is left to the lazy creation path.
pub async fn generate_test_identity(
    app_state: &AppState,
    email: &str,
) -> anyhow::Result<TestIdentity> {
    let mut tx = app_state.db.begin().await?;
    let name = email.split('@').next().map(|x| x.to_string());
    let identity = upsert_identity(
        &mut tx,
        email,
        name,
        Some(format!("https://lh3.googleusercontent.com/a/{}", email)),
        None,
    )
    .await?;
    tx.commit().await?;

    let token = generate_token_from_identity(&identity, &app_state.config)?;
    let refresh_token = generate_refresh_token_from_identity(&identity, &app_state.config)?;
    let mut redis_conn = app_state.redis_conn.get()?;
    add_session(
        &mut redis_conn,
        &identity,
        &app_state.config,
        token.clone(),
        refresh_token.clone(),
    )?;

    Ok(TestIdentity {
        identity,
        token,
        refresh_token,
    })
}
