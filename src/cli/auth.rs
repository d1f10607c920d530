use redis::ConnectionLike;
use sqlx::PgPool;

use crate::{
    core::security::{issue_tokens, IssuedTokens},
    repository::user_identity::upsert_identity,
    settings::Config,
};

/// Opens a session for `email` without going through the identity provider,
/// creating the identity on first use.
pub async fn issue_token<C: ConnectionLike>(
    pool: &PgPool,
    redis_conn: &mut C,
    config: &Config,
    email: &str,
    name: Option<String>,
    image: Option<String>,
) -> anyhow::Result<IssuedTokens> {
    let email = email.trim();
    if email.is_empty() {
        anyhow::bail!("email is required");
    }
    let mut tx = pool.begin().await?;
    let identity = upsert_identity(&mut tx, email, name, image, None).await?;
    tx.commit().await?;
    issue_tokens(redis_conn, &identity, config)
}
