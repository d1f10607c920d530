use redis::ConnectionLike;
use serde::{Deserialize, Serialize};

use crate::{model::user_identity::UserIdentity, settings::Config};

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub identity_id: String,
    pub refresh_token: String,
}

/// Stores the session under the access token; it expires with the token.
pub fn add_session<C: ConnectionLike>(
    redis_conn: &mut C,
    identity: &UserIdentity,
    config: &Config,
    token: String,
    refresh_token: String,
) -> anyhow::Result<()> {
    let session_data = SessionData {
        identity_id: identity.id.to_string(),
        refresh_token,
    };
    let session_json = serde_json::to_string(&session_data)?;
    let ttl_seconds = config.jwt_exp as u64 * 60;
    redis::Cmd::set_ex(token, session_json, ttl_seconds).exec(redis_conn)?;
    Ok(())
}

pub fn get_session<C: ConnectionLike>(
    redis_conn: &mut C,
    token: &str,
) -> anyhow::Result<Option<SessionData>> {
    let res: Option<String> = redis::cmd("GET").arg(token).query(redis_conn)?;
    let Some(res) = res else {
        return Ok(None);
    };
    let session_data: SessionData = serde_json::from_str(res.as_str())?;
    Ok(Some(session_data))
}

/// Returns `false` when there was no session for the token.
pub fn remove_session<C: ConnectionLike>(
    redis_conn: &mut C,
    token: &str,
) -> anyhow::Result<bool> {
    let removed: i64 = redis::cmd("DEL").arg(token).query(redis_conn)?;
    Ok(removed > 0)
}
