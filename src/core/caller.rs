use thiserror::Error;
use uuid::Uuid;

use crate::{
    core::security::get_identity_id_from_token,
    model::{profile::Profile, user_identity::UserIdentity},
    repository::{profile::get_or_create_profile, user_identity::get_identity_by_id},
    AppState,
};

/// The authenticated identity behind a request together with its profile.
#[derive(Clone, Debug)]
pub struct Caller {
    pub identity: UserIdentity,
    pub profile: Profile,
}

#[derive(Debug, Error)]
pub enum CallerError {
    #[error("no authenticated session")]
    Unauthenticated,
    #[error("identity {0} not found")]
    IdentityNotFound(Uuid),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Single entry point for every authenticated handler: bearer token, redis
/// session, identity row, then the lazily created profile. The profile is
/// committed here so it survives a later failure of the handler's own work.
pub async fn authenticate_caller(
    state: &AppState,
    jwt_token: Option<String>,
) -> Result<Caller, CallerError> {
    let Some(jwt_token) = jwt_token else {
        return Err(CallerError::Unauthenticated);
    };

    let mut redis_conn = state.redis_conn.get().map_err(anyhow::Error::from)?;
    let Some(identity_id) = get_identity_id_from_token(&mut redis_conn, &jwt_token)? else {
        return Err(CallerError::Unauthenticated);
    };

    let mut tx = state.db.begin().await.map_err(anyhow::Error::from)?;
    let Some(identity) = get_identity_by_id(&mut tx, &identity_id).await? else {
        return Err(CallerError::IdentityNotFound(identity_id));
    };
    let profile = get_or_create_profile(&mut tx, &identity, None).await?;
    tx.commit().await.map_err(anyhow::Error::from)?;
    Ok(Caller { identity, profile })
}
