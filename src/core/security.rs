use chrono::{DateTime, Duration, FixedOffset, Local};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use poem::Request;
use poem_openapi::{auth::Bearer, SecurityScheme};
use redis::ConnectionLike;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    model::user_identity::UserIdentity, repository::user_identity::get_identity_by_id,
    settings::Config,
};

use super::session::{add_session, get_session};

pub struct Keys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Login assertion signed by the identity provider with the shared
/// `identity_secret`. Only `email` is mandatory.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IdentityAssertion {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub exp: i64,
}

#[cfg(test)]
pub fn encode_identity_assertion(
    assertion: &IdentityAssertion,
    identity_secret: &str,
) -> anyhow::Result<String> {
    let keys = Keys::new(identity_secret.as_bytes());
    let token = encode(&Header::default(), assertion, &keys.encoding)?;
    Ok(token)
}

/// Verifies signature and expiry of a login assertion.
pub fn decode_identity_assertion(
    token: &str,
    identity_secret: &str,
) -> anyhow::Result<IdentityAssertion> {
    let keys = Keys::new(identity_secret.as_bytes());
    let token_data = decode::<IdentityAssertion>(token, &keys.decoding, &Validation::default())?;
    if token_data.claims.email.trim().is_empty() {
        anyhow::bail!("identity assertion without email");
    }
    Ok(token_data.claims)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub email: String,
    pub exp: i64,
}

impl Claims {
    pub fn new(identity_id: &str, email: &str, config: &Config) -> Self {
        let exp = (Local::now() + Duration::minutes(config.jwt_exp as i64)).timestamp();

        Self {
            id: identity_id.to_string(),
            email: email.to_string(),
            exp,
        }
    }
}

/// Generate token
pub fn encode_token(claims: &Claims, jwt_secret: &str) -> anyhow::Result<String> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token = encode(&Header::default(), &claims, &keys.encoding)?;
    Ok(token)
}

/// Extract payload and Validate token
pub fn decode_token(token: &str, jwt_secret: &str) -> anyhow::Result<Claims> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &keys.decoding, &Validation::default())?;
    Ok(token_data.claims)
}

pub fn generate_token_from_identity(
    identity: &UserIdentity,
    config: &Config,
) -> anyhow::Result<String> {
    let claims = Claims::new(&identity.id.to_string(), &identity.email, config);
    encode_token(&claims, &config.jwt_secret)
}

/// Identity id stored in the redis session for `jwt_token`, if any.
pub fn get_identity_id_from_token<C: ConnectionLike>(
    redis_conn: &mut C,
    jwt_token: &str,
) -> anyhow::Result<Option<Uuid>> {
    let Some(session) = get_session(redis_conn, jwt_token)? else {
        return Ok(None);
    };
    let identity_id = Uuid::parse_str(&session.identity_id)?;
    Ok(Some(identity_id))
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClaimsRefresh {
    pub id: String,
    pub email: String,
    pub exp: i64,
    pub type_key: String,
}

impl ClaimsRefresh {
    pub fn new(identity_id: &str, email: &str, config: &Config) -> Self {
        let exp = (Local::now() + Duration::minutes(config.jwt_refresh_exp as i64)).timestamp();

        Self {
            id: identity_id.to_string(),
            email: email.to_string(),
            exp,
            type_key: "refresh".to_string(),
        }
    }
}

/// Generate refresh token
pub fn encode_refresh_token(claims: &ClaimsRefresh, jwt_secret: &str) -> anyhow::Result<String> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token = encode(&Header::default(), &claims, &keys.encoding)?;
    Ok(token)
}

/// Extract payload and Validate referesh token
pub fn decode_refresh_token(token: &str, jwt_secret: &str) -> anyhow::Result<ClaimsRefresh> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token_data = decode::<ClaimsRefresh>(token, &keys.decoding, &Validation::default())?;
    if token_data.claims.type_key != "refresh" {
        anyhow::bail!("not a refresh token");
    }
    Ok(token_data.claims)
}

pub fn generate_refresh_token_from_identity(
    identity: &UserIdentity,
    config: &Config,
) -> anyhow::Result<String> {
    let claims = ClaimsRefresh::new(&identity.id.to_string(), &identity.email, config);
    encode_refresh_token(&claims, &config.jwt_secret)
}

/// `Ok(None)` for a malformed, expired or foreign refresh token, or when the
/// identity behind it no longer exists.
pub async fn get_identity_from_refresh_token(
    tx: &mut Transaction<'_, Postgres>,
    refresh_token: &str,
    config: &Config,
) -> anyhow::Result<Option<UserIdentity>> {
    let claims = match decode_refresh_token(refresh_token, &config.jwt_secret) {
        Ok(val) => val,
        Err(err) => {
            tracing::debug!("rejected refresh token: {}", err);
            return Ok(None);
        }
    };
    let identity_id = Uuid::parse_str(&claims.id)?;
    get_identity_by_id(tx, &identity_id).await
}

/// Token pair handed out by login, refresh and the `auth issue-token` command.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub token: String,
    pub refresh_token: String,
    pub exp: DateTime<FixedOffset>,
    pub exp_refresh_token: DateTime<FixedOffset>,
}

/// Signs a fresh token pair for the identity and opens its redis session.
pub fn issue_tokens<C: ConnectionLike>(
    redis_conn: &mut C,
    identity: &UserIdentity,
    config: &Config,
) -> anyhow::Result<IssuedTokens> {
    let now = Local::now().fixed_offset();
    let token = generate_token_from_identity(identity, config)?;
    let refresh_token = generate_refresh_token_from_identity(identity, config)?;
    add_session(
        redis_conn,
        identity,
        config,
        token.clone(),
        refresh_token.clone(),
    )?;
    Ok(IssuedTokens {
        token,
        refresh_token,
        exp: now + Duration::minutes(config.jwt_exp as i64),
        exp_refresh_token: now + Duration::minutes(config.jwt_refresh_exp as i64),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserApiKey {
    pub token: Option<String>,
}

/// ApiKey authorization
#[derive(SecurityScheme)]
#[oai(ty = "bearer", checker = "bearer_checker")]
pub struct BearerAuthorization(pub UserApiKey);

pub async fn bearer_checker(_req: &Request, api_key: Bearer) -> Option<UserApiKey> {
    Some(UserApiKey {
        token: Some(api_key.token),
    })
}
