use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.user_identity";

/// Login identity owned by the identity provider. Read-only to the rest of
/// the service once created.
#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub created_date: DateTime<FixedOffset>,
}
