use poem_openapi::Enum;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.attachment";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum, sqlx::Type)]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "media_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Photo,
    Pdf,
    /// Holds a YouTube link rather than an uploaded file.
    Video,
}

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Attachment {
    pub id: Uuid,
    pub project_id: Uuid,
    pub url: String,
    pub media_type: MediaType,
    pub position: i32,
}

/// Attachment about to be inserted; position follows slice order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAttachment {
    pub url: String,
    pub media_type: MediaType,
}
