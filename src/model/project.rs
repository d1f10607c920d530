use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use poem_openapi::Enum;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.project";

/// Classification derived from the attachment mix, never taken from callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum, sqlx::Type)]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "project_category", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectCategory {
    Multimedia,
    Text,
    Video,
    Photos,
}

impl ProjectCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectCategory::Multimedia => "MULTIMEDIA",
            ProjectCategory::Text => "TEXT",
            ProjectCategory::Video => "VIDEO",
            ProjectCategory::Photos => "PHOTOS",
        }
    }
}

impl FromStr for ProjectCategory {
    type Err = ();

    /// Accepts the wire names only, surrounding whitespace and case ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MULTIMEDIA" => Ok(ProjectCategory::Multimedia),
            "TEXT" => Ok(ProjectCategory::Text),
            "VIDEO" => Ok(ProjectCategory::Video),
            "PHOTOS" => Ok(ProjectCategory::Photos),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: ProjectCategory,
    pub created_date: DateTime<FixedOffset>,
}

/// A project joined with the identity behind its owning profile, as shown in
/// the feed.
#[derive(Clone, Debug, FromRow)]
pub struct ProjectWithOwner {
    #[sqlx(flatten)]
    pub project: Project,
    pub owner_identity_id: Uuid,
    pub owner_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_filter() {
        assert_eq!(
            " video ".parse::<ProjectCategory>(),
            Ok(ProjectCategory::Video)
        );
        assert_eq!(
            "Photos".parse::<ProjectCategory>(),
            Ok(ProjectCategory::Photos)
        );
        assert!("BOGUS".parse::<ProjectCategory>().is_err());
        assert!("".parse::<ProjectCategory>().is_err());
    }
}
