use chrono::{DateTime, FixedOffset};
use poem_openapi::Enum;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.profile";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Enum, sqlx::Type)]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_category", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserCategory {
    #[default]
    Student,
    Teacher,
    Graduate,
    Recruiter,
}

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub identity_id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub cpf: Option<String>,
    pub age: Option<i32>,
    pub linkedin: Option<String>,
    pub academic_cv_url: Option<String>,
    pub bio: Option<String>,
    pub category: UserCategory,
    pub avatar_url: Option<String>,
    pub auto_created: bool,
    pub created_date: DateTime<FixedOffset>,
    pub updated_date: DateTime<FixedOffset>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProfileValidationError {
    #[error("age must be a non-negative integer")]
    InvalidAge,
}

/// Partial update of the editable profile fields; email and avatar are not
/// among them. `None` leaves a field untouched, `Some(None)` clears it.
#[derive(Clone, Debug, Default)]
pub struct ProfileChanges {
    pub full_name: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub cpf: Option<Option<String>>,
    pub age: Option<Option<i32>>,
    pub linkedin: Option<Option<String>>,
    pub academic_cv_url: Option<Option<String>>,
    pub bio: Option<Option<String>>,
    pub category: Option<UserCategory>,
}

impl Profile {
    pub fn apply_changes(&mut self, changes: ProfileChanges) {
        if let Some(val) = changes.full_name {
            self.full_name = val;
        }
        if let Some(val) = changes.phone {
            self.phone = val;
        }
        if let Some(val) = changes.cpf {
            self.cpf = val;
        }
        if let Some(val) = changes.age {
            self.age = val;
        }
        if let Some(val) = changes.linkedin {
            self.linkedin = val;
        }
        if let Some(val) = changes.academic_cv_url {
            self.academic_cv_url = val;
        }
        if let Some(val) = changes.bio {
            self.bio = val;
        }
        if let Some(val) = changes.category {
            self.category = val;
        }
    }
}

/// Age arrives either as a JSON number or as the text of a form field. An
/// empty string means no age.
pub fn parse_age(value: &serde_json::Value) -> Result<Option<i32>, ProfileValidationError> {
    let age = match value {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::Number(n) => n.as_i64().ok_or(ProfileValidationError::InvalidAge)?,
        serde_json::Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<i64>()
                .map_err(|_| ProfileValidationError::InvalidAge)?
        }
        _ => return Err(ProfileValidationError::InvalidAge),
    };
    if age < 0 || age > i32::MAX as i64 {
        return Err(ProfileValidationError::InvalidAge);
    }
    Ok(Some(age as i32))
}
