use std::collections::HashMap;

use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{
    BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, MessageResponse,
    NotFoundResponse, UnauthorizedResponse,
};
use crate::{
    core::{
        classifier::{AttachmentBuckets, PreviewKind},
        utils::datetime_to_string,
    },
    model::{
        attachment::{Attachment, MediaType},
        profile::UserCategory,
        project::{ProjectCategory, ProjectWithOwner},
    },
};

pub const UNKNOWN_OWNER_NAME: &str = "Unknown user";

#[derive(Object, Deserialize, Serialize)]
pub struct ProjectOwner {
    pub id: String,
    pub name: String,
}

#[derive(Object, Deserialize, Serialize)]
pub struct ProjectPreview {
    pub kind: PreviewKind,
    pub url: String,
}

#[derive(Object, Deserialize, Serialize)]
#[oai(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct AttachmentDetail {
    pub id: String,
    pub url: String,
    pub media_type: MediaType,
}

impl From<&Attachment> for AttachmentDetail {
    fn from(value: &Attachment) -> Self {
        Self {
            id: value.id.to_string(),
            url: value.url.clone(),
            media_type: value.media_type,
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
#[oai(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct ProjectFeedItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: ProjectCategory,
    pub created_at: String,
    pub image_urls: Vec<String>,
    pub pdf_urls: Vec<String>,
    pub youtube_links: Vec<String>,
    pub preview: Option<ProjectPreview>,
    pub owner: ProjectOwner,
}

impl ProjectFeedItem {
    /// `attachments` must belong to `project` and be sorted by position.
    pub fn new(project: ProjectWithOwner, attachments: &[Attachment]) -> Self {
        let buckets = AttachmentBuckets::from_attachments(attachments);
        let preview = buckets.preview().map(|x| ProjectPreview {
            kind: x.kind,
            url: x.url,
        });
        Self {
            id: project.project.id.to_string(),
            title: project.project.title,
            description: project.project.description,
            category: project.project.category,
            created_at: datetime_to_string(project.project.created_date),
            image_urls: buckets.image_urls,
            pdf_urls: buckets.pdf_urls,
            youtube_links: buckets.youtube_links,
            preview,
            owner: ProjectOwner {
                id: project.owner_identity_id.to_string(),
                name: project
                    .owner_name
                    .unwrap_or(UNKNOWN_OWNER_NAME.to_string()),
            },
        }
    }
}

/// Pairs every project with its attachments, keeping the project order.
pub fn build_feed(
    projects: Vec<ProjectWithOwner>,
    attachments: Vec<Attachment>,
) -> Vec<ProjectFeedItem> {
    let mut by_project: HashMap<Uuid, Vec<Attachment>> = HashMap::new();
    for item in attachments {
        by_project.entry(item.project_id).or_default().push(item);
    }
    projects
        .into_iter()
        .map(|x| {
            let attachments = by_project.remove(&x.project.id).unwrap_or_default();
            ProjectFeedItem::new(x, &attachments)
        })
        .collect()
}

#[derive(ApiResponse)]
pub enum ProjectListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<ProjectFeedItem>>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
#[oai(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreateRequest {
    #[oai(default)]
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub pdf_urls: Option<Vec<String>>,
    pub youtube_links: Option<Vec<String>>,
    /// Accepted and ignored, the category is derived from the attachments.
    pub category: Option<String>,
}

#[derive(Object, Deserialize, Serialize)]
#[oai(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithAttachmentsResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: ProjectCategory,
    pub created_at: String,
    pub owner: ProjectOwner,
    pub attachments: Vec<AttachmentDetail>,
}

impl ProjectWithAttachmentsResponse {
    pub fn new(project: ProjectWithOwner, attachments: &[Attachment]) -> Self {
        Self {
            id: project.project.id.to_string(),
            title: project.project.title,
            description: project.project.description,
            category: project.project.category,
            created_at: datetime_to_string(project.project.created_date),
            owner: ProjectOwner {
                id: project.owner_identity_id.to_string(),
                name: project
                    .owner_name
                    .unwrap_or(UNKNOWN_OWNER_NAME.to_string()),
            },
            attachments: attachments.iter().map(AttachmentDetail::from).collect(),
        }
    }
}

#[derive(ApiResponse)]
pub enum ProjectCreateResponses {
    #[oai(status = 201)]
    Created(Json<ProjectWithAttachmentsResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
#[oai(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdateRequest {
    pub id: String,
    #[oai(default)]
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub pdf_urls: Option<Vec<String>>,
    pub youtube_links: Option<Vec<String>>,
    /// Accepted and ignored, the category is derived from the attachments.
    pub category: Option<String>,
}

#[derive(ApiResponse)]
pub enum ProjectUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<ProjectWithAttachmentsResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct ProjectDeleteRequest {
    pub id: String,
}

#[derive(ApiResponse)]
pub enum ProjectDeleteResponses {
    #[oai(status = 200)]
    Ok(Json<MessageResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

/// Public view of a project owner. CPF is deliberately absent.
#[derive(Object, Deserialize, Serialize)]
#[oai(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetailOwner {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub age: Option<i32>,
    pub linkedin: Option<String>,
    pub academic_cv_url: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub category: UserCategory,
}

#[derive(Object, Deserialize, Serialize)]
pub struct ProjectDetailResponse {
    pub project: ProjectFeedItem,
    pub attachments: Vec<AttachmentDetail>,
    pub owner: ProjectDetailOwner,
}

#[derive(ApiResponse)]
pub enum ProjectDetailResponses {
    #[oai(status = 200)]
    Ok(Json<ProjectDetailResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[cfg(test)]
mod tests {
    use chrono::Local;

    use super::*;
    use crate::model::project::Project;

    fn project(owner_name: Option<&str>) -> ProjectWithOwner {
        ProjectWithOwner {
            project: Project {
                id: Uuid::now_v7(),
                owner_id: Uuid::now_v7(),
                title: "Cobertura eleitoral".to_string(),
                description: None,
                category: ProjectCategory::Multimedia,
                created_date: Local::now().fixed_offset(),
            },
            owner_identity_id: Uuid::now_v7(),
            owner_name: owner_name.map(|x| x.to_string()),
        }
    }

    fn attachment(project_id: Uuid, url: &str, media_type: MediaType, position: i32) -> Attachment {
        Attachment {
            id: Uuid::now_v7(),
            project_id,
            url: url.to_string(),
            media_type,
            position,
        }
    }

    #[test]
    fn test_build_feed_groups_attachments() {
        let first = project(Some("Maria"));
        let second = project(None);
        let attachments = vec![
            attachment(first.project.id, "https://cdn.test/a.pdf", MediaType::Pdf, 0),
            attachment(
                first.project.id,
                "https://youtu.be/abc123",
                MediaType::Video,
                1,
            ),
            attachment(second.project.id, "https://cdn.test/b.png", MediaType::Photo, 0),
        ];
        let (first_id, second_id) = (first.project.id, second.project.id);

        let feed = build_feed(vec![first, second], attachments);

        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].id, first_id.to_string());
        assert_eq!(feed[0].owner.name, "Maria");
        assert_eq!(feed[0].pdf_urls, vec!["https://cdn.test/a.pdf"]);
        assert_eq!(feed[0].youtube_links, vec!["https://youtu.be/abc123"]);
        let preview = feed[0].preview.as_ref().unwrap();
        assert_eq!(preview.kind, PreviewKind::Youtube);
        assert_eq!(preview.url, "https://img.youtube.com/vi/abc123/mqdefault.jpg");

        assert_eq!(feed[1].id, second_id.to_string());
        assert_eq!(feed[1].owner.name, UNKNOWN_OWNER_NAME);
        assert_eq!(feed[1].preview.as_ref().unwrap().kind, PreviewKind::Image);
    }

    #[test]
    fn test_feed_item_without_attachments_has_no_preview() {
        let item = ProjectFeedItem::new(project(Some("Maria")), &[]);
        assert!(item.preview.is_none());
        assert!(item.image_urls.is_empty());
    }
}
