//! Category and preview derivation for projects.
//!
//! Everything here is pure: the same buckets always yield the same category
//! and preview, whether they come from a create/update request or from
//! persisted attachment rows.

use poem_openapi::Enum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    attachment::{Attachment, MediaType, NewAttachment},
    project::ProjectCategory,
};

const YOUTUBE_THUMBNAIL_BASE: &str = "https://img.youtube.com/vi";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectValidationError {
    #[error("title is required")]
    BlankTitle,
    #[error("at least one image, pdf or youtube link is required")]
    NoAttachments,
}

/// Attachment URLs partitioned by media type, each list in position order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttachmentBuckets {
    pub image_urls: Vec<String>,
    pub pdf_urls: Vec<String>,
    pub youtube_links: Vec<String>,
}

impl AttachmentBuckets {
    pub fn new(image_urls: Vec<String>, pdf_urls: Vec<String>, youtube_links: Vec<String>) -> Self {
        Self {
            image_urls,
            pdf_urls,
            youtube_links,
        }
    }

    /// Rebuilds the buckets from stored rows. Rows must already be sorted by
    /// position.
    pub fn from_attachments<'a, I>(attachments: I) -> Self
    where
        I: IntoIterator<Item = &'a Attachment>,
    {
        let mut buckets = Self::default();
        for item in attachments {
            match item.media_type {
                MediaType::Photo => buckets.image_urls.push(item.url.clone()),
                MediaType::Pdf => buckets.pdf_urls.push(item.url.clone()),
                MediaType::Video => buckets.youtube_links.push(item.url.clone()),
            }
        }
        buckets
    }

    pub fn is_empty(&self) -> bool {
        self.image_urls.is_empty() && self.pdf_urls.is_empty() && self.youtube_links.is_empty()
    }

    pub fn category(&self) -> Option<ProjectCategory> {
        compute_category(
            !self.image_urls.is_empty(),
            !self.pdf_urls.is_empty(),
            !self.youtube_links.is_empty(),
        )
    }

    pub fn preview(&self) -> Option<Preview> {
        choose_preview(&self.image_urls, &self.youtube_links, &self.pdf_urls)
    }

    /// Flattens into insertable rows: images, then pdfs, then youtube links.
    pub fn to_new_attachments(&self) -> Vec<NewAttachment> {
        let tag = |urls: &[String], media_type: MediaType| {
            urls.iter()
                .map(|url| NewAttachment {
                    url: url.clone(),
                    media_type,
                })
                .collect::<Vec<_>>()
        };
        let mut result = tag(&self.image_urls, MediaType::Photo);
        result.extend(tag(&self.pdf_urls, MediaType::Pdf));
        result.extend(tag(&self.youtube_links, MediaType::Video));
        result
    }
}

/// `None` only when every bucket is empty, which request validation rules out.
pub fn compute_category(has_photo: bool, has_pdf: bool, has_video: bool) -> Option<ProjectCategory> {
    match (has_photo, has_pdf, has_video) {
        (false, false, false) => None,
        (true, false, false) => Some(ProjectCategory::Photos),
        (false, true, false) => Some(ProjectCategory::Text),
        (false, false, true) => Some(ProjectCategory::Video),
        _ => Some(ProjectCategory::Multimedia),
    }
}

/// Checks the minimal requirements shared by create and update and returns
/// the category the project must be stored with.
pub fn validate_project_input(
    title: &str,
    buckets: &AttachmentBuckets,
) -> Result<ProjectCategory, ProjectValidationError> {
    if title.trim().is_empty() {
        return Err(ProjectValidationError::BlankTitle);
    }
    buckets
        .category()
        .ok_or(ProjectValidationError::NoAttachments)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreviewKind {
    Image,
    Youtube,
    Pdf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preview {
    pub kind: PreviewKind,
    pub url: String,
}

/// Precedence is fixed: first image, then a thumbnail of the first youtube
/// link, then the first pdf.
pub fn choose_preview(
    image_urls: &[String],
    youtube_links: &[String],
    pdf_urls: &[String],
) -> Option<Preview> {
    if let Some(url) = image_urls.first() {
        return Some(Preview {
            kind: PreviewKind::Image,
            url: url.clone(),
        });
    }
    if let Some(link) = youtube_links.first() {
        return Some(Preview {
            kind: PreviewKind::Youtube,
            url: youtube_thumbnail_url(link),
        });
    }
    pdf_urls.first().map(|url| Preview {
        kind: PreviewKind::Pdf,
        url: url.clone(),
    })
}

/// `v=<id>` wins; otherwise the last path segment (youtu.be short links).
pub fn youtube_video_id(link: &str) -> &str {
    if let Some((_, rest)) = link.split_once("v=") {
        return rest.split('&').next().unwrap_or(rest);
    }
    let path = link.split(['?', '#']).next().unwrap_or(link);
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}

pub fn youtube_thumbnail_url(link: &str) -> String {
    format!(
        "{}/{}/mqdefault.jpg",
        YOUTUBE_THUMBNAIL_BASE,
        youtube_video_id(link)
    )
}
