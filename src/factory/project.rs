use chrono::{DateTime, FixedOffset};
use fake::{faker::lorem::en::Sentence, Dummy, Fake, Faker};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::classifier::AttachmentBuckets,
    model::{
        attachment::Attachment,
        project::{Project, ProjectCategory, TABLE_NAME},
    },
    repository::attachment::create_attachments,
};

/// Generates projects together with an attachment set matching their
/// category. The modifier must point `owner_id` at an existing profile.
pub struct ProjectFactory<T: Clone> {
    modifier_one: fn(x: &Project, ext: T) -> Project,
    modifier_many: fn(x: &Project, idx: usize, ext: T) -> Project,
}

impl<T: Clone> Default for ProjectFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ProjectFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Project, ext: T) -> Project) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Project, idx: usize, ext: T) -> Project) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(
        &mut self,
        db: &PgPool,
        ext: T,
    ) -> anyhow::Result<(Project, Vec<Attachment>)> {
        let data = ProjectDummy::generate();
        let data = (self.modifier_one)(&data, ext);
        let mut tx = db.begin().await?;
        let attachments = insert_project(&mut tx, &data).await?;
        tx.commit().await?;
        Ok((data, attachments))
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<(Project, Vec<Attachment>)>> {
        let mut projects: Vec<Project> = vec![];
        for idx in 0..num as usize {
            let data = ProjectDummy::generate();
            projects.push((self.modifier_many)(&data, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        let mut result = vec![];
        for item in projects {
            let attachments = insert_project(&mut tx, &item).await?;
            result.push((item, attachments));
        }
        tx.commit().await?;
        Ok(result)
    }
}

/// Smallest attachment set whose computed category is `category`.
pub fn buckets_for_category(category: ProjectCategory, seed: &Uuid) -> AttachmentBuckets {
    let image = vec![format!("https://res.cloudinary.com/demo/image/upload/{}.jpg", seed.simple())];
    let pdf = vec![format!("https://res.cloudinary.com/demo/raw/upload/{}.pdf", seed.simple())];
    let video = vec![format!("https://www.youtube.com/watch?v={}", &seed.simple().to_string()[..11])];
    match category {
        ProjectCategory::Photos => AttachmentBuckets::new(image, vec![], vec![]),
        ProjectCategory::Text => AttachmentBuckets::new(vec![], pdf, vec![]),
        ProjectCategory::Video => AttachmentBuckets::new(vec![], vec![], video),
        ProjectCategory::Multimedia => AttachmentBuckets::new(image, pdf, video),
    }
}

async fn insert_project(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    data: &Project,
) -> anyhow::Result<Vec<Attachment>> {
    sqlx::query(
        format!(
            r#"
        INSERT INTO {} (id, owner_id, title, description, category, created_date)
        VALUES ($1, $2, $3, $4, $5, $6)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(data.id)
    .bind(data.owner_id)
    .bind(&data.title)
    .bind(&data.description)
    .bind(data.category)
    .bind(data.created_date)
    .execute(&mut **tx)
    .await?;
    let buckets = buckets_for_category(data.category, &data.id);
    create_attachments(tx, &data.id, &buckets.to_new_attachments()).await
}

#[derive(Debug, Dummy, Clone)]
struct ProjectDummy {
    #[dummy(faker = "Sentence(2..6)")]
    pub title: String,
    pub description: Option<String>,
    #[dummy(faker = "0..4")]
    pub category_idx: usize,
    pub created_date: DateTime<FixedOffset>,
}

impl ProjectDummy {
    fn generate() -> Project {
        let dummy = Faker.fake::<Self>();
        let category = [
            ProjectCategory::Multimedia,
            ProjectCategory::Text,
            ProjectCategory::Video,
            ProjectCategory::Photos,
        ][dummy.category_idx];
        Project {
            id: Uuid::now_v7(),
            owner_id: Uuid::now_v7(),
            title: dummy.title,
            description: dummy.description,
            category,
            created_date: dummy.created_date,
        }
    }
}
