use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::{
        attachment::{Attachment, NewAttachment},
        profile::TABLE_NAME as PROFILE_TABLE_NAME,
        project::{Project, ProjectCategory, ProjectWithOwner, TABLE_NAME},
        user_identity::TABLE_NAME as USER_IDENTITY_TABLE_NAME,
    },
    repository::attachment::{
        create_attachments, delete_attachments_by_project_id, get_attachments_by_project_id,
    },
};

fn project_with_owner_from() -> String {
    format!(
        "{} p JOIN {} pr ON pr.id = p.owner_id JOIN {} i ON i.id = pr.identity_id",
        TABLE_NAME, PROFILE_TABLE_NAME, USER_IDENTITY_TABLE_NAME
    )
}

const PROJECT_WITH_OWNER_SELECT: &str =
    "p.*, i.id AS owner_identity_id, i.name AS owner_name";

/// Case-insensitive substring match on the title or the owner's name.
/// Lower-casing happens here rather than in SQL so the result does not depend
/// on the database's LC_CTYPE.
fn matches_search(item: &ProjectWithOwner, search: &str) -> bool {
    item.project.title.to_lowercase().contains(search)
        || item
            .owner_name
            .as_deref()
            .is_some_and(|x| x.to_lowercase().contains(search))
}

/// Feed listing, newest first. `search` matches the title or the owner's
/// name as a case-insensitive substring.
pub async fn list_projects(
    tx: &mut Transaction<'_, Postgres>,
    search: Option<String>,
    category: Option<ProjectCategory>,
) -> anyhow::Result<Vec<ProjectWithOwner>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];

    if let Some(category) = category {
        binds.push(SqlxBinds::ProjectCategory(category));
        filters.push(format!("p.category = ${}", binds.len()));
    }

    let from = project_with_owner_from();
    let stmt = query_builder(
        Some(PROJECT_WITH_OWNER_SELECT.to_string()),
        &from,
        &filters,
        vec!["p.created_date DESC".to_string(), "p.id DESC".to_string()],
    );
    let data = binds_query_as::<ProjectWithOwner>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?;
    let Some(search) = search.map(|x| x.to_lowercase()) else {
        return Ok(data);
    };
    Ok(data
        .into_iter()
        .filter(|x| matches_search(x, &search))
        .collect())
}

pub async fn get_projects_by_owner_id(
    tx: &mut Transaction<'_, Postgres>,
    owner_id: &Uuid,
) -> anyhow::Result<Vec<ProjectWithOwner>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*owner_id)];
    let filters: Vec<String> = vec!["p.owner_id = $1".to_string()];
    let from = project_with_owner_from();
    let stmt = query_builder(
        Some(PROJECT_WITH_OWNER_SELECT.to_string()),
        &from,
        &filters,
        vec!["p.created_date DESC".to_string(), "p.id DESC".to_string()],
    );
    let data = binds_query_as::<ProjectWithOwner>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn get_project_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<ProjectWithOwner>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let filters: Vec<String> = vec!["p.id = $1".to_string()];
    let from = project_with_owner_from();
    let stmt = query_builder(
        Some(PROJECT_WITH_OWNER_SELECT.to_string()),
        &from,
        &filters,
        vec![],
    );
    let data = binds_query_as::<ProjectWithOwner>(&stmt, binds)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

/// Inserts the project row and its attachments in the caller's transaction.
pub async fn create_project(
    tx: &mut Transaction<'_, Postgres>,
    owner_id: &Uuid,
    title: String,
    description: Option<String>,
    category: ProjectCategory,
    attachments: &[NewAttachment],
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<(Project, Vec<Attachment>)> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let new_project = Project {
        id: Uuid::now_v7(),
        owner_id: *owner_id,
        title,
        description,
        category,
        created_date: now,
    };
    sqlx::query(
        format!(
            r#"
        INSERT INTO {} (id, owner_id, title, description, category, created_date)
        VALUES ($1, $2, $3, $4, $5, $6)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_project.id)
    .bind(new_project.owner_id)
    .bind(&new_project.title)
    .bind(&new_project.description)
    .bind(new_project.category)
    .bind(new_project.created_date)
    .execute(&mut **tx)
    .await?;
    let attachments = create_attachments(tx, &new_project.id, attachments).await?;
    Ok((new_project, attachments))
}

/// Rewrites title, description and category, then swaps the whole
/// attachment set. Both steps share the caller's transaction, so readers
/// never observe the project without attachments.
pub async fn update_project(
    tx: &mut Transaction<'_, Postgres>,
    project: &mut Project,
    title: String,
    description: Option<String>,
    category: ProjectCategory,
    attachments: &[NewAttachment],
) -> anyhow::Result<Vec<Attachment>> {
    project.title = title;
    project.description = description;
    project.category = category;
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET title = $1, description = $2, category = $3
        WHERE id = $4"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&project.title)
    .bind(&project.description)
    .bind(project.category)
    .bind(project.id)
    .execute(&mut **tx)
    .await?;
    delete_attachments_by_project_id(tx, &project.id).await?;
    let attachments = create_attachments(tx, &project.id, attachments).await?;
    Ok(attachments)
}

/// Removes the attachments, then the project. Returns `false` when the
/// project did not exist.
pub async fn delete_project(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<bool> {
    let removed_attachments = delete_attachments_by_project_id(tx, id).await?;
    let res = sqlx::query(format!("DELETE FROM {} WHERE id = $1", TABLE_NAME).as_str())
        .bind(id)
        .execute(&mut **tx)
        .await?;
    if res.rows_affected() > 0 {
        tracing::debug!(
            "deleted project {} with {} attachments",
            id,
            removed_attachments
        );
    }
    Ok(res.rows_affected() > 0)
}

/// Project plus its attachments in position order.
pub async fn get_project_with_attachments(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<(ProjectWithOwner, Vec<Attachment>)>> {
    let Some(project) = get_project_by_id(tx, id).await? else {
        return Ok(None);
    };
    let attachments = get_attachments_by_project_id(tx, id).await?;
    Ok(Some((project, attachments)))
}
