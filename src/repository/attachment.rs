use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::model::attachment::{Attachment, NewAttachment, TABLE_NAME};

pub async fn get_attachments_by_project_id(
    tx: &mut Transaction<'_, Postgres>,
    project_id: &Uuid,
) -> anyhow::Result<Vec<Attachment>> {
    let data: Vec<Attachment> = sqlx::query_as(
        format!(
            "SELECT * FROM {} WHERE project_id = $1 ORDER BY position",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(project_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(data)
}

/// Attachments of several projects at once, ordered by project then position.
pub async fn get_attachments_by_project_ids(
    tx: &mut Transaction<'_, Postgres>,
    project_ids: &[Uuid],
) -> anyhow::Result<Vec<Attachment>> {
    if project_ids.is_empty() {
        return Ok(vec![]);
    }
    let data: Vec<Attachment> = sqlx::query_as(
        format!(
            "SELECT * FROM {} WHERE project_id = ANY($1) ORDER BY project_id, position",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(project_ids)
    .fetch_all(&mut **tx)
    .await?;
    Ok(data)
}

pub async fn create_attachments(
    tx: &mut Transaction<'_, Postgres>,
    project_id: &Uuid,
    attachments: &[NewAttachment],
) -> anyhow::Result<Vec<Attachment>> {
    let mut result: Vec<Attachment> = vec![];
    for (position, item) in attachments.iter().enumerate() {
        let attachment = Attachment {
            id: Uuid::now_v7(),
            project_id: *project_id,
            url: item.url.clone(),
            media_type: item.media_type,
            position: position as i32,
        };
        sqlx::query(
            format!(
                r#"
            INSERT INTO {} (id, project_id, url, media_type, position)
            VALUES ($1, $2, $3, $4, $5)"#,
                TABLE_NAME
            )
            .as_str(),
        )
        .bind(attachment.id)
        .bind(attachment.project_id)
        .bind(&attachment.url)
        .bind(attachment.media_type)
        .bind(attachment.position)
        .execute(&mut **tx)
        .await?;
        result.push(attachment);
    }
    Ok(result)
}

/// Returns the number of rows removed.
pub async fn delete_attachments_by_project_id(
    tx: &mut Transaction<'_, Postgres>,
    project_id: &Uuid,
) -> anyhow::Result<u64> {
    let res = sqlx::query(format!("DELETE FROM {} WHERE project_id = $1", TABLE_NAME).as_str())
        .bind(project_id)
        .execute(&mut **tx)
        .await?;
    Ok(res.rows_affected())
}
