use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::user_identity::{UserIdentity, TABLE_NAME},
};

pub async fn get_identity_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<UserIdentity>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let filters: Vec<String> = vec!["id = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![]);
    let data = binds_query_as::<UserIdentity>(&stmt, binds)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn get_identity_by_email(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
) -> anyhow::Result<Option<UserIdentity>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(email.to_string())];
    let filters: Vec<String> = vec!["email = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![]);
    let data = binds_query_as::<UserIdentity>(&stmt, binds)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

/// Creates the identity on first login. An existing row for the email is
/// returned untouched.
pub async fn upsert_identity(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    name: Option<String>,
    image: Option<String>,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<UserIdentity> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let identity: UserIdentity = sqlx::query_as(
        format!(
            r#"
        INSERT INTO {} (id, email, name, image, created_date)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
        RETURNING *"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(Uuid::now_v7())
    .bind(email)
    .bind(name)
    .bind(image)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;

    #[sqlx::test]
    async fn test_upsert_identity_keeps_first_login(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let mut tx = pool.begin().await?;
        let first = upsert_identity(
            &mut tx,
            "maria@example.com",
            Some("Maria Silva".to_string()),
            Some("https://lh3.googleusercontent.com/a".to_string()),
            None,
        )
        .await?;

        // When
        let second = upsert_identity(
            &mut tx,
            "maria@example.com",
            Some("Another Name".to_string()),
            None,
            None,
        )
        .await?;

        // Expect
        assert_eq!(first.id, second.id);
        assert_eq!(second.name, Some("Maria Silva".to_string()));
        let by_email = get_identity_by_email(&mut tx, "maria@example.com").await?;
        assert_eq!(by_email.map(|x| x.id), Some(first.id));
        let by_id = get_identity_by_id(&mut tx, &first.id).await?;
        assert!(by_id.is_some());
        assert!(get_identity_by_id(&mut tx, &Uuid::now_v7()).await?.is_none());
        Ok(())
    }
}
