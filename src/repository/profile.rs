use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::{
        profile::{Profile, UserCategory, TABLE_NAME},
        user_identity::UserIdentity,
    },
};

pub async fn get_profile_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Profile>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let filters: Vec<String> = vec!["id = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![]);
    let data = binds_query_as::<Profile>(&stmt, binds)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn get_profile_by_identity_id(
    tx: &mut Transaction<'_, Postgres>,
    identity_id: &Uuid,
) -> anyhow::Result<Option<Profile>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*identity_id)];
    let filters: Vec<String> = vec!["identity_id = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![]);
    let data = binds_query_as::<Profile>(&stmt, binds)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

/// Reads the profile and locks its row until the transaction ends, so
/// concurrent partial updates apply one after the other.
pub async fn get_profile_by_id_for_update(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Profile>> {
    let data = sqlx::query_as::<_, Profile>(
        format!("SELECT * FROM {} WHERE id = $1 FOR UPDATE", TABLE_NAME).as_str(),
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(data)
}

/// Returns the identity's profile, creating it from the identity's name and
/// avatar when missing. The unique `identity_id` column makes a concurrent
/// insert a no-op, after which the winner's row is read back.
pub async fn get_or_create_profile(
    tx: &mut Transaction<'_, Postgres>,
    identity: &UserIdentity,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<Profile> {
    if let Some(profile) = get_profile_by_identity_id(tx, &identity.id).await? {
        return Ok(profile);
    }

    let now = now.unwrap_or(Local::now().fixed_offset());
    let inserted = sqlx::query(
        format!(
            r#"
        INSERT INTO {} (id, identity_id, full_name, avatar_url, category, auto_created,
        created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (identity_id) DO NOTHING"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(Uuid::now_v7())
    .bind(identity.id)
    .bind(&identity.name)
    .bind(&identity.image)
    .bind(UserCategory::default())
    .bind(true)
    .bind(now)
    .bind(now)
    .execute(&mut **tx)
    .await?;
    if inserted.rows_affected() > 0 {
        tracing::info!("created profile for identity {}", identity.id);
    }

    get_profile_by_identity_id(tx, &identity.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("profile for identity {} vanished", identity.id))
}

/// Persists the editable columns of `profile`. Email and avatar are not
/// touched here.
pub async fn update_profile(
    tx: &mut Transaction<'_, Postgres>,
    profile: &mut Profile,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    profile.updated_date = now;
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET full_name = $1, phone = $2, cpf = $3, age = $4, linkedin = $5,
        academic_cv_url = $6, bio = $7, category = $8, updated_date = $9
        WHERE id = $10"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&profile.full_name)
    .bind(&profile.phone)
    .bind(&profile.cpf)
    .bind(profile.age)
    .bind(&profile.linkedin)
    .bind(&profile.academic_cv_url)
    .bind(&profile.bio)
    .bind(profile.category)
    .bind(profile.updated_date)
    .bind(profile.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;
    use crate::factory::user_identity::UserIdentityFactory;

    async fn get_or_create_committed(
        pool: &PgPool,
        identity: &UserIdentity,
    ) -> anyhow::Result<Profile> {
        let mut tx = pool.begin().await?;
        let profile = get_or_create_profile(&mut tx, identity, None).await?;
        tx.commit().await?;
        Ok(profile)
    }

    #[sqlx::test]
    async fn test_get_or_create_profile_seeds_from_identity(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let identity = UserIdentityFactory::new().generate_one(&pool, ()).await?;

        // When
        let profile = get_or_create_committed(&pool, &identity).await?;

        // Expect
        assert_eq!(profile.identity_id, identity.id);
        assert_eq!(profile.full_name, identity.name);
        assert_eq!(profile.avatar_url, identity.image);
        assert!(profile.auto_created);
        assert_eq!(profile.category, UserCategory::Student);
        let again = get_or_create_committed(&pool, &identity).await?;
        assert_eq!(again.id, profile.id);
        Ok(())
    }

    #[sqlx::test]
    async fn test_get_or_create_profile_concurrent(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let identity = UserIdentityFactory::new().generate_one(&pool, ()).await?;

        // When
        let (first, second) = tokio::join!(
            get_or_create_committed(&pool, &identity),
            get_or_create_committed(&pool, &identity)
        );

        // Expect
        let (first, second) = (first?, second?);
        assert_eq!(first.id, second.id);
        let count: (i64,) = sqlx::query_as(
            format!("SELECT COUNT(*) FROM {} WHERE identity_id = $1", TABLE_NAME).as_str(),
        )
        .bind(identity.id)
        .fetch_one(&pool)
        .await?;
        assert_eq!(count.0, 1);
        Ok(())
    }

    #[sqlx::test]
    async fn test_update_profile(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let identity = UserIdentityFactory::new().generate_one(&pool, ()).await?;
        let mut profile = get_or_create_committed(&pool, &identity).await?;

        // When
        let mut tx = pool.begin().await?;
        profile.full_name = Some("Maria Souza".to_string());
        profile.age = Some(22);
        profile.category = UserCategory::Graduate;
        profile.bio = None;
        update_profile(&mut tx, &mut profile, None).await?;
        tx.commit().await?;

        // Expect
        let mut tx = pool.begin().await?;
        let saved = get_profile_by_id(&mut tx, &profile.id).await?.unwrap();
        assert_eq!(saved.full_name, Some("Maria Souza".to_string()));
        assert_eq!(saved.age, Some(22));
        assert_eq!(saved.category, UserCategory::Graduate);
        assert_eq!(saved.avatar_url, identity.image);
        Ok(())
    }

    #[sqlx::test]
    async fn test_get_profile_by_id_for_update_holds_row_lock(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let identity = UserIdentityFactory::new().generate_one(&pool, ()).await?;
        let profile = get_or_create_committed(&pool, &identity).await?;
        let mut holder = pool.begin().await?;
        let mut locked = get_profile_by_id_for_update(&mut holder, &profile.id)
            .await?
            .unwrap();

        // When
        let mut waiter = pool.begin().await?;
        let blocked = tokio::time::timeout(
            std::time::Duration::from_millis(300),
            get_profile_by_id_for_update(&mut waiter, &profile.id),
        )
        .await;
        drop(waiter);
        locked.bio = Some("Editora".to_string());
        update_profile(&mut holder, &mut locked, None).await?;
        holder.commit().await?;

        // Expect
        assert!(blocked.is_err());
        let mut tx = pool.begin().await?;
        let saved = get_profile_by_id_for_update(&mut tx, &profile.id)
            .await?
            .unwrap();
        assert_eq!(saved.bio, Some("Editora".to_string()));
        Ok(())
    }
}
