use chrono::{DateTime, FixedOffset};
use fake::{
    faker::{internet::en::SafeEmail, name::en::Name},
    Dummy, Fake, Faker,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::user_identity::{UserIdentity, TABLE_NAME};

pub struct UserIdentityFactory<T: Clone> {
    modifier_one: fn(x: &UserIdentity, ext: T) -> UserIdentity,
    modifier_many: fn(x: &UserIdentity, idx: usize, ext: T) -> UserIdentity,
}

impl<T: Clone> Default for UserIdentityFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> UserIdentityFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &UserIdentity, ext: T) -> UserIdentity) {
        self.modifier_one = modifier
    }

    pub fn modified_many(
        &mut self,
        modifier: fn(x: &UserIdentity, idx: usize, ext: T) -> UserIdentity,
    ) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<UserIdentity> {
        let data = UserIdentityDummy::generate();
        let data = (self.modifier_one)(&data, ext);
        insert_identity(db, &data).await?;
        Ok(data)
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<UserIdentity>> {
        let mut result: Vec<UserIdentity> = vec![];
        for idx in 0..num as usize {
            let data = UserIdentityDummy::generate();
            result.push((self.modifier_many)(&data, idx, ext.clone()));
        }
        for item in result.iter() {
            insert_identity(db, item).await?;
        }
        Ok(result)
    }
}

async fn insert_identity(db: &PgPool, data: &UserIdentity) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
        INSERT INTO {} (id, email, name, image, created_date)
        VALUES ($1, $2, $3, $4, $5)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(data.id)
    .bind(&data.email)
    .bind(&data.name)
    .bind(&data.image)
    .bind(data.created_date)
    .execute(db)
    .await?;
    Ok(())
}

#[derive(Debug, Dummy, Clone)]
struct UserIdentityDummy {
    #[dummy(faker = "SafeEmail()")]
    pub email: String,
    #[dummy(faker = "Name()")]
    pub name: String,
    pub created_date: DateTime<FixedOffset>,
}

impl UserIdentityDummy {
    fn generate() -> UserIdentity {
        let dummy = Faker.fake::<Self>();
        let id = Uuid::now_v7();
        UserIdentity {
            id,
            // ids keep generated emails unique inside one test database
            email: format!("{}.{}", id.simple(), dummy.email),
            name: Some(dummy.name),
            image: Some(format!("https://lh3.googleusercontent.com/a/{}", id.simple())),
            created_date: dummy.created_date,
        }
    }
}
