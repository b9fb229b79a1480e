use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};

use super::entity::short_url::{self, Status};

/// Fields supplied by the caller when shortening a URL
pub struct NewShortUrl {
    pub user_id: u64,
    pub original_url: String,
    pub code: String,
    pub short_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

pub struct ShortUrlRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ShortUrlRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, new: NewShortUrl) -> Result<short_url::Model, DbErr> {
        let now = Utc::now();
        short_url::ActiveModel {
            user_id: ActiveValue::Set(new.user_id.to_string()),
            original_url: ActiveValue::Set(new.original_url),
            code: ActiveValue::Set(new.code),
            short_url: ActiveValue::Set(new.short_url),
            status: ActiveValue::Set(Status::Open),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            expires_at: ActiveValue::Set(new.expires_at),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<short_url::Model>, DbErr> {
        short_url::Entity::find()
            .filter(short_url::Column::Code.eq(code))
            .one(self.db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::memory_db;

    fn new_link(code: &str) -> NewShortUrl {
        NewShortUrl {
            user_id: 9,
            original_url: "https://www.rust-lang.org/".to_string(),
            code: code.to_string(),
            short_url: format!("https://hearth.link/{code}"),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_starts_open() {
        let db = memory_db().await;
        let repo = ShortUrlRepository::new(&db);

        let link = repo.create(new_link("abcd2345")).await.unwrap();
        assert_eq!(link.status, Status::Open);
        assert_eq!(link.user_id, "9");
        assert_eq!(
            repo.find_by_code("abcd2345").await.unwrap().unwrap().id,
            link.id
        );
    }

    #[tokio::test]
    async fn test_codes_are_unique() {
        let db = memory_db().await;
        let repo = ShortUrlRepository::new(&db);

        repo.create(new_link("samecode")).await.unwrap();
        assert!(repo.create(new_link("samecode")).await.is_err());
    }
}
