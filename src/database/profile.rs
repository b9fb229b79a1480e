use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, EntityTrait};

use super::entity::profile;

pub struct ProfileRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the user's profile, creating an empty one on first use.
    pub async fn find_or_create(&self, user_id: u64) -> Result<profile::Model, DbErr> {
        if let Some(existing) = profile::Entity::find_by_id(user_id.to_string())
            .one(self.db)
            .await?
        {
            return Ok(existing);
        }

        profile::ActiveModel {
            user_id: ActiveValue::Set(user_id.to_string()),
            balance: ActiveValue::Set(0),
        }
        .insert(self.db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::memory_db;

    #[tokio::test]
    async fn test_new_profile_starts_empty() {
        let db = memory_db().await;
        let profile = ProfileRepository::new(&db).find_or_create(42).await.unwrap();
        assert_eq!(profile.user_id, "42");
        assert_eq!(profile.balance, 0);
    }

    #[tokio::test]
    async fn test_existing_profile_is_returned() {
        let db = memory_db().await;
        profile::ActiveModel {
            user_id: ActiveValue::Set("7".to_string()),
            balance: ActiveValue::Set(250),
        }
        .insert(&db)
        .await
        .unwrap();

        let repo = ProfileRepository::new(&db);
        assert_eq!(repo.find_or_create(7).await.unwrap().balance, 250);
        assert_eq!(profile::Entity::find().all(&db).await.unwrap().len(), 1);
    }
}
