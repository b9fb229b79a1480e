use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use serenity::all::{ChannelId, UserId};

use super::entity::voice_channel;
use crate::voice::VoiceChannelStore;

pub struct VoiceChannelRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> VoiceChannelRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_channel_id(
        &self,
        channel_id: u64,
    ) -> Result<Option<voice_channel::Model>, DbErr> {
        voice_channel::Entity::find_by_id(channel_id.to_string())
            .one(self.db)
            .await
    }

    /// Returns the number of records removed.
    pub async fn delete_by_channel_id(&self, channel_id: u64) -> Result<u64, DbErr> {
        let result = voice_channel::Entity::delete_by_id(channel_id.to_string())
            .exec(self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[serenity::async_trait]
impl VoiceChannelStore for VoiceChannelRepository<'_> {
    async fn owner_of(&self, channel_id: ChannelId) -> anyhow::Result<Option<UserId>> {
        let Some(record) = self.find_by_channel_id(channel_id.get()).await? else {
            return Ok(None);
        };
        let owner = record.owner_id.parse::<u64>()?;
        anyhow::ensure!(
            owner != 0,
            "voice channel {channel_id} has an invalid owner id"
        );
        Ok(Some(UserId::new(owner)))
    }

    async fn remove(&self, channel_id: ChannelId) -> anyhow::Result<u64> {
        Ok(self.delete_by_channel_id(channel_id.get()).await?)
    }
}
