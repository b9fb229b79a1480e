//! Deleting bot-provisioned voice channels.
//!
//! The channel delete and the record delete are independent calls. If the
//! record delete fails after the channel is gone, the record is left behind
//! and reported; nothing is rolled back.

use serenity::all::{ChannelId, Http, UserId};

use crate::error::VoiceChannelError;

/// Ownership records for provisioned voice channels
#[serenity::async_trait]
pub trait VoiceChannelStore: Send + Sync {
    async fn owner_of(&self, channel_id: ChannelId) -> anyhow::Result<Option<UserId>>;
    /// Returns how many records were removed.
    async fn remove(&self, channel_id: ChannelId) -> anyhow::Result<u64>;
}

/// Deletes the channel itself on Discord
#[serenity::async_trait]
pub trait ChannelRemover: Send + Sync {
    async fn delete_channel(&self, channel_id: ChannelId) -> anyhow::Result<()>;
}

pub struct HttpChannelRemover<'a>(pub &'a Http);

#[serenity::async_trait]
impl ChannelRemover for HttpChannelRemover<'_> {
    async fn delete_channel(&self, channel_id: ChannelId) -> anyhow::Result<()> {
        channel_id.delete(self.0).await?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Actor {
    pub user_id: UserId,
    /// Holds administrator permission on the channel
    pub is_admin: bool,
}

pub async fn delete_voice_channel(
    store: &impl VoiceChannelStore,
    remover: &impl ChannelRemover,
    channel_id: ChannelId,
    actor: Actor,
) -> Result<(), VoiceChannelError> {
    let owner = store
        .owner_of(channel_id)
        .await
        .map_err(VoiceChannelError::Store)?
        .ok_or(VoiceChannelError::NotPartOfSystem)?;

    if owner != actor.user_id && !actor.is_admin {
        return Err(VoiceChannelError::PermissionDenied);
    }

    remover
        .delete_channel(channel_id)
        .await
        .map_err(VoiceChannelError::Channel)?;

    let removed = store
        .remove(channel_id)
        .await
        .map_err(VoiceChannelError::Store)?;
    if removed == 0 {
        tracing::warn!(channel = %channel_id, "voice channel deleted but no record was removed");
    }

    tracing::info!(channel = %channel_id, user = %actor.user_id, "voice channel deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex};

    use super::*;

    const CHANNEL: ChannelId = ChannelId::new(500);
    const OWNER: UserId = UserId::new(1);
    const STRANGER: UserId = UserId::new(2);

    #[derive(Default)]
    struct FakeStore {
        records: Mutex<HashMap<ChannelId, UserId>>,
        removals: Mutex<u32>,
        fail_remove: bool,
    }

    impl FakeStore {
        fn with(channel_id: ChannelId, owner: UserId) -> Self {
            let store = Self::default();
            store.records.lock().unwrap().insert(channel_id, owner);
            store
        }
    }

    #[serenity::async_trait]
    impl VoiceChannelStore for FakeStore {
        async fn owner_of(&self, channel_id: ChannelId) -> anyhow::Result<Option<UserId>> {
            Ok(self.records.lock().unwrap().get(&channel_id).copied())
        }

        async fn remove(&self, channel_id: ChannelId) -> anyhow::Result<u64> {
            *self.removals.lock().unwrap() += 1;
            if self.fail_remove {
                anyhow::bail!("store unavailable");
            }
            Ok(self.records.lock().unwrap().remove(&channel_id).map_or(0, |_| 1))
        }
    }

    #[derive(Default)]
    struct FakeRemover {
        deleted: Mutex<Vec<ChannelId>>,
    }

    #[serenity::async_trait]
    impl ChannelRemover for FakeRemover {
        async fn delete_channel(&self, channel_id: ChannelId) -> anyhow::Result<()> {
            self.deleted.lock().unwrap().push(channel_id);
            Ok(())
        }
    }

    fn actor(user_id: UserId, is_admin: bool) -> Actor {
        Actor { user_id, is_admin }
    }

    #[tokio::test]
    async fn test_unknown_channel_is_not_part_of_system() {
        let store = FakeStore::default();
        let remover = FakeRemover::default();

        let err = delete_voice_channel(&store, &remover, CHANNEL, actor(OWNER, true))
            .await
            .unwrap_err();
        assert!(matches!(err, VoiceChannelError::NotPartOfSystem));
        assert!(remover.deleted.lock().unwrap().is_empty());
        assert_eq!(*store.removals.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stranger_without_admin_is_denied() {
        let store = FakeStore::with(CHANNEL, OWNER);
        let remover = FakeRemover::default();

        let err = delete_voice_channel(&store, &remover, CHANNEL, actor(STRANGER, false))
            .await
            .unwrap_err();
        assert!(matches!(err, VoiceChannelError::PermissionDenied));
        assert!(remover.deleted.lock().unwrap().is_empty());
        assert_eq!(store.owner_of(CHANNEL).await.unwrap(), Some(OWNER));
    }

    #[tokio::test]
    async fn test_owner_deletes_channel_and_record_once() {
        let store = FakeStore::with(CHANNEL, OWNER);
        let remover = FakeRemover::default();

        delete_voice_channel(&store, &remover, CHANNEL, actor(OWNER, false))
            .await
            .unwrap();
        assert_eq!(*remover.deleted.lock().unwrap(), vec![CHANNEL]);
        assert_eq!(*store.removals.lock().unwrap(), 1);
        assert_eq!(store.owner_of(CHANNEL).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_admin_may_delete_someone_elses_channel() {
        let store = FakeStore::with(CHANNEL, OWNER);
        let remover = FakeRemover::default();

        delete_voice_channel(&store, &remover, CHANNEL, actor(STRANGER, true))
            .await
            .unwrap();
        assert_eq!(remover.deleted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_record_failure_after_channel_delete_is_not_rolled_back() {
        let store = FakeStore {
            fail_remove: true,
            ..FakeStore::with(CHANNEL, OWNER)
        };
        let remover = FakeRemover::default();

        let err = delete_voice_channel(&store, &remover, CHANNEL, actor(OWNER, false))
            .await
            .unwrap_err();
        assert!(matches!(err, VoiceChannelError::Store(_)));
        assert_eq!(*remover.deleted.lock().unwrap(), vec![CHANNEL]);
        assert_eq!(store.owner_of(CHANNEL).await.unwrap(), Some(OWNER));
    }
}
