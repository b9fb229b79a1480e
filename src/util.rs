use serenity::{all::*, async_trait};

#[async_trait]
pub trait RespondableInteraction: Send + Sync {
    async fn create(&self, http: &Http, message: &str) -> anyhow::Result<()>;
    async fn create_ephemeral(&self, http: &Http, message: &str) -> anyhow::Result<()>;
    async fn edit(&self, http: &Http, message: &str) -> anyhow::Result<()>;
    async fn create_or_edit(&self, http: &Http, message: &str) -> anyhow::Result<()>;

    fn user(&self) -> &User;
    /// Permissions of the invoking member; empty outside of guilds.
    fn member_permissions(&self) -> Permissions;
}
macro_rules! implement_respondable_interaction {
    ($name:ident) => {
        #[async_trait]
        impl RespondableInteraction for $name {
            async fn create(&self, http: &Http, msg: &str) -> anyhow::Result<()> {
                Ok(self
                    .create_response(
                        http,
                        CreateInteractionResponse::Message(
                            CreateInteractionResponseMessage::new()
                                .content(msg)
                                .allowed_mentions(CreateAllowedMentions::new()),
                        ),
                    )
                    .await?)
            }
            async fn create_ephemeral(&self, http: &Http, msg: &str) -> anyhow::Result<()> {
                Ok(self
                    .create_response(
                        http,
                        CreateInteractionResponse::Message(
                            CreateInteractionResponseMessage::new()
                                .content(msg)
                                .ephemeral(true),
                        ),
                    )
                    .await?)
            }
            async fn edit(&self, http: &Http, message: &str) -> anyhow::Result<()> {
                self.edit_response(http, EditInteractionResponse::new().content(message))
                    .await?;
                Ok(())
            }
            async fn create_or_edit(&self, http: &Http, message: &str) -> anyhow::Result<()> {
                if self.get_response(http).await.is_ok() {
                    self.edit(http, message).await
                } else {
                    self.create_ephemeral(http, message).await
                }
            }

            fn user(&self) -> &User {
                &self.user
            }
            fn member_permissions(&self) -> Permissions {
                self.member
                    .as_ref()
                    .and_then(|m| m.permissions)
                    .unwrap_or_else(Permissions::empty)
            }
        }
    };
}
implement_respondable_interaction!(CommandInteraction);
implement_respondable_interaction!(ComponentInteraction);

pub fn get_value<'a>(
    options: &'a [CommandDataOption],
    name: &str,
) -> Option<&'a CommandDataOptionValue> {
    options.iter().find(|v| v.name == name).map(|v| &v.value)
}

pub fn value_to_string(v: &CommandDataOptionValue) -> Option<String> {
    match v {
        CommandDataOptionValue::String(v) => Some(v.clone()),
        _ => None,
    }
}

pub fn value_to_integer(v: &CommandDataOptionValue) -> Option<i64> {
    match v {
        CommandDataOptionValue::Integer(v) => Some(*v),
        _ => None,
    }
}

pub fn value_to_channel(v: &CommandDataOptionValue) -> Option<ChannelId> {
    match v {
        CommandDataOptionValue::Channel(v) => Some(*v),
        _ => None,
    }
}

/// Milliseconds since the Unix epoch encoded in a Discord snowflake.
pub fn snowflake_millis(snowflake: u64) -> u64 {
    const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;
    (snowflake >> 22) + DISCORD_EPOCH_MS
}
