use serenity::all::{CommandInteraction, CommandOptionType, Context};

use super::{CommandDescriptor, CommandHandler, CommandOption};
use crate::{
    constant,
    database::{Persistence, VoiceChannelRepository},
    error::VoiceChannelError,
    util::{self, RespondableInteraction},
    voice::{self, Actor, HttpChannelRemover},
};

pub struct Handler {
    descriptor: CommandDescriptor,
    persistence: Persistence,
}

impl Handler {
    pub fn new(persistence: Persistence) -> Self {
        Self {
            descriptor: CommandDescriptor::new(
                constant::commands::VOICE_DELETE,
                "Delete a voice channel you created.",
            )
            .option(CommandOption::new(
                CommandOptionType::Channel,
                constant::value::CHANNEL,
                "The voice channel to delete. Defaults to this channel.",
            ))
            .cooldown_secs(5),
            persistence,
        }
    }
}

#[serenity::async_trait]
impl CommandHandler for Handler {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    async fn run(&self, ctx: &Context, cmd: &CommandInteraction) -> anyhow::Result<()> {
        let Some(db) = self.persistence.get() else {
            return cmd
                .create_ephemeral(&ctx.http, "Voice channels are unavailable: storage is not configured.")
                .await;
        };

        let chosen = util::get_value(&cmd.data.options, constant::value::CHANNEL)
            .and_then(util::value_to_channel);
        let channel_id = chosen.unwrap_or(cmd.channel_id);

        // Resolved channels carry the caller's permissions in that channel.
        let permissions = chosen
            .and_then(|id| cmd.data.resolved.channels.get(&id))
            .and_then(|channel| channel.permissions)
            .unwrap_or_else(|| cmd.member_permissions());
        let actor = Actor {
            user_id: cmd.user.id,
            is_admin: permissions.administrator(),
        };

        let store = VoiceChannelRepository::new(db);
        let remover = HttpChannelRemover(&ctx.http);
        match voice::delete_voice_channel(&store, &remover, channel_id, actor).await {
            Ok(()) => {
                // Fails when the command was used inside the deleted channel.
                if let Err(err) = cmd.create_ephemeral(&ctx.http, "Voice channel deleted.").await {
                    tracing::debug!(channel = %channel_id, "could not confirm deletion: {err}");
                }
                Ok(())
            }
            Err(err @ (VoiceChannelError::NotPartOfSystem | VoiceChannelError::PermissionDenied)) => {
                cmd.create_ephemeral(&ctx.http, &capitalize(&err.to_string()))
                    .await
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}
