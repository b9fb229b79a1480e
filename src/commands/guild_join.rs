use serenity::all::{CommandInteraction, Context};

use super::{CommandDescriptor, CommandHandler};
use crate::{constant, util::RespondableInteraction};

/// Developer hook for guild onboarding; only acknowledges for now.
pub struct Handler {
    descriptor: CommandDescriptor,
}

impl Handler {
    pub fn new() -> Self {
        Self {
            descriptor: CommandDescriptor::new(
                constant::commands::GUILD_JOIN,
                "Developer only: simulate the bot joining this server.",
            )
            .dev_only(),
        }
    }
}

#[serenity::async_trait]
impl CommandHandler for Handler {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    async fn run(&self, ctx: &Context, cmd: &CommandInteraction) -> anyhow::Result<()> {
        tracing::info!(guild = ?cmd.guild_id, user = %cmd.user.id, "guild-join invoked");
        cmd.create_ephemeral(&ctx.http, "Guild join acknowledged.")
            .await
    }
}
