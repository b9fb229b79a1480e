use serenity::all::{CommandInteraction, Context};

use super::{CommandDescriptor, CommandHandler};
use crate::{constant, database::Persistence, database::ProfileRepository, util::RespondableInteraction};

pub fn format_balance(username: &str, balance: i64) -> String {
    format!("{username} has {balance} coins.")
}

pub struct Handler {
    descriptor: CommandDescriptor,
    persistence: Persistence,
}

impl Handler {
    pub fn new(persistence: Persistence) -> Self {
        Self {
            descriptor: CommandDescriptor::new(constant::commands::BALANCE, "Show your coin balance.")
                .cooldown_secs(3),
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
                .create_ephemeral(&ctx.http, "Balances are unavailable: storage is not configured.")
                .await;
        };

        let profile = ProfileRepository::new(db)
            .find_or_create(cmd.user.id.get())
            .await?;
        cmd.create(&ctx.http, &format_balance(&cmd.user.name, profile.balance))
            .await
    }
}
