use std::time::{Duration, Instant};

use serenity::all::{CommandInteraction, Context};

use super::{CommandDescriptor, CommandHandler};
use crate::{
    constant,
    util::{self, RespondableInteraction},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Latency {
    /// From the interaction being created to our response existing
    pub roundtrip_ms: u64,
    /// Time our response request spent in flight
    pub api_ms: u64,
}

impl Latency {
    pub fn measure(interaction_id: u64, response_id: u64, api_elapsed: Duration) -> Self {
        Self {
            roundtrip_ms: util::snowflake_millis(response_id)
                .saturating_sub(util::snowflake_millis(interaction_id)),
            api_ms: api_elapsed.as_millis() as u64,
        }
    }

    pub fn reply(&self) -> String {
        format!(
            "Pong! Roundtrip latency: {}ms. API latency: {}ms.",
            self.roundtrip_ms, self.api_ms
        )
    }
}

pub struct Handler {
    descriptor: CommandDescriptor,
}

impl Handler {
    pub fn new() -> Self {
        Self {
            descriptor: CommandDescriptor::new(constant::commands::PING, "Check the bot's latency.")
                .cooldown_secs(5),
        }
    }
}

#[serenity::async_trait]
impl CommandHandler for Handler {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    async fn run(&self, ctx: &Context, cmd: &CommandInteraction) -> anyhow::Result<()> {
        let started = Instant::now();
        cmd.create(&ctx.http, "Pinging...").await?;
        let api_elapsed = started.elapsed();

        let response = cmd.get_response(&ctx.http).await?;
        let latency = Latency::measure(cmd.id.get(), response.id.get(), api_elapsed);
        cmd.edit(&ctx.http, &latency.reply()).await
    }
}
