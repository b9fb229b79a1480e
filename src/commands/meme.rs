use rand::Rng;
use serenity::all::{CommandInteraction, Context};

use super::{CommandDescriptor, CommandHandler};
use crate::{constant, util::RespondableInteraction};

pub fn pick_meme(rng: &mut impl Rng) -> &'static str {
    constant::MEMES[rng.gen_range(0..constant::MEMES.len())]
}

pub struct Handler {
    descriptor: CommandDescriptor,
}

impl Handler {
    pub fn new() -> Self {
        Self {
            descriptor: CommandDescriptor::new(constant::commands::MEME, "Post a random meme.")
                .cooldown_secs(3),
        }
    }
}

#[serenity::async_trait]
impl CommandHandler for Handler {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    async fn run(&self, ctx: &Context, cmd: &CommandInteraction) -> anyhow::Result<()> {
        let meme = pick_meme(&mut rand::thread_rng());
        cmd.create(&ctx.http, meme).await
    }
}
