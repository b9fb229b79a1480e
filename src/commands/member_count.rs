use anyhow::Context as _;
use serenity::{
    all::{CommandInteraction, Context, GuildId},
    futures::StreamExt as _,
};

use super::{CommandDescriptor, CommandHandler};
use crate::{constant, util::RespondableInteraction};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemberCount {
    pub total: u64,
    pub bots: u64,
}

impl MemberCount {
    pub fn tally(total: u64, bot_flags: impl IntoIterator<Item = bool>) -> Self {
        let bots = bot_flags.into_iter().filter(|is_bot| *is_bot).count() as u64;
        Self {
            total: total.max(bots),
            bots,
        }
    }

    /// Counts from the cache, but only when it holds every member. Large
    /// guilds are sent a partial member list on connect.
    pub fn from_cache(
        member_count: u64,
        bot_flags: impl ExactSizeIterator<Item = bool>,
    ) -> Option<Self> {
        (bot_flags.len() as u64 >= member_count).then(|| Self::tally(member_count, bot_flags))
    }

    pub fn reply(&self) -> String {
        format!(
            "This server has {} members, {} bots among them.",
            self.total, self.bots
        )
    }
}

pub struct Handler {
    descriptor: CommandDescriptor,
}

impl Handler {
    pub fn new() -> Self {
        Self {
            descriptor: CommandDescriptor::new(
                constant::commands::MEMBER_COUNT,
                "Show how many members and bots this server has.",
            )
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
        let guild_id = cmd
            .guild_id
            .context("this command can only be used in a server")?;

        let count = count_members(ctx, guild_id).await?;
        cmd.create(&ctx.http, &count.reply()).await
    }
}

async fn count_members(ctx: &Context, guild_id: GuildId) -> anyhow::Result<MemberCount> {
    let cached = ctx.cache.guild(guild_id).map(|guild| {
        (
            guild.member_count,
            MemberCount::from_cache(
                guild.member_count,
                guild.members.values().map(|m| m.user.bot),
            ),
        )
    });

    let total = match cached {
        Some((_, Some(count))) => return Ok(count),
        Some((member_count, None)) => member_count,
        None => guild_id
            .to_partial_guild_with_counts(&ctx.http)
            .await?
            .approximate_member_count
            .unwrap_or_default(),
    };

    // Pages through the full member list, 1000 members per request.
    let mut seen = 0;
    let mut bots = 0;
    let mut members = std::pin::pin!(guild_id.members_iter(ctx));
    while let Some(member) = members.next().await {
        seen += 1;
        if member?.user.bot {
            bots += 1;
        }
    }
    tracing::debug!(guild = %guild_id, seen, total, "counted members over HTTP");

    Ok(MemberCount {
        total: total.max(seen),
        bots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_mentions_members_and_bots() {
        let flags = std::iter::repeat_n(true, 15).chain(std::iter::repeat_n(false, 105));
        let count = MemberCount::tally(120, flags);

        assert_eq!(count, MemberCount { total: 120, bots: 15 });
        let reply = count.reply();
        assert!(reply.contains("120 members"));
        assert!(reply.contains("15 bots"));
    }

    #[test]
    fn test_total_is_never_below_bots() {
        let count = MemberCount::tally(0, [true, true]);
        assert_eq!(count.total, 2);
    }

    #[test]
    fn test_complete_cache_is_used() {
        let count = MemberCount::from_cache(3, [true, false, false].into_iter()).unwrap();
        assert_eq!(count, MemberCount { total: 3, bots: 1 });
    }

    #[test]
    fn test_partial_cache_is_not_trusted() {
        // A 5000 member guild that only sent 100 members on connect
        let flags = std::iter::repeat_n(false, 100);
        assert!(MemberCount::from_cache(5000, flags).is_none());
    }
}
