use rand::{Rng, seq::SliceRandom};
use serenity::all::{Context, Message, ReactionType, UserId};

use super::{BotEvent, EventKind, EventListener};
use crate::config;

/// The parts of a message that decide whether we answer a mention
#[derive(Clone, Copy, Debug)]
pub struct MentionFacts {
    pub author_is_bot: bool,
    pub is_reply: bool,
    /// The bot's own user is in the mention list; @everyone/@here don't count
    pub mentions_bot: bool,
}

impl MentionFacts {
    pub fn of(msg: &Message, bot_id: UserId) -> Self {
        Self {
            author_is_bot: msg.author.bot,
            is_reply: msg.message_reference.is_some(),
            mentions_bot: msg.mentions.iter().any(|user| user.id == bot_id),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct MentionPlan<'a> {
    pub emoji: &'a str,
    pub reply: Option<&'a str>,
}

/// Returns `None` when the message should be ignored.
pub fn plan_response<'a>(
    facts: MentionFacts,
    config: &'a config::MentionReply,
    rng: &mut impl Rng,
) -> Option<MentionPlan<'a>> {
    if facts.author_is_bot || facts.is_reply || !facts.mentions_bot {
        return None;
    }

    // NaN survives `clamp` and would panic in `gen_bool`.
    let chance = if config.reply_chance.is_finite() {
        config.reply_chance.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let reply = if rng.gen_bool(chance) {
        config.replies.choose(rng).map(String::as_str)
    } else {
        None
    };

    Some(MentionPlan {
        emoji: &config.emoji,
        reply,
    })
}

pub struct Listener {
    config: config::MentionReply,
}

impl Listener {
    pub fn new(config: config::MentionReply) -> Self {
        Self { config }
    }
}

#[serenity::async_trait]
impl EventListener for Listener {
    fn name(&self) -> &'static str {
        "mention_reply"
    }

    fn kind(&self) -> EventKind {
        EventKind::MessageCreate
    }

    async fn handle(&self, ctx: &Context, event: &BotEvent) -> anyhow::Result<()> {
        let BotEvent::MessageCreate(msg) = event else {
            return Ok(());
        };

        let bot_id = ctx.cache.current_user().id;
        let plan = {
            let mut rng = rand::thread_rng();
            plan_response(MentionFacts::of(msg, bot_id), &self.config, &mut rng)
        };
        let Some(plan) = plan else {
            return Ok(());
        };

        // Failures here are expected now and then (missing permissions, deleted
        // message) and must not surface as handler errors.
        if let Err(err) = msg
            .react(&ctx.http, ReactionType::Unicode(plan.emoji.to_string()))
            .await
        {
            tracing::warn!(message = %msg.id, "failed to react to mention: {err}");
        }
        if let Some(reply) = plan.reply
            && let Err(err) = msg.reply(&ctx.http, reply).await
        {
            tracing::warn!(message = %msg.id, "failed to reply to mention: {err}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    const DIRECT: MentionFacts = MentionFacts {
        author_is_bot: false,
        is_reply: false,
        mentions_bot: true,
    };

    #[test]
    fn test_direct_mention_always_reacts() {
        let config = config::MentionReply::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let plan = plan_response(DIRECT, &config, &mut rng).unwrap();
            assert_eq!(plan.emoji, config.emoji);
        }
    }

    #[test]
    fn test_reply_rate_matches_configured_chance() {
        let config = config::MentionReply::default();
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        let trials = 10_000;

        let mut replies = 0;
        for _ in 0..trials {
            let plan = plan_response(DIRECT, &config, &mut rng).unwrap();
            if let Some(reply) = plan.reply {
                assert!(config.replies.iter().any(|r| r == reply));
                replies += 1;
            }
        }

        let rate = replies as f64 / trials as f64;
        assert!((rate - 0.3).abs() < 0.03, "reply rate was {rate}");
    }

    #[test]
    fn test_ignored_messages() {
        let config = config::MentionReply::default();
        let mut rng = StdRng::seed_from_u64(7);

        let from_bot = MentionFacts {
            author_is_bot: true,
            ..DIRECT
        };
        let reply_chain = MentionFacts {
            is_reply: true,
            ..DIRECT
        };
        let broadcast_only = MentionFacts {
            mentions_bot: false,
            ..DIRECT
        };

        for facts in [from_bot, reply_chain, broadcast_only] {
            for _ in 0..100 {
                assert_eq!(plan_response(facts, &config, &mut rng), None);
            }
        }
    }

    #[test]
    fn test_empty_reply_pool_still_reacts() {
        let config = config::MentionReply {
            reply_chance: 1.0,
            replies: vec![],
            ..Default::default()
        };
        let plan = plan_response(DIRECT, &config, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(plan.reply, None);
    }

    #[test]
    fn test_non_finite_chance_never_replies() {
        let config: config::MentionReply = toml::from_str("reply_chance = nan").unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let plan = plan_response(DIRECT, &config, &mut rng).unwrap();
            assert_eq!(plan.reply, None);
        }

        let config = config::MentionReply {
            reply_chance: f64::INFINITY,
            ..Default::default()
        };
        assert_eq!(plan_response(DIRECT, &config, &mut rng).unwrap().reply, None);
    }
}
