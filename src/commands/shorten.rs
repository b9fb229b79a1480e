use anyhow::Context as _;
use chrono::{Duration, Utc};
use rand::Rng;
use serenity::all::{CommandInteraction, CommandOptionType, Context};
use url::Url;

use super::{CommandDescriptor, CommandHandler, CommandOption};
use crate::{
    config, constant,
    database::{NewShortUrl, Persistence, ShortUrlRepository},
    util::{self, RespondableInteraction},
};

const MAX_EXPIRY_DAYS: i64 = 365;
const CODE_ATTEMPTS: usize = 3;

/// Accepts absolute http(s) URLs with a host; returns the normalized form.
pub fn validate_url(input: &str) -> Result<Url, &'static str> {
    let url = Url::parse(input.trim()).map_err(|_| "That doesn't look like a URL.")?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err("Only http and https links can be shortened.");
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err("That URL has no host.");
    }
    Ok(url)
}

/// Eight lowercase base32 characters (40 random bits)
pub fn generate_code(rng: &mut impl Rng) -> String {
    let bytes: [u8; 5] = rng.r#gen();
    data_encoding::BASE32_NOPAD.encode(&bytes).to_lowercase()
}

async fn unused_code(repo: &ShortUrlRepository<'_>) -> anyhow::Result<String> {
    for _ in 0..CODE_ATTEMPTS {
        let code = generate_code(&mut rand::thread_rng());
        if repo.find_by_code(&code).await?.is_none() {
            return Ok(code);
        }
    }
    anyhow::bail!("could not find an unused short code")
}

pub fn short_url(base_url: &str, code: &str) -> String {
    format!("{}/{code}", base_url.trim_end_matches('/'))
}

pub struct Handler {
    descriptor: CommandDescriptor,
    links: config::Links,
    persistence: Persistence,
}

impl Handler {
    pub fn new(links: config::Links, persistence: Persistence) -> Self {
        Self {
            descriptor: CommandDescriptor::new(constant::commands::SHORTEN, "Shorten a link.")
                .option(
                    CommandOption::new(
                        CommandOptionType::String,
                        constant::value::URL,
                        "The http(s) link to shorten.",
                    )
                    .required(),
                )
                .option(
                    CommandOption::new(
                        CommandOptionType::Integer,
                        constant::value::EXPIRES_IN_DAYS,
                        "Days until the short link expires.",
                    )
                    .min_value(1),
                )
                .cooldown_secs(10),
            links,
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
        let options = &cmd.data.options;
        let input = util::get_value(options, constant::value::URL)
            .and_then(util::value_to_string)
            .context("no url specified")?;
        let expires_in_days = util::get_value(options, constant::value::EXPIRES_IN_DAYS)
            .and_then(util::value_to_integer)
            .map(|days| days.clamp(1, MAX_EXPIRY_DAYS));

        let url = match validate_url(&input) {
            Ok(url) => url,
            Err(reason) => return cmd.create_ephemeral(&ctx.http, reason).await,
        };

        let Some(db) = self.persistence.get() else {
            return cmd
                .create_ephemeral(&ctx.http, "Link shortening is unavailable: storage is not configured.")
                .await;
        };

        let repo = ShortUrlRepository::new(db);
        let code = unused_code(&repo).await?;
        let link = repo
            .create(NewShortUrl {
                user_id: cmd.user.id.get(),
                original_url: url.to_string(),
                short_url: short_url(&self.links.base_url, &code),
                code,
                expires_at: expires_in_days.map(|days| Utc::now() + Duration::days(days)),
            })
            .await?;

        let reply = match link.expires_at {
            Some(expires_at) => format!(
                "Short link: {} (expires <t:{}:R>)",
                link.short_url,
                expires_at.timestamp()
            ),
            None => format!("Short link: {}", link.short_url),
        };
        cmd.create_ephemeral(&ctx.http, &reply).await
    }
}
