use std::sync::Arc;

use anyhow::Context as _;
use serenity::all::{CommandInteraction, CommandOptionType, Context};

use super::{CommandDescriptor, CommandHandler, CommandOption};
use crate::{
    constant,
    spellcheck::{Spellchecker, Verdict},
    util::{self, RespondableInteraction},
};

pub fn format_verdict(verdict: &Verdict) -> String {
    if !verdict.misspelled {
        return format!("`{}` looks correctly spelled.", verdict.word);
    }
    if verdict.suggestions.is_empty() {
        format!("`{}` appears to be misspelled.", verdict.word)
    } else {
        format!(
            "`{}` appears to be misspelled. Did you mean: {}?",
            verdict.word,
            verdict.suggestions.join(", ")
        )
    }
}

pub struct Handler {
    descriptor: CommandDescriptor,
    checker: Option<Arc<Spellchecker>>,
}

impl Handler {
    pub fn new(checker: Option<Arc<Spellchecker>>) -> Self {
        Self {
            descriptor: CommandDescriptor::new(
                constant::commands::SPELLCHECK,
                "Check whether a word is spelled correctly.",
            )
            .option(
                CommandOption::new(
                    CommandOptionType::String,
                    constant::value::WORD,
                    "The word to check.",
                )
                .required(),
            )
            .cooldown_secs(2),
            checker,
        }
    }
}

#[serenity::async_trait]
impl CommandHandler for Handler {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    async fn run(&self, ctx: &Context, cmd: &CommandInteraction) -> anyhow::Result<()> {
        let word = util::get_value(&cmd.data.options, constant::value::WORD)
            .and_then(util::value_to_string)
            .context("no word specified")?;
        if word.trim().is_empty() || word.split_whitespace().count() > 1 {
            return cmd
                .create_ephemeral(&ctx.http, "Please give me exactly one word.")
                .await;
        }

        let Some(checker) = &self.checker else {
            return cmd
                .create_ephemeral(&ctx.http, "Spellcheck is unavailable: no dictionary is loaded.")
                .await;
        };

        cmd.create(&ctx.http, &format_verdict(&checker.check(&word)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_replies() {
        let checker = Spellchecker::from_words(["receive", "banana"]);

        assert_eq!(
            format_verdict(&checker.check("receive")),
            "`receive` looks correctly spelled."
        );
        assert_eq!(
            format_verdict(&checker.check("recieve")),
            "`recieve` appears to be misspelled. Did you mean: receive?"
        );
        assert_eq!(
            format_verdict(&checker.check("qqqqqqqq")),
            "`qqqqqqqq` appears to be misspelled."
        );
    }
}
