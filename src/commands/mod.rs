use std::{collections::HashMap, sync::Arc, time::Duration};

use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    Permissions,
};

use crate::error::RegistryError;

pub mod balance;
pub mod guild_join;
pub mod member_count;
pub mod meme;
pub mod ping;
pub mod shorten;
pub mod spellcheck;
pub mod voice_delete;

#[derive(Clone, Debug)]
pub struct CommandOption {
    pub name: &'static str,
    pub description: &'static str,
    pub option_type: CommandOptionType,
    pub required: bool,
    pub min_value: Option<i64>,
}

impl CommandOption {
    pub fn new(
        option_type: CommandOptionType,
        name: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            description,
            option_type,
            required: false,
            min_value: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_value(mut self, min_value: i64) -> Self {
        self.min_value = Some(min_value);
        self
    }
}

/// Static metadata for a slash command
#[derive(Clone, Debug)]
pub struct CommandDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub options: Vec<CommandOption>,
    pub required_permissions: Permissions,
    pub cooldown: Duration,
    pub dev_only: bool,
}

impl CommandDescriptor {
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            options: vec![],
            required_permissions: Permissions::empty(),
            cooldown: Duration::ZERO,
            dev_only: false,
        }
    }

    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn cooldown_secs(mut self, secs: u64) -> Self {
        self.cooldown = Duration::from_secs(secs);
        self
    }

    pub fn dev_only(mut self) -> Self {
        self.dev_only = true;
        self
    }

    pub fn to_discord_command(&self) -> CreateCommand {
        let mut cmd = CreateCommand::new(self.name).description(self.description);
        if !self.required_permissions.is_empty() {
            cmd = cmd.default_member_permissions(self.required_permissions);
        }

        for opt in &self.options {
            let mut option = CreateCommandOption::new(opt.option_type, opt.name, opt.description)
                .required(opt.required);
            if let Some(min_value) = opt.min_value {
                option = option.min_int_value(min_value as u64);
            }
            cmd = cmd.add_option(option);
        }

        cmd
    }
}

#[serenity::async_trait]
pub trait CommandHandler: Send + Sync {
    fn descriptor(&self) -> &CommandDescriptor;
    async fn run(&self, ctx: &Context, cmd: &CommandInteraction) -> anyhow::Result<()>;
}

/// Command handlers keyed by their unique name
#[derive(Default, Clone)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) -> Result<(), RegistryError> {
        let name = handler.descriptor().name;
        if self.handlers.contains_key(name) {
            return Err(RegistryError::DuplicateCommand(name.to_string()));
        }
        self.handlers.insert(name, handler);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Descriptors in name order, for stable registration with Discord
    pub fn descriptors(&self) -> Vec<&CommandDescriptor> {
        let mut descriptors: Vec<_> = self.handlers.values().map(|h| h.descriptor()).collect();
        descriptors.sort_by_key(|d| d.name);
        descriptors
    }
}
