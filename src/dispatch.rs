use std::{collections::HashSet, sync::Arc, time::Duration, time::Instant};

use serenity::all::{CommandInteraction, ComponentInteraction, Context, Permissions, UserId};

use crate::{
    commands::{CommandHandler, CommandRegistry},
    components::{ComponentHandler, ComponentRegistry},
    cooldown::Cooldowns,
    tasks::TaskSupervisor,
    util::RespondableInteraction,
};

/// Who is invoking a command or pressing a component.
#[derive(Clone, Copy, Debug)]
pub struct Caller {
    pub user_id: UserId,
    pub permissions: Permissions,
}

impl Caller {
    pub fn of(interaction: &dyn RespondableInteraction) -> Self {
        Self {
            user_id: interaction.user().id,
            permissions: interaction.member_permissions(),
        }
    }

    /// Permissions from `required` the caller lacks. Administrators lack nothing.
    pub fn missing(&self, required: Permissions) -> Permissions {
        if self.permissions.administrator() {
            Permissions::empty()
        } else {
            required - self.permissions
        }
    }
}

/// Outcome of checking an invocation before its handler runs
pub enum Gate<H: ?Sized> {
    Unknown,
    DeveloperOnly,
    MissingPermissions(Permissions),
    OnCooldown(Duration),
    Proceed(Arc<H>),
}

impl<H: ?Sized> Gate<H> {
    /// The user-visible reply for every outcome except `Proceed`.
    pub fn denial(&self, name: &str) -> Option<String> {
        match self {
            Gate::Unknown => Some(format!("Unknown command: /{name}.")),
            Gate::DeveloperOnly => Some("This command is restricted to bot developers.".into()),
            Gate::MissingPermissions(missing) => Some(format!(
                "You don't have permission to do that. Missing: {missing}."
            )),
            Gate::OnCooldown(remaining) => Some(format!(
                "This command is on cooldown. Try again in {:.1}s.",
                remaining.as_secs_f64()
            )),
            Gate::Proceed(_) => None,
        }
    }
}

pub struct CommandDispatcher {
    commands: CommandRegistry,
    components: ComponentRegistry,
    cooldowns: Cooldowns,
    developer_ids: HashSet<UserId>,
    tasks: TaskSupervisor,
}

impl CommandDispatcher {
    pub fn new(
        commands: CommandRegistry,
        components: ComponentRegistry,
        cooldowns: Cooldowns,
        developer_ids: impl IntoIterator<Item = UserId>,
        tasks: TaskSupervisor,
    ) -> Self {
        Self {
            commands,
            components,
            cooldowns,
            developer_ids: developer_ids.into_iter().collect(),
            tasks,
        }
    }

    /// Checks are ordered so a cooldown is only consumed by an invocation that runs.
    pub fn gate(&self, name: &str, caller: Caller, now: Instant) -> Gate<dyn CommandHandler> {
        let Some(handler) = self.commands.get(name) else {
            return Gate::Unknown;
        };
        let descriptor = handler.descriptor();

        if descriptor.dev_only && !self.developer_ids.contains(&caller.user_id) {
            return Gate::DeveloperOnly;
        }

        let missing = caller.missing(descriptor.required_permissions);
        if !missing.is_empty() {
            return Gate::MissingPermissions(missing);
        }

        if let Err(remaining) =
            self.cooldowns
                .check(caller.user_id, descriptor.name, descriptor.cooldown, now)
        {
            return Gate::OnCooldown(remaining);
        }

        Gate::Proceed(handler)
    }

    pub fn component_gate(&self, custom_id: &str, caller: Caller) -> Gate<dyn ComponentHandler> {
        let Some(handler) = self.components.get(custom_id) else {
            return Gate::Unknown;
        };
        let missing = caller.missing(handler.descriptor().required_permissions);
        if !missing.is_empty() {
            return Gate::MissingPermissions(missing);
        }
        Gate::Proceed(handler)
    }

    pub fn dispatch_command(&self, ctx: Context, cmd: CommandInteraction) {
        let name = cmd.data.name.clone();
        let gate = self.gate(&name, Caller::of(&cmd), Instant::now());
        tracing::debug!(command = %name, user = %cmd.user.id, "command invoked");

        self.tasks.spawn(format!("command:{name}"), async move {
            let handler = match gate {
                Gate::Proceed(handler) => handler,
                denied => {
                    if let Some(reply) = denied.denial(&name) {
                        cmd.create_ephemeral(&ctx.http, &reply).await?;
                    }
                    return Ok(());
                }
            };

            if let Err(err) = handler.run(&ctx, &cmd).await {
                cmd.create_or_edit(&ctx.http, &format!("Error: {err}"))
                    .await
                    .ok();
                return Err(err);
            }
            Ok(())
        });
    }

    pub fn dispatch_component(&self, ctx: Context, cmp: ComponentInteraction) {
        let custom_id = cmp.data.custom_id.clone();
        let gate = self.component_gate(&custom_id, Caller::of(&cmp));

        self.tasks.spawn(format!("component:{custom_id}"), async move {
            let handler = match gate {
                Gate::Proceed(handler) => handler,
                // Stale buttons from removed components are ignored.
                Gate::Unknown => {
                    tracing::debug!(custom_id = %custom_id, "no handler for component");
                    return Ok(());
                }
                denied => {
                    if let Some(reply) = denied.denial(&custom_id) {
                        cmp.create_ephemeral(&ctx.http, &reply).await?;
                    }
                    return Ok(());
                }
            };

            if let Err(err) = handler.run(&ctx, &cmp).await {
                cmp.create_or_edit(&ctx.http, &format!("Error: {err}"))
                    .await
                    .ok();
                return Err(err);
            }
            Ok(())
        });
    }
}
