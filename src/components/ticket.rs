//! Two-step ticket closing: the close button opens an ephemeral prompt whose
//! confirm/cancel buttons carry the id of the user who opened it.
//!
//! Prompts are not timed out by the bot. Once the interaction token expires
//! Discord rejects presses and the failure is only logged.

use serenity::all::{
    ButtonStyle, ComponentInteraction, Context, CreateActionRow, CreateButton, CreateEmbed,
    CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, Permissions, UserId,
};

use super::{ComponentDescriptor, ComponentHandler, split_custom_id};
use crate::{constant::components as ids, util::RespondableInteraction};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketAction {
    /// Close button on the ticket itself
    RequestClose,
    Confirm(UserId),
    Cancel(UserId),
}

impl TicketAction {
    pub fn parse(custom_id: &str) -> Option<Self> {
        let (prefix, payload) = split_custom_id(custom_id);
        let owner = || payload?.parse::<u64>().ok().filter(|id| *id != 0).map(UserId::new);
        match prefix {
            ids::CLOSE_TICKET if payload.is_none() => Some(Self::RequestClose),
            ids::CLOSE_TICKET_CONFIRM => owner().map(Self::Confirm),
            ids::CLOSE_TICKET_CANCEL => owner().map(Self::Cancel),
            _ => None,
        }
    }

    pub fn custom_id(&self) -> String {
        match self {
            Self::RequestClose => ids::CLOSE_TICKET.to_string(),
            Self::Confirm(user) => format!("{}:{user}", ids::CLOSE_TICKET_CONFIRM),
            Self::Cancel(user) => format!("{}:{user}", ids::CLOSE_TICKET_CANCEL),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    Prompt,
    Close,
    Abandon,
    /// Someone other than the prompt's owner pressed a button
    NotYours,
}

pub fn resolve(action: TicketAction, presser: UserId) -> Resolution {
    match action {
        TicketAction::RequestClose => Resolution::Prompt,
        TicketAction::Confirm(owner) | TicketAction::Cancel(owner) if owner != presser => {
            Resolution::NotYours
        }
        TicketAction::Confirm(_) => Resolution::Close,
        TicketAction::Cancel(_) => Resolution::Abandon,
    }
}

pub struct Handler {
    descriptor: ComponentDescriptor,
}

impl Handler {
    pub fn request_close() -> Self {
        Self::with(ids::CLOSE_TICKET, Permissions::MANAGE_CHANNELS)
    }

    pub fn confirm() -> Self {
        Self::with(ids::CLOSE_TICKET_CONFIRM, Permissions::MANAGE_CHANNELS)
    }

    pub fn cancel() -> Self {
        Self::with(ids::CLOSE_TICKET_CANCEL, Permissions::empty())
    }

    fn with(custom_id: &'static str, required_permissions: Permissions) -> Self {
        Self {
            descriptor: ComponentDescriptor {
                custom_id,
                required_permissions,
            },
        }
    }
}

#[serenity::async_trait]
impl ComponentHandler for Handler {
    fn descriptor(&self) -> &ComponentDescriptor {
        &self.descriptor
    }

    async fn run(&self, ctx: &Context, cmp: &ComponentInteraction) -> anyhow::Result<()> {
        let action = TicketAction::parse(&cmp.data.custom_id)
            .ok_or_else(|| anyhow::anyhow!("malformed ticket button: {}", cmp.data.custom_id))?;

        match resolve(action, cmp.user.id) {
            Resolution::Prompt => {
                cmp.defer_ephemeral(&ctx.http).await?;
                let buttons = CreateActionRow::Buttons(vec![
                    CreateButton::new(TicketAction::Confirm(cmp.user.id).custom_id())
                        .label("Close ticket")
                        .style(ButtonStyle::Danger),
                    CreateButton::new(TicketAction::Cancel(cmp.user.id).custom_id())
                        .label("Cancel")
                        .style(ButtonStyle::Secondary),
                ]);
                cmp.create_followup(
                    &ctx.http,
                    CreateInteractionResponseFollowup::new()
                        .ephemeral(true)
                        .embed(
                            CreateEmbed::new()
                                .title("Close this ticket?")
                                .description("The channel will be deleted. This cannot be undone."),
                        )
                        .components(vec![buttons]),
                )
                .await?;
            }
            Resolution::Close => {
                update_prompt(ctx, cmp, "Closing ticket...").await?;
                tracing::info!(channel = %cmp.channel_id, user = %cmp.user.id, "closing ticket");
                cmp.channel_id.delete(&ctx.http).await?;
            }
            Resolution::Abandon => {
                update_prompt(ctx, cmp, "Ticket close cancelled.").await?;
            }
            Resolution::NotYours => {
                cmp.create_ephemeral(&ctx.http, "This prompt belongs to someone else.")
                    .await?;
            }
        }
        Ok(())
    }
}

async fn update_prompt(
    ctx: &Context,
    cmp: &ComponentInteraction,
    content: &str,
) -> anyhow::Result<()> {
    cmp.create_response(
        &ctx.http,
        CreateInteractionResponse::UpdateMessage(
            CreateInteractionResponseMessage::new()
                .content(content)
                .embeds(vec![])
                .components(vec![]),
        ),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: UserId = UserId::new(42);
    const OTHER: UserId = UserId::new(43);

    #[test]
    fn test_custom_ids_parse_back() {
        for action in [
            TicketAction::RequestClose,
            TicketAction::Confirm(OWNER),
            TicketAction::Cancel(OWNER),
        ] {
            assert_eq!(TicketAction::parse(&action.custom_id()), Some(action));
        }
        assert_eq!(
            TicketAction::Confirm(OWNER).custom_id(),
            "close_ticket_confirm:42"
        );
    }

    #[test]
    fn test_malformed_ids_are_rejected() {
        assert_eq!(TicketAction::parse("close_ticket_confirm"), None);
        assert_eq!(TicketAction::parse("close_ticket_confirm:abc"), None);
        assert_eq!(TicketAction::parse("close_ticket_cancel:0"), None);
        assert_eq!(TicketAction::parse("close_ticket:42"), None);
        assert_eq!(TicketAction::parse("something_else"), None);
    }

    #[test]
    fn test_prompt_state_machine() {
        assert_eq!(resolve(TicketAction::RequestClose, OTHER), Resolution::Prompt);
        assert_eq!(resolve(TicketAction::Confirm(OWNER), OWNER), Resolution::Close);
        assert_eq!(resolve(TicketAction::Cancel(OWNER), OWNER), Resolution::Abandon);
        assert_eq!(resolve(TicketAction::Confirm(OWNER), OTHER), Resolution::NotYours);
        assert_eq!(resolve(TicketAction::Cancel(OWNER), OTHER), Resolution::NotYours);
    }
}
