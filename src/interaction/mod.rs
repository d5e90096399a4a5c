//! Typed interaction variants and the factory that classifies raw payloads.
//!
//! Every inbound payload becomes exactly one concrete variant exposing only
//! the operations valid for its type. The acknowledgment state machine lives
//! in [`ResponseHandle`]: an interaction moves `Unacknowledged ->
//! Acknowledged` once, on whichever response-issuing call fires first, and a
//! second attempt fails with [`Error::AlreadyAcknowledged`] without ever
//! reaching the transport. Edits and follow-ups are separate, unbounded
//! post-acknowledgment operations.

/// Raw wire payload structures and type codes.
pub mod payload;
/// Normalized per-interaction resolved lookup tables.
pub mod resolved;
/// Outbound response types and the external-collaborator traits.
pub mod response;

use crate::command::CommandKind;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use payload::{
    InteractionType, Message, RawInteraction, RawInteractionData, RawMember, RawOptionValue,
    Snowflake, User,
};
use resolved::{Member, ResolvedData};
use response::{Choice, InteractionResponse, ResponseData, ResponseTransport};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Addresses responses for one interaction and tracks the one-shot
/// acknowledgment transition.
pub struct ResponseHandle {
    id: Snowflake,
    token: String,
    acknowledged: AtomicBool,
    transport: Arc<dyn ResponseTransport>,
}

impl fmt::Debug for ResponseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseHandle")
            .field("id", &self.id)
            .field("acknowledged", &self.is_acknowledged())
            .finish_non_exhaustive()
    }
}

impl ResponseHandle {
    fn new(id: Snowflake, token: String, transport: Arc<dyn ResponseTransport>) -> Self {
        Self {
            id,
            token,
            acknowledged: AtomicBool::new(false),
            transport,
        }
    }

    /// The interaction id this handle addresses.
    #[must_use]
    pub fn id(&self) -> &Snowflake {
        &self.id
    }

    #[must_use]
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged.load(Ordering::Acquire)
    }

    /// Issues the initial response and performs the one-shot transition.
    ///
    /// The flag flips before the transport call and stays set even if that
    /// call fails: the platform may have received the response, and a retry
    /// must go through the edit path instead.
    pub(crate) async fn respond_once(&self, response: InteractionResponse) -> Result<()> {
        if self.acknowledged.swap(true, Ordering::AcqRel) {
            return Err(Error::AlreadyAcknowledged);
        }
        self.transport
            .create_response(&self.id, &self.token, &response)
            .await
    }

    /// Edits the original response. Valid any number of times, but only after
    /// acknowledgment.
    pub(crate) async fn edit_original(&self, data: &ResponseData) -> Result<()> {
        if !self.is_acknowledged() {
            return Err(Error::NotAcknowledged);
        }
        self.transport.edit_original(&self.token, data).await
    }

    /// Creates a follow-up message. Valid any number of times after
    /// acknowledgment.
    pub(crate) async fn create_followup(&self, data: &ResponseData) -> Result<()> {
        if !self.is_acknowledged() {
            return Err(Error::NotAcknowledged);
        }
        self.transport.create_followup(&self.token, data).await
    }

    /// Routes "edit the parent message" by acknowledgment state: the one-shot
    /// `UpdateMessage` response if this is the first response, the edit call
    /// otherwise. The one-shot is never attempted twice.
    pub(crate) async fn update_or_edit(&self, data: ResponseData) -> Result<()> {
        if self.acknowledged.swap(true, Ordering::AcqRel) {
            self.transport.edit_original(&self.token, &data).await
        } else {
            self.transport
                .create_response(&self.id, &self.token, &InteractionResponse::UpdateMessage(data))
                .await
        }
    }
}

/// Capability of issuing the very first platform response (and, once
/// acknowledged, edits and follow-ups).
#[async_trait]
pub trait Replyable: Send + Sync {
    /// The acknowledgment-tracking handle for this interaction.
    fn response_handle(&self) -> &ResponseHandle;

    /// Sends the initial message response.
    async fn reply(&self, data: ResponseData) -> Result<()> {
        self.response_handle()
            .respond_once(InteractionResponse::ChannelMessageWithSource(data))
            .await
    }

    /// Sends an initial message visible only to the invoking user.
    async fn reply_ephemeral(&self, content: &str) -> Result<()> {
        self.reply(ResponseData::ephemeral(content)).await
    }

    /// Acknowledges now and promises a visible response later.
    async fn defer(&self) -> Result<()> {
        self.response_handle()
            .respond_once(InteractionResponse::DeferredChannelMessageWithSource(
                ResponseData::default(),
            ))
            .await
    }

    /// Opens a modal as the initial response.
    async fn show_modal(&self, data: ResponseData) -> Result<()> {
        self.response_handle()
            .respond_once(InteractionResponse::Modal(data))
            .await
    }

    /// Edits the original response; requires a prior acknowledgment.
    async fn edit_response(&self, data: ResponseData) -> Result<()> {
        self.response_handle().edit_original(&data).await
    }

    /// Sends a follow-up message; requires a prior acknowledgment.
    async fn follow_up(&self, data: ResponseData) -> Result<()> {
        self.response_handle().create_followup(&data).await
    }
}

/// Capability of editing the message the interaction was triggered from,
/// distinct from replying fresh.
#[async_trait]
pub trait Updatable: Replyable {
    /// Edits the parent message, routing through the one-shot response or the
    /// edit call depending on acknowledgment state.
    async fn update(&self, data: ResponseData) -> Result<()> {
        self.response_handle().update_or_edit(data).await
    }

    /// Acknowledges now and leaves the parent message untouched for later
    /// edits.
    async fn defer_update(&self) -> Result<()> {
        self.response_handle()
            .respond_once(InteractionResponse::DeferredUpdateMessage)
            .await
    }
}

/// A liveness check from the platform. Exposes nothing but `pong()`.
#[derive(Debug)]
pub struct PingInteraction {
    handle: ResponseHandle,
}

impl PingInteraction {
    /// Acknowledges the ping. One-shot, like every initial response.
    pub async fn pong(&self) -> Result<()> {
        self.handle.respond_once(InteractionResponse::Pong).await
    }
}

/// An application command invocation (slash, user or message context menu).
#[derive(Debug)]
pub struct CommandInteraction {
    handle: ResponseHandle,
    pub command_name: String,
    pub command_kind: CommandKind,
    pub guild_id: Option<Snowflake>,
    pub channel_id: Option<Snowflake>,
    pub user: User,
    pub member: Option<Member>,
    pub options: Vec<RawOptionValue>,
    pub resolved: ResolvedData,
    /// Target of a user/message context-menu command.
    pub target_id: Option<Snowflake>,
}

impl Replyable for CommandInteraction {
    fn response_handle(&self) -> &ResponseHandle {
        &self.handle
    }
}

/// A partially-typed option value asking for choice suggestions. Exposes only
/// `respond()`.
#[derive(Debug)]
pub struct AutocompleteInteraction {
    handle: ResponseHandle,
    pub command_name: String,
    pub guild_id: Option<Snowflake>,
    pub channel_id: Option<Snowflake>,
    pub user: User,
    pub member: Option<Member>,
    pub options: Vec<RawOptionValue>,
    pub resolved: ResolvedData,
}

impl AutocompleteInteraction {
    /// Returns the produced choice list. One-shot.
    pub async fn respond(&self, choices: Vec<Choice>) -> Result<()> {
        self.handle
            .respond_once(InteractionResponse::AutocompleteResult(choices))
            .await
    }
}

/// A click on a message component (button, select menu).
#[derive(Debug)]
pub struct ComponentInteraction {
    handle: ResponseHandle,
    pub custom_id: String,
    pub component_type: Option<u8>,
    /// Selected values, for select-menu components.
    pub values: Vec<String>,
    /// The message the component lives on.
    pub message: Option<Message>,
    pub guild_id: Option<Snowflake>,
    pub channel_id: Option<Snowflake>,
    pub user: User,
    pub member: Option<Member>,
    pub resolved: ResolvedData,
}

impl Replyable for ComponentInteraction {
    fn response_handle(&self) -> &ResponseHandle {
        &self.handle
    }
}

impl Updatable for ComponentInteraction {}

/// A submitted modal form.
#[derive(Debug)]
pub struct ModalInteraction {
    handle: ResponseHandle,
    pub custom_id: String,
    /// Submitted field values keyed by the field's custom id.
    pub fields: HashMap<String, String>,
    pub guild_id: Option<Snowflake>,
    pub channel_id: Option<Snowflake>,
    pub user: User,
    pub member: Option<Member>,
    pub resolved: ResolvedData,
}

impl Replyable for ModalInteraction {
    fn response_handle(&self) -> &ResponseHandle {
        &self.handle
    }
}

impl Updatable for ModalInteraction {}

/// One inbound interaction, classified.
#[derive(Debug)]
pub enum Interaction {
    Ping(PingInteraction),
    Command(CommandInteraction),
    Autocomplete(AutocompleteInteraction),
    Component(ComponentInteraction),
    Modal(ModalInteraction),
}

impl Interaction {
    /// Classifies a raw payload and builds the matching variant.
    ///
    /// Construction normalizes the resolved cross-reference tables (member /
    /// user merging) and fails with [`Error::Resolution`] on a contract
    /// violation, before any handler can run.
    pub fn from_raw(raw: RawInteraction, transport: Arc<dyn ResponseTransport>) -> Result<Self> {
        let kind = InteractionType::from_code(raw.kind)
            .ok_or(Error::UnknownInteractionType(raw.kind))?;
        let handle = ResponseHandle::new(raw.id, raw.token, transport);

        if kind == InteractionType::Ping {
            return Ok(Self::Ping(PingInteraction { handle }));
        }

        let (user, member) = invoker(raw.member, raw.user)?;
        let mut data = raw
            .data
            .ok_or_else(|| Error::resolution("interaction payload carries no data"))?;
        let resolved = match data.resolved.take() {
            Some(tables) => ResolvedData::from_raw(tables)?,
            None => ResolvedData::default(),
        };

        match kind {
            InteractionType::Ping => unreachable!("ping handled above"),
            InteractionType::ApplicationCommand => Ok(Self::Command(CommandInteraction {
                handle,
                command_name: required_name(&data)?,
                command_kind: command_kind(&data)?,
                guild_id: raw.guild_id,
                channel_id: raw.channel_id,
                user,
                member,
                options: data.options,
                resolved,
                target_id: data.target_id,
            })),
            InteractionType::ApplicationCommandAutocomplete => {
                Ok(Self::Autocomplete(AutocompleteInteraction {
                    handle,
                    command_name: required_name(&data)?,
                    guild_id: raw.guild_id,
                    channel_id: raw.channel_id,
                    user,
                    member,
                    options: data.options,
                    resolved,
                }))
            }
            InteractionType::MessageComponent => Ok(Self::Component(ComponentInteraction {
                handle,
                custom_id: required_custom_id(&data)?,
                component_type: data.component_type,
                values: data.values,
                message: raw.message,
                guild_id: raw.guild_id,
                channel_id: raw.channel_id,
                user,
                member,
                resolved,
            })),
            InteractionType::ModalSubmit => {
                let mut fields = HashMap::new();
                for row in &data.components {
                    for component in &row.components {
                        if let Some(value) = &component.value {
                            fields.insert(component.custom_id.clone(), value.clone());
                        }
                    }
                }
                Ok(Self::Modal(ModalInteraction {
                    handle,
                    custom_id: required_custom_id(&data)?,
                    fields,
                    guild_id: raw.guild_id,
                    channel_id: raw.channel_id,
                    user,
                    member,
                    resolved,
                }))
            }
        }
    }

    #[must_use]
    pub fn kind(&self) -> InteractionType {
        match self {
            Self::Ping(_) => InteractionType::Ping,
            Self::Command(_) => InteractionType::ApplicationCommand,
            Self::Autocomplete(_) => InteractionType::ApplicationCommandAutocomplete,
            Self::Component(_) => InteractionType::MessageComponent,
            Self::Modal(_) => InteractionType::ModalSubmit,
        }
    }

    fn handle(&self) -> &ResponseHandle {
        match self {
            Self::Ping(ping) => &ping.handle,
            Self::Command(command) => &command.handle,
            Self::Autocomplete(autocomplete) => &autocomplete.handle,
            Self::Component(component) => &component.handle,
            Self::Modal(modal) => &modal.handle,
        }
    }

    #[must_use]
    pub fn id(&self) -> &Snowflake {
        self.handle().id()
    }

    #[must_use]
    pub fn is_acknowledged(&self) -> bool {
        self.handle().is_acknowledged()
    }

    #[must_use]
    pub fn as_command(&self) -> Option<&CommandInteraction> {
        match self {
            Self::Command(command) => Some(command),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_autocomplete(&self) -> Option<&AutocompleteInteraction> {
        match self {
            Self::Autocomplete(autocomplete) => Some(autocomplete),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_component(&self) -> Option<&ComponentInteraction> {
        match self {
            Self::Component(component) => Some(component),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_modal(&self) -> Option<&ModalInteraction> {
        match self {
            Self::Modal(modal) => Some(modal),
            _ => None,
        }
    }

    /// Best-effort ephemeral feedback, used by the error-boundary middleware.
    /// Pings and autocompletes cannot carry user-visible messages.
    pub async fn reply_ephemeral(&self, content: &str) -> Result<()> {
        match self {
            Self::Command(command) => command.reply_ephemeral(content).await,
            Self::Component(component) => component.reply_ephemeral(content).await,
            Self::Modal(modal) => modal.reply_ephemeral(content).await,
            Self::Ping(_) | Self::Autocomplete(_) => Err(Error::validation(
                "interaction cannot carry a user-visible reply",
            )),
        }
    }
}

/// Extracts the invoking user, merging the top-level member when present.
fn invoker(member: Option<RawMember>, user: Option<User>) -> Result<(User, Option<Member>)> {
    match member {
        Some(raw_member) => {
            let user = raw_member
                .user
                .clone()
                .or(user)
                .ok_or_else(|| Error::resolution("interaction member has no user entry"))?;
            let member = Member::from_raw(raw_member, user.clone())?;
            Ok((user, Some(member)))
        }
        None => {
            let user =
                user.ok_or_else(|| Error::resolution("interaction has no invoking user"))?;
            Ok((user, None))
        }
    }
}

fn required_name(data: &RawInteractionData) -> Result<String> {
    data.name
        .clone()
        .ok_or_else(|| Error::resolution("command interaction carries no command name"))
}

fn required_custom_id(data: &RawInteractionData) -> Result<String> {
    data.custom_id
        .clone()
        .ok_or_else(|| Error::resolution("interaction carries no custom id"))
}

fn command_kind(data: &RawInteractionData) -> Result<CommandKind> {
    let code = data.kind.unwrap_or(1);
    CommandKind::from_code(code)
        .ok_or_else(|| Error::resolution(format!("unknown command kind code {code}")))
}
