//! Declarative command descriptors and their execution surface.
//!
//! Commands form a tree: a top-level command either executes business logic
//! itself (a leaf, carrying a handler) or owns children representing one
//! level of grouping, whose own children are the actual leaves. The platform
//! allows at most two levels of nesting below the root. A command with
//! children is never itself executable; only leaves run.

/// Name-keyed storage for top-level commands.
pub mod registry;
/// Tree walking and option materialization.
pub mod resolver;

use crate::config::BotConfig;
use crate::errors::{Error, Result};
use crate::interaction::payload::{Snowflake, User};
use crate::interaction::response::{Choice, ResponseData};
use crate::interaction::{CommandInteraction, Interaction, Replyable};
use async_trait::async_trait;
use resolver::CommandArgs;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Which registration surface a top-level command occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Chat-input command with typed options.
    Slash,
    /// User context-menu command.
    User,
    /// Message context-menu command.
    Message,
}

impl CommandKind {
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Slash),
            2 => Some(Self::User),
            3 => Some(Self::Message),
            _ => None,
        }
    }

    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Slash => 1,
            Self::User => 2,
            Self::Message => 3,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Slash => "slash",
            Self::User => "user",
            Self::Message => "message",
        })
    }
}

/// Caller-supplied filter producing autocomplete choices for the
/// partially-typed current value of one option.
#[async_trait]
pub trait AutocompleteProvider: Send + Sync {
    async fn suggest(&self, partial: &str) -> Vec<Choice>;
}

/// Option kind plus the constraints valid for it.
#[derive(Clone)]
pub enum OptionKind {
    String {
        min_length: Option<u32>,
        max_length: Option<u32>,
        choices: Vec<Choice>,
        autocomplete: Option<Arc<dyn AutocompleteProvider>>,
    },
    Integer {
        min: Option<i64>,
        max: Option<i64>,
        choices: Vec<Choice>,
        autocomplete: Option<Arc<dyn AutocompleteProvider>>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
    },
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Attachment,
}

impl OptionKind {
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::String { .. } => 3,
            Self::Integer { .. } => 4,
            Self::Boolean => 5,
            Self::User => 6,
            Self::Channel => 7,
            Self::Role => 8,
            Self::Mentionable => 9,
            Self::Number { .. } => 10,
            Self::Attachment => 11,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::String { .. } => "string",
            Self::Integer { .. } => "integer",
            Self::Number { .. } => "number",
            Self::Boolean => "boolean",
            Self::User => "user",
            Self::Channel => "channel",
            Self::Role => "role",
            Self::Mentionable => "mentionable",
            Self::Attachment => "attachment",
        }
    }
}

impl fmt::Debug for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One declared option of a chat-input leaf command.
#[derive(Debug, Clone)]
pub struct CommandOption {
    pub name: String,
    pub description: String,
    pub kind: OptionKind,
    pub required: bool,
}

impl CommandOption {
    fn new(name: impl Into<String>, description: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
        }
    }

    #[must_use]
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(
            name,
            description,
            OptionKind::String {
                min_length: None,
                max_length: None,
                choices: Vec::new(),
                autocomplete: None,
            },
        )
    }

    #[must_use]
    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(
            name,
            description,
            OptionKind::Integer {
                min: None,
                max: None,
                choices: Vec::new(),
                autocomplete: None,
            },
        )
    }

    #[must_use]
    pub fn number(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionKind::Number { min: None, max: None })
    }

    #[must_use]
    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionKind::Boolean)
    }

    #[must_use]
    pub fn user(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionKind::User)
    }

    #[must_use]
    pub fn channel(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionKind::Channel)
    }

    #[must_use]
    pub fn role(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionKind::Role)
    }

    #[must_use]
    pub fn mentionable(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionKind::Mentionable)
    }

    #[must_use]
    pub fn attachment(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionKind::Attachment)
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Minimum length constraint; only meaningful for string options.
    #[must_use]
    pub fn min_length(mut self, length: u32) -> Self {
        if let OptionKind::String { min_length, .. } = &mut self.kind {
            *min_length = Some(length);
        }
        self
    }

    /// Maximum length constraint; only meaningful for string options.
    #[must_use]
    pub fn max_length(mut self, length: u32) -> Self {
        if let OptionKind::String { max_length, .. } = &mut self.kind {
            *max_length = Some(length);
        }
        self
    }

    /// Minimum value constraint for integer options.
    #[must_use]
    pub fn min_value(mut self, value: i64) -> Self {
        if let OptionKind::Integer { min, .. } = &mut self.kind {
            *min = Some(value);
        }
        self
    }

    /// Maximum value constraint for integer options.
    #[must_use]
    pub fn max_value(mut self, value: i64) -> Self {
        if let OptionKind::Integer { max, .. } = &mut self.kind {
            *max = Some(value);
        }
        self
    }

    /// Minimum value constraint for number options.
    #[must_use]
    pub fn min_number(mut self, value: f64) -> Self {
        if let OptionKind::Number { min, .. } = &mut self.kind {
            *min = Some(value);
        }
        self
    }

    /// Maximum value constraint for number options.
    #[must_use]
    pub fn max_number(mut self, value: f64) -> Self {
        if let OptionKind::Number { max, .. } = &mut self.kind {
            *max = Some(value);
        }
        self
    }

    /// Adds a fixed choice; meaningful for string and integer options.
    #[must_use]
    pub fn choice(mut self, choice: Choice) -> Self {
        match &mut self.kind {
            OptionKind::String { choices, .. } | OptionKind::Integer { choices, .. } => {
                choices.push(choice);
            }
            _ => {}
        }
        self
    }

    /// Attaches an autocomplete provider; meaningful for string and integer
    /// options.
    #[must_use]
    pub fn autocomplete(mut self, provider: Arc<dyn AutocompleteProvider>) -> Self {
        match &mut self.kind {
            OptionKind::String { autocomplete, .. } | OptionKind::Integer { autocomplete, .. } => {
                *autocomplete = Some(provider);
            }
            _ => {}
        }
        self
    }

    /// The attached autocomplete provider, if any.
    #[must_use]
    pub fn autocomplete_provider(&self) -> Option<&Arc<dyn AutocompleteProvider>> {
        match &self.kind {
            OptionKind::String { autocomplete, .. } | OptionKind::Integer { autocomplete, .. } => {
                autocomplete.as_ref()
            }
            _ => None,
        }
    }

    /// Descriptor fragment for the command-registration boundary.
    #[must_use]
    pub fn descriptor(&self) -> serde_json::Value {
        let mut body = json!({
            "type": self.kind.code(),
            "name": self.name,
            "description": self.description,
            "required": self.required,
        });
        match &self.kind {
            OptionKind::String {
                min_length,
                max_length,
                choices,
                autocomplete,
            } => {
                if let Some(length) = min_length {
                    body["min_length"] = json!(length);
                }
                if let Some(length) = max_length {
                    body["max_length"] = json!(length);
                }
                if !choices.is_empty() {
                    body["choices"] = json!(choices);
                }
                if autocomplete.is_some() {
                    body["autocomplete"] = json!(true);
                }
            }
            OptionKind::Integer {
                min,
                max,
                choices,
                autocomplete,
            } => {
                if let Some(value) = min {
                    body["min_value"] = json!(value);
                }
                if let Some(value) = max {
                    body["max_value"] = json!(value);
                }
                if !choices.is_empty() {
                    body["choices"] = json!(choices);
                }
                if autocomplete.is_some() {
                    body["autocomplete"] = json!(true);
                }
            }
            OptionKind::Number { min, max } => {
                if let Some(value) = min {
                    body["min_value"] = json!(value);
                }
                if let Some(value) = max {
                    body["max_value"] = json!(value);
                }
            }
            _ => {}
        }
        body
    }
}

/// Execution context handed to a leaf command's handler.
pub struct CommandContext {
    interaction: Arc<Interaction>,
    pub args: CommandArgs,
    pub config: Arc<BotConfig>,
}

impl CommandContext {
    /// Builds a context; the interaction must be the command variant.
    pub fn new(
        interaction: Arc<Interaction>,
        args: CommandArgs,
        config: Arc<BotConfig>,
    ) -> Result<Self> {
        if interaction.as_command().is_none() {
            return Err(Error::resolution(
                "command context requires a command interaction",
            ));
        }
        Ok(Self {
            interaction,
            args,
            config,
        })
    }

    #[must_use]
    pub fn interaction(&self) -> &Arc<Interaction> {
        &self.interaction
    }

    #[must_use]
    pub fn command(&self) -> &CommandInteraction {
        match self.interaction.as_ref() {
            Interaction::Command(command) => command,
            _ => unreachable!("variant checked at construction"),
        }
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.command().user
    }

    #[must_use]
    pub fn guild_id(&self) -> Option<&Snowflake> {
        self.command().guild_id.as_ref()
    }

    pub async fn reply(&self, data: ResponseData) -> Result<()> {
        self.command().reply(data).await
    }

    pub async fn reply_ephemeral(&self, content: &str) -> Result<()> {
        self.command().reply_ephemeral(content).await
    }

    pub async fn defer(&self) -> Result<()> {
        self.command().defer().await
    }

    pub async fn edit_response(&self, data: ResponseData) -> Result<()> {
        self.command().edit_response(data).await
    }

    pub async fn follow_up(&self, data: ResponseData) -> Result<()> {
        self.command().follow_up(data).await
    }
}

/// Business logic of a leaf command.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// One node of the command tree. Immutable once built; owned by its declaring
/// module for the process lifetime.
pub struct Command {
    name: String,
    description: String,
    kind: CommandKind,
    options: Vec<CommandOption>,
    children: Vec<Arc<Command>>,
    cooldown_secs: u64,
    guild_only: bool,
    owner_only: bool,
    required_permissions: u64,
    handler: Option<Arc<dyn CommandHandler>>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("children", &self.children.len())
            .field("leaf", &self.is_leaf())
            .finish_non_exhaustive()
    }
}

impl Command {
    /// Starts a chat-input command declaration.
    #[must_use]
    pub fn slash(name: impl Into<String>, description: impl Into<String>) -> CommandBuilder {
        CommandBuilder::new(name.into(), description.into(), CommandKind::Slash)
    }

    /// Starts a user context-menu command declaration.
    #[must_use]
    pub fn user_menu(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder::new(name.into(), String::new(), CommandKind::User)
    }

    /// Starts a message context-menu command declaration.
    #[must_use]
    pub fn message_menu(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder::new(name.into(), String::new(), CommandKind::Message)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    #[must_use]
    pub fn options(&self) -> &[CommandOption] {
        &self.options
    }

    /// Looks up a declared option by name.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&CommandOption> {
        self.options.iter().find(|option| option.name == name)
    }

    #[must_use]
    pub fn children(&self) -> &[Arc<Command>] {
        &self.children
    }

    /// Looks up a child command by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Arc<Command>> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Whether this node is executable (no children).
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[must_use]
    pub fn cooldown_secs(&self) -> u64 {
        self.cooldown_secs
    }

    #[must_use]
    pub fn guild_only(&self) -> bool {
        self.guild_only
    }

    #[must_use]
    pub fn owner_only(&self) -> bool {
        self.owner_only
    }

    #[must_use]
    pub fn required_permissions(&self) -> u64 {
        self.required_permissions
    }

    /// Runs the leaf's business logic. Invoking a node with children (or a
    /// leaf declared without a handler) is a programmer error.
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        if !self.is_leaf() {
            return Err(Error::NonLeafCommand(self.name.clone()));
        }
        match &self.handler {
            Some(handler) => handler.execute(ctx).await,
            None => Err(Error::NonLeafCommand(self.name.clone())),
        }
    }

    /// Descriptor for the external registrar, suitable for synchronization
    /// against the platform's command-registration API.
    #[must_use]
    pub fn descriptor(&self) -> serde_json::Value {
        let options: Vec<serde_json::Value> = if self.children.is_empty() {
            self.options.iter().map(CommandOption::descriptor).collect()
        } else {
            self.children.iter().map(|child| child.child_descriptor()).collect()
        };
        json!({
            "name": self.name,
            "description": self.description,
            "type": self.kind.code(),
            "options": options,
            "default_member_permissions": if self.required_permissions == 0 {
                serde_json::Value::Null
            } else {
                json!(self.required_permissions.to_string())
            },
            "contexts": if self.guild_only { json!([0]) } else { json!([0, 1, 2]) },
        })
    }

    /// Nested descriptor fragment: subcommand for leaves, subcommand group
    /// for children that nest further.
    fn child_descriptor(&self) -> serde_json::Value {
        let (kind, options): (u8, Vec<serde_json::Value>) = if self.children.is_empty() {
            (1, self.options.iter().map(CommandOption::descriptor).collect())
        } else {
            (2, self.children.iter().map(|child| child.child_descriptor()).collect())
        };
        json!({
            "type": kind,
            "name": self.name,
            "description": self.description,
            "options": options,
        })
    }
}

/// Builder for [`Command`] declarations.
pub struct CommandBuilder {
    name: String,
    description: String,
    kind: CommandKind,
    options: Vec<CommandOption>,
    children: Vec<Arc<Command>>,
    cooldown_secs: u64,
    guild_only: bool,
    owner_only: bool,
    required_permissions: u64,
    handler: Option<Arc<dyn CommandHandler>>,
}

impl CommandBuilder {
    fn new(name: String, description: String, kind: CommandKind) -> Self {
        Self {
            name,
            description,
            kind,
            options: Vec::new(),
            children: Vec::new(),
            cooldown_secs: 0,
            guild_only: false,
            owner_only: false,
            required_permissions: 0,
            handler: None,
        }
    }

    #[must_use]
    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    #[must_use]
    pub fn child(mut self, child: Arc<Command>) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn handler<H: CommandHandler + 'static>(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Per-scope-key cooldown in seconds; 0 disables the gate.
    #[must_use]
    pub fn cooldown_secs(mut self, secs: u64) -> Self {
        self.cooldown_secs = secs;
        self
    }

    #[must_use]
    pub fn guild_only(mut self) -> Self {
        self.guild_only = true;
        self
    }

    #[must_use]
    pub fn owner_only(mut self) -> Self {
        self.owner_only = true;
        self
    }

    /// Platform permission bits the invoking member must hold.
    #[must_use]
    pub fn permissions(mut self, bits: u64) -> Self {
        self.required_permissions = bits;
        self
    }

    #[must_use]
    pub fn build(mut self) -> Arc<Command> {
        // A node with children is never itself executable.
        if !self.children.is_empty() && self.handler.is_some() {
            warn!(
                command = %self.name,
                "command declares both children and a handler; dropping the handler"
            );
            self.handler = None;
        }
        Arc::new(Command {
            name: self.name,
            description: self.description,
            kind: self.kind,
            options: self.options,
            children: self.children,
            cooldown_secs: self.cooldown_secs,
            guild_only: self.guild_only,
            owner_only: self.owner_only,
            required_permissions: self.required_permissions,
            handler: self.handler,
        })
    }
}
