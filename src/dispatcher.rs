//! The inbound front door: classifies payloads and routes them to command
//! handlers or event listeners.
//!
//! `dispatch` never returns an error. Anything that goes wrong for one
//! payload is logged and dropped there; the receive loop stays alive. Module
//! installation happens before serving starts, so steady-state dispatch reads
//! the registries without locking. The cooldown store is the one exception
//! and sits behind a mutex that is never held across an await.

use crate::command::registry::CommandRegistry;
use crate::command::resolver::{find_focused, materialize_args, resolve_leaf};
use crate::command::{Command, CommandContext, CommandKind};
use crate::config::BotConfig;
use crate::cooldown::{CooldownManager, scope_key};
use crate::errors::{Error, Result};
use crate::event::{EventBus, EventContext, EventPayload, names};
use crate::interaction::Interaction;
use crate::interaction::payload::{InteractionType, RawInteraction, RawOptionValue};
use crate::interaction::response::ResponseTransport;
use crate::middleware::{Next, endpoint};
use crate::module::Module;
use crate::module::registry::{ModuleChains, ModuleRegistry};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, instrument};

/// Routes every inbound payload. One per process.
pub struct Dispatcher {
    config: Arc<BotConfig>,
    transport: Arc<dyn ResponseTransport>,
    commands: CommandRegistry,
    events: EventBus,
    modules: ModuleRegistry,
    chains: ModuleChains,
    cooldowns: Arc<Mutex<CooldownManager>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(config: Arc<BotConfig>, transport: Arc<dyn ResponseTransport>) -> Self {
        Self {
            config,
            transport,
            commands: CommandRegistry::new(),
            events: EventBus::new(),
            modules: ModuleRegistry::new(),
            chains: ModuleChains::new(),
            cooldowns: Arc::new(Mutex::new(CooldownManager::new())),
        }
    }

    /// Installs a module (and its dependencies). Startup-time only: takes
    /// `&mut self`, so it cannot race in-flight dispatches.
    pub async fn add_module(&mut self, module: Arc<dyn Module>) -> Result<()> {
        self.modules
            .add(
                module,
                &self.config,
                &mut self.commands,
                &mut self.events,
                &mut self.chains,
            )
            .await
    }

    /// Uninstalls a module and everything it registered. Silently no-ops on
    /// an unknown id.
    pub fn remove_module(&mut self, id: &str) {
        self.modules
            .delete(id, &mut self.commands, &mut self.events, &mut self.chains);
    }

    #[must_use]
    pub fn module(&self, id: &str) -> Option<&Arc<dyn Module>> {
        self.modules.get(id)
    }

    /// Descriptors of every installed command, for synchronization against
    /// the platform's registration API.
    #[must_use]
    pub fn command_descriptors(&self) -> Vec<serde_json::Value> {
        self.commands.descriptors()
    }

    /// The live cooldown store, exposed for persistence and inspection.
    #[must_use]
    pub fn cooldowns(&self) -> &Arc<Mutex<CooldownManager>> {
        &self.cooldowns
    }

    /// Handles one inbound interaction payload. Never errors: a failure is
    /// logged and the payload dropped, keeping the receive loop alive.
    #[instrument(skip_all)]
    pub async fn dispatch(&self, payload: serde_json::Value) {
        if let Err(err) = self.try_dispatch(payload).await {
            error!(error = %err, "interaction dispatch failed");
        }
    }

    /// Fans a named gateway lifecycle event out to its subscribed listeners.
    pub async fn emit(&self, event_name: &str, payload: serde_json::Value) {
        self.fan_out(event_name, EventPayload::Gateway(payload)).await;
    }

    async fn try_dispatch(&self, payload: serde_json::Value) -> Result<()> {
        let raw: RawInteraction = serde_json::from_value(payload)?;
        let interaction = Arc::new(Interaction::from_raw(raw, Arc::clone(&self.transport))?);

        if let Interaction::Ping(ping) = interaction.as_ref() {
            debug!("acknowledging ping");
            return ping.pong().await;
        }

        match interaction.kind() {
            InteractionType::ApplicationCommand => self.dispatch_command(interaction).await,
            InteractionType::ApplicationCommandAutocomplete => {
                self.dispatch_autocomplete(&interaction).await
            }
            InteractionType::MessageComponent => {
                self.fan_out(names::MESSAGE_COMPONENT, EventPayload::Interaction(interaction))
                    .await;
                Ok(())
            }
            InteractionType::ModalSubmit => {
                self.fan_out(names::MODAL_SUBMIT, EventPayload::Interaction(interaction))
                    .await;
                Ok(())
            }
            InteractionType::Ping => unreachable!("ping handled above"),
        }
    }

    async fn dispatch_command(&self, interaction: Arc<Interaction>) -> Result<()> {
        let Some(command) = interaction.as_command() else {
            return Ok(());
        };
        let Some(registered) = self.commands.resolve(&command.command_name, command.command_kind)
        else {
            // Not ours: possibly a stale platform-side registration.
            debug!(command = %command.command_name, "no registered command for invocation");
            return Ok(());
        };
        let leaf = resolve_leaf(&registered.command, &command.options)?;
        info!(command = %leaf.qualified_name, user = %command.user.id, "command invoked");

        let links = self
            .chains
            .get(&registered.module_id)
            .map_or(&[][..], Vec::as_slice);
        let payload = EventPayload::Interaction(Arc::clone(&interaction));

        // The endpoint owns its inputs so the chain can hand it through
        // boxed futures.
        let ctx_interaction = Arc::clone(&interaction);
        let leaf_command = Arc::clone(&leaf.command);
        let qualified_name = leaf.qualified_name.clone();
        let options = leaf.options.to_vec();
        let config = Arc::clone(&self.config);
        let cooldowns = Arc::clone(&self.cooldowns);

        Next::chain(
            links,
            endpoint(move || {
                command_endpoint(
                    ctx_interaction,
                    leaf_command,
                    qualified_name,
                    options,
                    config,
                    cooldowns,
                )
            }),
        )
        .run(&payload)
        .await
    }

    async fn dispatch_autocomplete(&self, interaction: &Arc<Interaction>) -> Result<()> {
        let Some(autocomplete) = interaction.as_autocomplete() else {
            return Ok(());
        };
        let Some(registered) = self
            .commands
            .resolve(&autocomplete.command_name, CommandKind::Slash)
        else {
            debug!(command = %autocomplete.command_name, "autocomplete for unknown command");
            return Ok(());
        };
        let leaf = resolve_leaf(&registered.command, &autocomplete.options)?;
        let Some(focused) = find_focused(leaf.options) else {
            debug!(command = %leaf.qualified_name, "autocomplete without a focused option");
            return Ok(());
        };
        let Some(provider) = leaf
            .command
            .option(&focused.name)
            .and_then(crate::command::CommandOption::autocomplete_provider)
        else {
            debug!(
                command = %leaf.qualified_name,
                option = %focused.name,
                "focused option has no autocomplete provider"
            );
            return Ok(());
        };

        let partial = partial_text(focused);
        let choices = provider.suggest(&partial).await;
        debug!(
            command = %leaf.qualified_name,
            option = %focused.name,
            count = choices.len(),
            "autocomplete suggestions produced"
        );
        autocomplete.respond(choices).await
    }

    /// Runs every matching listener for a named event, each wrapped in its
    /// own module's chain. Listeners are isolated: one failing never stops
    /// the rest.
    async fn fan_out(&self, event_name: &str, payload: EventPayload) {
        for registered in self.events.handlers_for(event_name) {
            if !registered.event.matches(&payload) {
                continue;
            }
            let links = self
                .chains
                .get(&registered.module_id)
                .map_or(&[][..], Vec::as_slice);
            let event = Arc::clone(&registered.event);
            let ctx_payload = payload.clone();
            let config = Arc::clone(&self.config);

            let outcome = Next::chain(
                links,
                endpoint(move || async move {
                    let ctx = EventContext {
                        payload: ctx_payload,
                        config,
                    };
                    event.run(&ctx).await
                }),
            )
            .run(&payload)
            .await;

            if let Err(err) = outcome {
                error!(
                    event = event_name,
                    module = %registered.module_id,
                    error = %err,
                    "event listener failed"
                );
            }
        }
    }
}

/// The execution wrapped by a command's middleware chain: access checks,
/// argument materialization, the cooldown gate, then the leaf handler.
async fn command_endpoint(
    interaction: Arc<Interaction>,
    leaf: Arc<Command>,
    qualified_name: String,
    options: Vec<RawOptionValue>,
    config: Arc<BotConfig>,
    cooldowns: Arc<Mutex<CooldownManager>>,
) -> Result<()> {
    let command = interaction
        .as_command()
        .ok_or_else(|| Error::resolution("command endpoint requires a command interaction"))?;

    if leaf.guild_only() && command.guild_id.is_none() {
        return Err(Error::validation("This command can only be used in a server."));
    }
    if leaf.owner_only() && !config.is_owner(&command.user.id) {
        return Err(Error::validation("Only the bot owner can use this command."));
    }
    let required = leaf.required_permissions();
    if required != 0 {
        let held = command
            .member
            .as_ref()
            .map_or(0, |member| member.permissions);
        if held & required != required {
            return Err(Error::validation(
                "You don't have permission to use this command.",
            ));
        }
    }

    let args = materialize_args(&leaf, &options, &command.resolved)?;

    if leaf.cooldown_secs() > 0 {
        let guild = if leaf.guild_only() {
            command.guild_id.as_ref()
        } else {
            None
        };
        let key = scope_key(&qualified_name, &command.user.id, guild);
        // Armed before the handler runs, so a second invocation arriving
        // while the first is still awaiting is already gated.
        let gated = {
            let mut store = cooldowns.lock().unwrap_or_else(PoisonError::into_inner);
            match store.get(&key) {
                Some(until) => Some(until),
                None => {
                    store.set(&key, leaf.cooldown_secs());
                    None
                }
            }
        };
        if let Some(until) = gated {
            return Err(Error::Validation(config.messages.cooldown_message(&until)));
        }
    }

    let ctx = CommandContext::new(interaction, args, config)?;
    leaf.execute(&ctx).await
}

/// The partially-typed text of a focused option. Numeric partials arrive as
/// numbers and are suggested against their decimal rendering.
fn partial_text(focused: &RawOptionValue) -> String {
    match &focused.value {
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::resolver::CommandArgs;
    use crate::command::{AutocompleteProvider, CommandHandler, CommandOption};
    use crate::event::Event;
    use crate::interaction::Updatable;
    use crate::interaction::response::{Choice, ResponseData};
    use crate::middleware::{ErrorBoundary, Middleware};
    use crate::test_utils::{
        RecordingTransport, autocomplete_payload, component_payload, guild_slash_payload,
        ping_payload, slash_payload,
    };
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct TestModule {
        id: &'static str,
        commands: Vec<Arc<Command>>,
        events: Vec<Arc<dyn Event>>,
        middleware: Vec<Arc<dyn Middleware>>,
    }

    impl TestModule {
        fn new(id: &'static str) -> Self {
            Self {
                id,
                commands: Vec::new(),
                events: Vec::new(),
                middleware: Vec::new(),
            }
        }

        fn command(mut self, command: Arc<Command>) -> Self {
            self.commands.push(command);
            self
        }

        fn event(mut self, event: Arc<dyn Event>) -> Self {
            self.events.push(event);
            self
        }

        fn link(mut self, link: Arc<dyn Middleware>) -> Self {
            self.middleware.push(link);
            self
        }
    }

    #[async_trait]
    impl Module for TestModule {
        fn id(&self) -> &str {
            self.id
        }

        fn commands(&self) -> Vec<Arc<Command>> {
            self.commands.clone()
        }

        fn events(&self) -> Vec<Arc<dyn Event>> {
            self.events.clone()
        }

        fn middleware(&self) -> Vec<Arc<dyn Middleware>> {
            self.middleware.clone()
        }
    }

    /// Replies with the required `text` option.
    struct EchoHandler;

    #[async_trait]
    impl CommandHandler for EchoHandler {
        async fn execute(&self, ctx: &CommandContext) -> Result<()> {
            let text = ctx.args.require_string("text")?;
            ctx.reply(ResponseData::text(text)).await
        }
    }

    struct CountingHandler {
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CommandHandler for CountingHandler {
        async fn execute(&self, ctx: &CommandContext) -> Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            ctx.reply(ResponseData::text("done")).await
        }
    }

    /// Middleware that never continues the chain.
    struct Halter;

    #[async_trait]
    impl Middleware for Halter {
        async fn handle(&self, _payload: &EventPayload, _next: Next<'_>) -> Result<()> {
            Ok(())
        }
    }

    struct ConfirmListener {
        ran: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Event for ConfirmListener {
        fn event_name(&self) -> &str {
            names::MESSAGE_COMPONENT
        }

        fn matches(&self, payload: &EventPayload) -> bool {
            payload
                .interaction()
                .and_then(|interaction| interaction.as_component())
                .is_some_and(|component| component.custom_id.starts_with("confirm:"))
        }

        async fn run(&self, ctx: &EventContext) -> Result<()> {
            self.ran.store(true, Ordering::SeqCst);
            let component = ctx
                .interaction()
                .and_then(|interaction| interaction.as_component())
                .ok_or_else(|| Error::resolution("component listener got a non-component"))?;
            component.update(ResponseData::text("confirmed")).await
        }
    }

    struct GatewayProbe {
        name: &'static str,
        ran: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Event for GatewayProbe {
        fn event_name(&self) -> &str {
            self.name
        }

        async fn run(&self, ctx: &EventContext) -> Result<()> {
            assert!(ctx.payload.gateway().is_some());
            self.ran.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct StaticSuggestions;

    #[async_trait]
    impl AutocompleteProvider for StaticSuggestions {
        async fn suggest(&self, partial: &str) -> Vec<Choice> {
            ["groceries", "gas", "rent"]
                .iter()
                .filter(|candidate| candidate.starts_with(partial))
                .map(|candidate| Choice::string(*candidate, *candidate))
                .collect()
        }
    }

    async fn dispatcher_with(
        config: Arc<BotConfig>,
        module: TestModule,
    ) -> Result<(Dispatcher, Arc<RecordingTransport>)> {
        let transport = RecordingTransport::new();
        let mut dispatcher = Dispatcher::new(config, Arc::clone(&transport) as _);
        dispatcher.add_module(Arc::new(module)).await?;
        Ok((dispatcher, transport))
    }

    fn default_config() -> Arc<BotConfig> {
        Arc::new(BotConfig::default())
    }

    #[tokio::test]
    async fn ping_is_acknowledged_end_to_end() -> Result<()> {
        let (dispatcher, transport) =
            dispatcher_with(default_config(), TestModule::new("core")).await?;

        dispatcher.dispatch(ping_payload()).await;
        assert_eq!(transport.create_count(), 1);
        assert_eq!(transport.last_create_kind(), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn nested_command_executes_with_materialized_args() -> Result<()> {
        let add = Command::slash("add", "Adds a note")
            .option(CommandOption::string("text", "Note text").required())
            .handler(EchoHandler)
            .build();
        let notes = Command::slash("notes", "Note management").child(add).build();
        let cases = Command::slash("cases", "Case management").child(notes).build();
        let (dispatcher, transport) =
            dispatcher_with(default_config(), TestModule::new("cases").command(cases)).await?;

        dispatcher
            .dispatch(slash_payload(
                "cases",
                json!([
                    { "name": "notes", "type": 2, "options": [
                        { "name": "add", "type": 1, "options": [
                            { "name": "text", "type": 3, "value": "remember this" }
                        ]}
                    ]}
                ]),
            ))
            .await;

        assert_eq!(transport.create_count(), 1);
        assert_eq!(transport.last_create_content().as_deref(), Some("remember this"));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_command_is_a_silent_no_op() -> Result<()> {
        let (dispatcher, transport) =
            dispatcher_with(default_config(), TestModule::new("core")).await?;

        dispatcher.dispatch(slash_payload("nope", json!([]))).await;
        assert_eq!(transport.create_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn non_leaf_invocation_never_reaches_the_transport() -> Result<()> {
        let add = Command::slash("add", "Adds").handler(EchoHandler).build();
        let cases = Command::slash("cases", "Cases").child(add).build();
        let (dispatcher, transport) =
            dispatcher_with(default_config(), TestModule::new("cases").command(cases)).await?;

        dispatcher.dispatch(slash_payload("cases", json!([]))).await;
        assert_eq!(transport.create_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn cooldown_gates_the_second_invocation_until_expiry() -> Result<()> {
        let config = default_config();
        let runs = Arc::new(AtomicUsize::new(0));
        let hello = Command::slash("hello", "Says hello")
            .cooldown_secs(60)
            .handler(CountingHandler { runs: Arc::clone(&runs) })
            .build();
        let module = TestModule::new("greeter")
            .command(hello)
            .link(Arc::new(ErrorBoundary::new(Arc::clone(&config))));
        let (dispatcher, transport) = dispatcher_with(config, module).await?;

        dispatcher.dispatch(slash_payload("hello", json!([]))).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        // Second invocation inside the window: gated, ephemeral notice.
        dispatcher.dispatch(slash_payload("hello", json!([]))).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(transport.create_count(), 2);
        assert!(transport.last_create_is_ephemeral());
        let notice = transport.last_create_content().expect("cooldown notice");
        assert!(notice.contains("too often"));

        // Simulate the window elapsing, then the command runs again.
        let key = scope_key("hello", &crate::interaction::payload::Snowflake::from("100"), None);
        dispatcher
            .cooldowns()
            .lock()
            .expect("cooldown lock")
            .set_expiry(&key, Utc::now() - Duration::seconds(1));
        dispatcher.dispatch(slash_payload("hello", json!([]))).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        Ok(())
    }

    #[tokio::test]
    async fn middleware_short_circuit_suppresses_execution() -> Result<()> {
        let runs = Arc::new(AtomicUsize::new(0));
        let hello = Command::slash("hello", "Says hello")
            .handler(CountingHandler { runs: Arc::clone(&runs) })
            .build();
        let module = TestModule::new("gated").command(hello).link(Arc::new(Halter));
        let (dispatcher, transport) = dispatcher_with(default_config(), module).await?;

        dispatcher.dispatch(slash_payload("hello", json!([]))).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(transport.create_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn guild_only_command_in_dm_gets_ephemeral_feedback() -> Result<()> {
        let config = default_config();
        let purge = Command::slash("purge", "Bulk delete")
            .guild_only()
            .handler(EchoHandler)
            .build();
        let module = TestModule::new("moderation")
            .command(purge)
            .link(Arc::new(ErrorBoundary::new(Arc::clone(&config))));
        let (dispatcher, transport) = dispatcher_with(config, module).await?;

        dispatcher.dispatch(slash_payload("purge", json!([]))).await;
        assert_eq!(transport.create_count(), 1);
        assert!(transport.last_create_is_ephemeral());
        Ok(())
    }

    #[tokio::test]
    async fn owner_only_command_rejects_non_owners() -> Result<()> {
        let config = default_config();
        let runs = Arc::new(AtomicUsize::new(0));
        let shutdown = Command::slash("shutdown", "Stops the bot")
            .owner_only()
            .handler(CountingHandler { runs: Arc::clone(&runs) })
            .build();
        let module = TestModule::new("admin")
            .command(shutdown)
            .link(Arc::new(ErrorBoundary::new(Arc::clone(&config))));
        let (dispatcher, transport) = dispatcher_with(config, module).await?;

        dispatcher.dispatch(slash_payload("shutdown", json!([]))).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(transport.last_create_is_ephemeral());
        Ok(())
    }

    #[tokio::test]
    async fn permission_bits_are_checked_against_the_member() -> Result<()> {
        let config = default_config();
        let runs = Arc::new(AtomicUsize::new(0));
        let ban = Command::slash("ban", "Bans")
            .permissions(4)
            .handler(CountingHandler { runs: Arc::clone(&runs) })
            .build();
        let module = TestModule::new("moderation")
            .command(ban)
            .link(Arc::new(ErrorBoundary::new(Arc::clone(&config))));
        let (dispatcher, transport) = dispatcher_with(config, module).await?;

        // Member holds only bit 1: rejected.
        dispatcher
            .dispatch(guild_slash_payload("ban", json!([]), "500", "1"))
            .await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(transport.last_create_is_ephemeral());

        // Member holds bits 1|4: allowed.
        dispatcher
            .dispatch(guild_slash_payload("ban", json!([]), "500", "5"))
            .await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn component_fan_out_respects_the_match_predicate() -> Result<()> {
        let confirm_ran = Arc::new(AtomicBool::new(false));
        let other_ran = Arc::new(AtomicBool::new(false));
        let module = TestModule::new("prompts")
            .event(Arc::new(ConfirmListener { ran: Arc::clone(&confirm_ran) }))
            .event(Arc::new(GatewayProbe {
                name: "message.create",
                ran: Arc::clone(&other_ran),
            }));
        let (dispatcher, transport) = dispatcher_with(default_config(), module).await?;

        dispatcher.dispatch(component_payload("confirm:42")).await;
        assert!(confirm_ran.load(Ordering::SeqCst));
        assert!(!other_ran.load(Ordering::SeqCst));
        // The listener updated the parent message with the one-shot response.
        assert_eq!(transport.last_create_kind(), Some(7));

        // A non-matching custom id is skipped.
        confirm_ran.store(false, Ordering::SeqCst);
        dispatcher.dispatch(component_payload("cancel:42")).await;
        assert!(!confirm_ran.load(Ordering::SeqCst));
        Ok(())
    }

    struct FailingListener {
        name: &'static str,
    }

    #[async_trait]
    impl Event for FailingListener {
        fn event_name(&self) -> &str {
            self.name
        }

        async fn run(&self, _ctx: &EventContext) -> Result<()> {
            Err(Error::Transport("listener exploded".into()))
        }
    }

    #[tokio::test]
    async fn one_failing_listener_never_stops_the_rest() -> Result<()> {
        let ran = Arc::new(AtomicBool::new(false));
        let module = TestModule::new("audit")
            .event(Arc::new(FailingListener { name: "member.join" }))
            .event(Arc::new(GatewayProbe {
                name: "member.join",
                ran: Arc::clone(&ran),
            }));
        let (dispatcher, _transport) = dispatcher_with(default_config(), module).await?;

        dispatcher.emit("member.join", json!({ "user_id": "77" })).await;
        assert!(ran.load(Ordering::SeqCst));
        Ok(())
    }

    #[tokio::test]
    async fn gateway_events_reach_their_listeners() -> Result<()> {
        let ran = Arc::new(AtomicBool::new(false));
        let module = TestModule::new("audit").event(Arc::new(GatewayProbe {
            name: "member.join",
            ran: Arc::clone(&ran),
        }));
        let (dispatcher, _transport) = dispatcher_with(default_config(), module).await?;

        dispatcher.emit("member.join", json!({ "user_id": "77" })).await;
        assert!(ran.load(Ordering::SeqCst));
        Ok(())
    }

    #[tokio::test]
    async fn autocomplete_routes_to_the_focused_options_provider() -> Result<()> {
        let spend = Command::slash("spend", "Spend from an envelope")
            .option(
                CommandOption::string("envelope", "Which envelope")
                    .required()
                    .autocomplete(Arc::new(StaticSuggestions)),
            )
            .handler(EchoHandler)
            .build();
        let (dispatcher, transport) =
            dispatcher_with(default_config(), TestModule::new("budget").command(spend)).await?;

        dispatcher
            .dispatch(autocomplete_payload(
                "spend",
                json!([{ "name": "envelope", "type": 3, "value": "g", "focused": true }]),
            ))
            .await;

        assert_eq!(transport.create_count(), 1);
        assert_eq!(transport.last_create_kind(), Some(8));
        Ok(())
    }

    #[tokio::test]
    async fn removing_a_module_unroutes_its_commands() -> Result<()> {
        let hello = Command::slash("hello", "Says hello").handler(EchoHandler).build();
        let config = default_config();
        let transport = RecordingTransport::new();
        let mut dispatcher = Dispatcher::new(config, Arc::clone(&transport) as _);
        dispatcher
            .add_module(Arc::new(TestModule::new("greeter").command(hello)))
            .await?;
        assert_eq!(dispatcher.command_descriptors().len(), 1);

        dispatcher.remove_module("greeter");
        assert!(dispatcher.module("greeter").is_none());
        dispatcher.dispatch(slash_payload("hello", json!([]))).await;
        assert_eq!(transport.create_count(), 0);
        Ok(())
    }
}
