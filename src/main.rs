//! Demo runner: installs a small greeter module and feeds synthetic payloads
//! through a loopback gateway, logging every outbound platform call.

use async_trait::async_trait;
use commandeer::interaction::payload::Snowflake;
use commandeer::interaction::response::InteractionResponse;
use commandeer::{
    AutocompleteProvider, BotConfig, Choice, Command, CommandContext, CommandHandler,
    CommandOption, Dispatcher, ErrorBoundary, Error, Event, EventContext, EventPayload, Gateway,
    Middleware, Module, ResponseData, ResponseTransport, Result, Updatable,
};
use dotenvy::dotenv;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Transport that logs outbound calls instead of hitting a REST API.
struct ConsoleTransport;

#[async_trait]
impl ResponseTransport for ConsoleTransport {
    async fn create_response(
        &self,
        id: &Snowflake,
        _token: &str,
        response: &InteractionResponse,
    ) -> Result<()> {
        info!(interaction = %id, body = %response.to_wire(), "create response");
        Ok(())
    }

    async fn edit_original(&self, _token: &str, data: &ResponseData) -> Result<()> {
        info!(content = ?data.content, "edit original response");
        Ok(())
    }

    async fn create_followup(&self, _token: &str, data: &ResponseData) -> Result<()> {
        info!(content = ?data.content, "create follow-up");
        Ok(())
    }
}

/// Gateway that hands payloads straight back to the dispatcher.
struct LoopbackGateway {
    dispatcher: Arc<Dispatcher>,
}

#[async_trait]
impl Gateway for LoopbackGateway {
    async fn connect(&self) -> Result<()> {
        info!("loopback gateway connected");
        Ok(())
    }

    async fn send(&self, shard_id: u64, payload: serde_json::Value) -> Result<()> {
        info!(shard = shard_id, "payload received");
        self.dispatcher.dispatch(payload).await;
        Ok(())
    }
}

/// Replies with a greeting for the `name` option, falling back to the
/// invoker's display name.
struct GreetHandler;

#[async_trait]
impl CommandHandler for GreetHandler {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let name = ctx
            .args
            .string("name")
            .map_or_else(|| ctx.user().display_name().to_string(), str::to_string);
        ctx.reply(ResponseData::text(format!("Hello, {name}!"))).await
    }
}

/// Suggests a few canned names for the `name` option.
struct NameSuggestions;

#[async_trait]
impl AutocompleteProvider for NameSuggestions {
    async fn suggest(&self, partial: &str) -> Vec<Choice> {
        ["world", "friend", "stranger"]
            .iter()
            .filter(|candidate| candidate.starts_with(partial))
            .map(|candidate| Choice::string(*candidate, *candidate))
            .collect()
    }
}

/// Edits the prompt message when its "greet again" button is clicked.
struct GreetAgainListener;

#[async_trait]
impl Event for GreetAgainListener {
    fn event_name(&self) -> &str {
        commandeer::event::names::MESSAGE_COMPONENT
    }

    fn matches(&self, payload: &EventPayload) -> bool {
        payload
            .interaction()
            .and_then(|interaction| interaction.as_component())
            .is_some_and(|component| component.custom_id == "greet:again")
    }

    async fn run(&self, ctx: &EventContext) -> Result<()> {
        let component = ctx
            .interaction()
            .and_then(|interaction| interaction.as_component())
            .ok_or_else(|| Error::resolution("component listener got a non-component"))?;
        component.update(ResponseData::text("Hello again!")).await
    }
}

struct GreeterModule {
    config: Arc<BotConfig>,
}

#[async_trait]
impl Module for GreeterModule {
    fn id(&self) -> &str {
        "greeter"
    }

    fn commands(&self) -> Vec<Arc<Command>> {
        vec![
            Command::slash("greet", "Sends a friendly greeting")
                .option(
                    CommandOption::string("name", "Who to greet")
                        .max_length(32)
                        .autocomplete(Arc::new(NameSuggestions)),
                )
                .cooldown_secs(5)
                .handler(GreetHandler)
                .build(),
        ]
    }

    fn events(&self) -> Vec<Arc<dyn Event>> {
        vec![Arc::new(GreetAgainListener)]
    }

    fn middleware(&self) -> Vec<Arc<dyn Middleware>> {
        vec![Arc::new(ErrorBoundary::new(Arc::clone(&self.config)))]
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenv().ok();

    let config = Arc::new(match commandeer::load_config("config.toml") {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "no usable config.toml; running with defaults");
            BotConfig::default()
        }
    });

    let mut dispatcher = Dispatcher::new(Arc::clone(&config), Arc::new(ConsoleTransport));
    dispatcher
        .add_module(Arc::new(GreeterModule {
            config: Arc::clone(&config),
        }))
        .await?;
    info!(
        descriptors = %serde_json::Value::Array(dispatcher.command_descriptors()),
        "commands ready for registration"
    );

    let dispatcher = Arc::new(dispatcher);
    let gateway = LoopbackGateway {
        dispatcher: Arc::clone(&dispatcher),
    };
    gateway.connect().await?;

    let user = json!({ "id": "100", "username": "demo" });

    // Liveness check.
    gateway
        .send(0, json!({ "id": "1", "token": "t-ping", "type": 1 }))
        .await?;

    // A slash invocation with an option.
    gateway
        .send(
            0,
            json!({
                "id": "2", "token": "t-greet", "type": 2,
                "user": user,
                "data": {
                    "name": "greet", "type": 1,
                    "options": [{ "name": "name", "type": 3, "value": "world" }]
                }
            }),
        )
        .await?;

    // The same user again, inside the cooldown window: ephemeral notice.
    gateway
        .send(
            0,
            json!({
                "id": "3", "token": "t-greet-2", "type": 2,
                "user": user,
                "data": { "name": "greet", "type": 1, "options": [] }
            }),
        )
        .await?;

    // Autocomplete while typing the option.
    gateway
        .send(
            0,
            json!({
                "id": "4", "token": "t-ac", "type": 4,
                "user": user,
                "data": {
                    "name": "greet", "type": 1,
                    "options": [{ "name": "name", "type": 3, "value": "w", "focused": true }]
                }
            }),
        )
        .await?;

    // A button click handled by the component listener.
    gateway
        .send(
            0,
            json!({
                "id": "5", "token": "t-button", "type": 3,
                "user": user,
                "message": { "id": "800", "content": "Hello, world!" },
                "data": { "custom_id": "greet:again", "component_type": 2 }
            }),
        )
        .await?;

    Ok(())
}
