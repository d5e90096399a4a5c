//! Event subscriptions and the name-keyed fan-out bus.
//!
//! Events are the mechanism for everything that is not a declared command:
//! message-component clicks, modal submits, and platform lifecycle events
//! (message/member/reaction dispatches). Every subscribed event whose name
//! matches fans out independently; one listener's failure never stops the
//! rest.

use crate::config::BotConfig;
use crate::errors::Result;
use crate::interaction::Interaction;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Synthetic dispatch-event names the dispatcher fans interactions out under.
pub mod names {
    /// A message-component click.
    pub const MESSAGE_COMPONENT: &str = "interaction.component";
    /// A modal submission.
    pub const MODAL_SUBMIT: &str = "interaction.modal";
}

/// What an event listener receives: either a classified interaction or a raw
/// gateway lifecycle payload.
#[derive(Debug, Clone)]
pub enum EventPayload {
    Interaction(Arc<Interaction>),
    Gateway(serde_json::Value),
}

impl EventPayload {
    #[must_use]
    pub fn interaction(&self) -> Option<&Arc<Interaction>> {
        match self {
            Self::Interaction(interaction) => Some(interaction),
            Self::Gateway(_) => None,
        }
    }

    #[must_use]
    pub fn gateway(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Gateway(payload) => Some(payload),
            Self::Interaction(_) => None,
        }
    }
}

/// Context handed to an event listener.
pub struct EventContext {
    pub payload: EventPayload,
    pub config: Arc<BotConfig>,
}

impl EventContext {
    #[must_use]
    pub fn interaction(&self) -> Option<&Arc<Interaction>> {
        self.payload.interaction()
    }
}

/// A listener bound to a single named platform event.
#[async_trait]
pub trait Event: Send + Sync {
    /// The dispatch-event name this listener subscribes to.
    fn event_name(&self) -> &str;

    /// Per-payload predicate; listeners that return `false` are skipped for
    /// that occurrence (e.g. a component listener scoped to one custom id).
    fn matches(&self, _payload: &EventPayload) -> bool {
        true
    }

    async fn run(&self, ctx: &EventContext) -> Result<()>;
}

/// A subscription plus its owning module.
#[derive(Clone)]
pub struct RegisteredEvent {
    pub module_id: String,
    pub event: Arc<dyn Event>,
}

/// Name-keyed event subscriptions. Mutated only during startup and teardown.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<String, Vec<RegisteredEvent>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a listener under its declared event name.
    pub fn subscribe(&mut self, module_id: &str, event: Arc<dyn Event>) {
        let name = event.event_name().to_string();
        debug!(event = %name, module = module_id, "subscribed event listener");
        self.handlers.entry(name).or_default().push(RegisteredEvent {
            module_id: module_id.to_string(),
            event,
        });
    }

    /// Every listener for the given event name, in registration order.
    #[must_use]
    pub fn handlers_for(&self, name: &str) -> &[RegisteredEvent] {
        self.handlers.get(name).map_or(&[], Vec::as_slice)
    }

    /// Drops every subscription owned by the given module.
    pub fn unsubscribe_module(&mut self, module_id: &str) {
        for listeners in self.handlers.values_mut() {
            listeners.retain(|registered| registered.module_id != module_id);
        }
        self.handlers.retain(|_, listeners| !listeners.is_empty());
    }

    /// Total number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
