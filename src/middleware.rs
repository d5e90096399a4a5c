//! Ordered, module-scoped middleware chains.
//!
//! A chain is an explicit list of handler objects run by [`Next`], which
//! advances through the remaining links and ends in the endpoint (the wrapped
//! command or event execution). A link continues the chain by consuming
//! `next.run(...)`; a link that drops `next` instead terminates processing
//! for that interaction without error, and is itself responsible for any
//! user-visible response.

use crate::config::BotConfig;
use crate::errors::{Error, Result};
use crate::event::EventPayload;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{error, warn};

/// Boxed future, the shape every chain hop awaits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The wrapped execution at the end of a chain. Owns everything it needs, so
/// the future it produces is `'static`.
pub type Endpoint = Box<dyn FnOnce() -> BoxFuture<'static, Result<()>> + Send>;

/// Wraps an async closure into an [`Endpoint`].
pub fn endpoint<F, Fut>(f: F) -> Endpoint
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Box::new(move || Box::pin(f()))
}

/// One interception link around command/event execution.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, payload: &EventPayload, next: Next<'_>) -> Result<()>;
}

/// Continuation over the remaining links of a chain. Consumed by `run`;
/// dropping it halts the chain for this interaction.
pub struct Next<'a> {
    links: &'a [Arc<dyn Middleware>],
    endpoint: Endpoint,
}

impl<'a> Next<'a> {
    /// Builds the continuation for a full chain ending in `endpoint`.
    #[must_use]
    pub fn chain(links: &'a [Arc<dyn Middleware>], endpoint: Endpoint) -> Self {
        Self { links, endpoint }
    }

    /// Runs the next link, or the endpoint once the links are exhausted.
    /// Links execute strictly in registration order.
    pub async fn run(self, payload: &EventPayload) -> Result<()> {
        match self.links.split_first() {
            Some((link, rest)) => {
                let next = Next {
                    links: rest,
                    endpoint: self.endpoint,
                };
                link.handle(payload, next).await
            }
            None => (self.endpoint)().await,
        }
    }
}

/// Conventional outermost link: recovers domain validation failures as
/// ephemeral user feedback and swallows everything else after logging, so a
/// single failing interaction cannot terminate the process.
pub struct ErrorBoundary {
    config: Arc<BotConfig>,
}

impl ErrorBoundary {
    #[must_use]
    pub fn new(config: Arc<BotConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Middleware for ErrorBoundary {
    async fn handle(&self, payload: &EventPayload, next: Next<'_>) -> Result<()> {
        match next.run(payload).await {
            Ok(()) => Ok(()),
            Err(Error::Validation(message)) => {
                if let Some(interaction) = payload.interaction() {
                    let feedback =
                        format!("{} {message}", self.config.messages.error_prefix);
                    if let Err(err) = interaction.reply_ephemeral(&feedback).await {
                        warn!(error = %err, "failed to deliver validation feedback");
                    }
                }
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "handler failed; interaction abandoned");
                Ok(())
            }
        }
    }
}
