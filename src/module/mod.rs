//! Pluggable feature modules and their lifecycle.
//!
//! A module is the unit of installation: it declares the commands it owns,
//! the events it listens to, and the middleware chain that wraps everything
//! it handles. Modules may depend on other modules; the registry guarantees
//! a dependency is fully installed before its dependents initialize.

pub mod registry;

use crate::command::Command;
use crate::config::BotConfig;
use crate::errors::Result;
use crate::event::Event;
use crate::middleware::Middleware;
use async_trait::async_trait;
use std::sync::Arc;

/// One installable feature unit.
///
/// Every hook except [`id`](Module::id) has a do-nothing default, so a
/// module only spells out the surfaces it actually provides.
#[async_trait]
pub trait Module: Send + Sync {
    /// Unique identifier; duplicate registration of the same id fails.
    fn id(&self) -> &str;

    /// Modules that must be installed before this one initializes.
    fn dependencies(&self) -> Vec<Arc<dyn Module>> {
        Vec::new()
    }

    /// One-time setup, run after every dependency has finished its own
    /// installation and before this module's commands become routable.
    async fn initialize(&self, _config: &BotConfig) -> Result<()> {
        Ok(())
    }

    /// Top-level commands this module owns.
    fn commands(&self) -> Vec<Arc<Command>> {
        Vec::new()
    }

    /// Event listeners this module subscribes.
    fn events(&self) -> Vec<Arc<dyn Event>> {
        Vec::new()
    }

    /// Middleware chain wrapping every command and event this module handles,
    /// outermost link first.
    fn middleware(&self) -> Vec<Arc<dyn Middleware>> {
        Vec::new()
    }
}
