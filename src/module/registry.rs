//! Module installation with dependency-first ordering.
//!
//! `add` walks a module's dependency graph depth-first: each dependency is
//! fully installed (initialized, commands registered, events subscribed)
//! before its dependent initializes. A dependency that is already installed
//! is skipped; a dependency path that loops back onto a module still being
//! installed is a declaration error and aborts the whole add.

use crate::command::registry::CommandRegistry;
use crate::config::BotConfig;
use crate::errors::{Error, Result};
use crate::event::EventBus;
use crate::middleware::{BoxFuture, Middleware};
use crate::module::Module;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Per-module middleware chains, keyed by module id.
pub type ModuleChains = HashMap<String, Vec<Arc<dyn Middleware>>>;

/// Installed modules, in installation order.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, Arc<dyn Module>>,
    order: Vec<String>,
}

impl ModuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a module and, recursively, its not-yet-installed
    /// dependencies.
    ///
    /// # Errors
    ///
    /// `Error::DuplicateModule` if the module's id is already installed,
    /// `Error::ModuleCycle` if its dependency graph loops, or whatever its
    /// `initialize` / command registration returns.
    pub async fn add(
        &mut self,
        module: Arc<dyn Module>,
        config: &BotConfig,
        commands: &mut CommandRegistry,
        events: &mut EventBus,
        chains: &mut ModuleChains,
    ) -> Result<()> {
        if self.modules.contains_key(module.id()) {
            return Err(Error::DuplicateModule(module.id().to_string()));
        }
        let mut installing = Vec::new();
        self.install(module, &mut installing, config, commands, events, chains)
            .await
    }

    // Async recursion over the dependency graph needs a boxed future.
    fn install<'a>(
        &'a mut self,
        module: Arc<dyn Module>,
        installing: &'a mut Vec<String>,
        config: &'a BotConfig,
        commands: &'a mut CommandRegistry,
        events: &'a mut EventBus,
        chains: &'a mut ModuleChains,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let id = module.id().to_string();
            if self.modules.contains_key(&id) {
                // Already installed via another dependent.
                return Ok(());
            }
            if installing.contains(&id) {
                return Err(Error::ModuleCycle(id));
            }

            installing.push(id.clone());
            for dependency in module.dependencies() {
                self.install(dependency, installing, config, commands, events, chains)
                    .await?;
            }
            installing.pop();

            module.initialize(config).await?;
            for command in module.commands() {
                commands.register(&id, command)?;
            }
            for event in module.events() {
                events.subscribe(&id, event);
            }
            chains.insert(id.clone(), module.middleware());

            info!(module = %id, "module installed");
            self.order.push(id.clone());
            self.modules.insert(id, module);
            Ok(())
        })
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Module>> {
        self.modules.get(id)
    }

    /// Installed module ids, in installation order (dependencies first).
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    /// Uninstalls a module and everything it registered. Silently no-ops on
    /// an unknown id. Dependents are not tracked; removing a module another
    /// module still relies on is the caller's responsibility.
    pub fn delete(
        &mut self,
        id: &str,
        commands: &mut CommandRegistry,
        events: &mut EventBus,
        chains: &mut ModuleChains,
    ) {
        if self.modules.remove(id).is_none() {
            return;
        }
        self.order.retain(|installed| installed != id);
        commands.unregister_module(id);
        events.unsubscribe_module(id);
        chains.remove(id);
        info!(module = %id, "module uninstalled");
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
