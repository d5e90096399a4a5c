//! Name-keyed storage for top-level commands.
//!
//! Only top-level commands live here, keyed by `(name, kind)` and tagged with
//! the module that declared them; nested resolution walks the matched
//! command's in-memory children on demand instead of flattening the tree.

use crate::command::{Command, CommandKind};
use crate::errors::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A stored top-level command plus its owning module.
#[derive(Debug, Clone)]
pub struct RegisteredCommand {
    pub command: Arc<Command>,
    pub module_id: String,
}

/// Registry of top-level commands. Mutated only during startup and teardown;
/// read-only during steady-state dispatch.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<(String, CommandKind), RegisteredCommand>,
}

impl CommandRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a top-level command for the given module. A name collision
    /// within the same command kind is a registration error.
    pub fn register(&mut self, module_id: &str, command: Arc<Command>) -> Result<()> {
        let key = (command.name().to_string(), command.kind());
        if self.commands.contains_key(&key) {
            return Err(Error::DuplicateCommand {
                name: key.0,
                kind: key.1,
            });
        }
        debug!(command = command.name(), module = module_id, "registered command");
        self.commands.insert(
            key,
            RegisteredCommand {
                command,
                module_id: module_id.to_string(),
            },
        );
        Ok(())
    }

    /// Looks up a top-level command by name and kind. Absence is a normal
    /// no-op case for the caller: the invocation may belong to a different
    /// process or to a stale platform-side registration.
    #[must_use]
    pub fn resolve(&self, name: &str, kind: CommandKind) -> Option<&RegisteredCommand> {
        self.commands.get(&(name.to_string(), kind))
    }

    /// Removes a top-level command, returning it if it was present.
    pub fn unregister(&mut self, name: &str, kind: CommandKind) -> Option<RegisteredCommand> {
        self.commands.remove(&(name.to_string(), kind))
    }

    /// Removes every command owned by the given module.
    pub fn unregister_module(&mut self, module_id: &str) {
        self.commands.retain(|_, registered| registered.module_id != module_id);
    }

    /// Descriptors of every stored command, for the external registrar.
    #[must_use]
    pub fn descriptors(&self) -> Vec<serde_json::Value> {
        self.commands
            .values()
            .map(|registered| registered.command.descriptor())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
