//! Nested command-tree walking and option materialization.
//!
//! Resolution starts at the top-level command matched by name and descends
//! while the first remaining option is subcommand-shaped, replacing the
//! remaining option list with that option's nested options at each step. The
//! final node must be a leaf. Option materialization then validates each
//! declared option against its constraints and swaps bare identifiers for the
//! full objects in the interaction's resolved tables.

use crate::command::{Command, CommandOption, OptionKind};
use crate::errors::{Error, Result};
use crate::interaction::payload::{Attachment, Channel, RawOptionValue, Role, Snowflake, User};
use crate::interaction::resolved::{Member, Mentionable, ResolvedData};
use crate::interaction::response::Choice;
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of walking the tree: the executable leaf, its human-readable
/// qualified name, and the option list that actually belongs to it.
#[derive(Debug)]
pub struct ResolvedLeaf<'a> {
    pub command: Arc<Command>,
    /// Space-joined path from the root, e.g. `cases notes add`.
    pub qualified_name: String,
    pub options: &'a [RawOptionValue],
}

/// Walks a nested option chain down to the executable leaf.
///
/// Landing on a node that still has children is a malformed invocation and
/// surfaces as [`Error::NonLeafCommand`] rather than executing silently.
pub fn resolve_leaf<'a>(
    root: &Arc<Command>,
    options: &'a [RawOptionValue],
) -> Result<ResolvedLeaf<'a>> {
    let mut current = Arc::clone(root);
    let mut remaining = options;
    let mut qualified = root.name().to_string();

    loop {
        let Some(first) = remaining.first() else { break };
        if !first.is_nested() {
            break;
        }
        let child = match current.child(&first.name) {
            Some(child) => Arc::clone(child),
            None => {
                return Err(Error::UnknownSubcommand {
                    command: qualified,
                    name: first.name.clone(),
                });
            }
        };
        current = child;
        qualified.push(' ');
        qualified.push_str(&first.name);
        remaining = &first.options;
    }

    if !current.is_leaf() {
        return Err(Error::NonLeafCommand(qualified));
    }

    Ok(ResolvedLeaf {
        command: current,
        qualified_name: qualified,
        options: remaining,
    })
}

/// Finds the option the user is currently typing, for autocomplete routing.
#[must_use]
pub fn find_focused(options: &[RawOptionValue]) -> Option<&RawOptionValue> {
    options.iter().find(|option| option.focused)
}

/// A validated, fully-resolved option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User { user: User, member: Option<Member> },
    Channel(Channel),
    Role(Role),
    Mentionable(Mentionable),
    Attachment(Attachment),
}

/// Materialized arguments of one invocation, keyed by option name.
#[derive(Debug, Default)]
pub struct CommandArgs {
    values: HashMap<String, OptionValue>,
}

impl CommandArgs {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(OptionValue::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn require_string(&self, name: &str) -> Result<&str> {
        self.string(name)
            .ok_or_else(|| Error::validation(format!("option '{name}' is required")))
    }

    #[must_use]
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(OptionValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn require_integer(&self, name: &str) -> Result<i64> {
        self.integer(name)
            .ok_or_else(|| Error::validation(format!("option '{name}' is required")))
    }

    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(OptionValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(OptionValue::Boolean(value)) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn user(&self, name: &str) -> Option<&User> {
        match self.values.get(name) {
            Some(OptionValue::User { user, .. }) => Some(user),
            _ => None,
        }
    }

    pub fn require_user(&self, name: &str) -> Result<&User> {
        self.user(name)
            .ok_or_else(|| Error::validation(format!("option '{name}' is required")))
    }

    /// The member half of a user option, when the invocation happened in a
    /// guild.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Member> {
        match self.values.get(name) {
            Some(OptionValue::User { member, .. }) => member.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        match self.values.get(name) {
            Some(OptionValue::Channel(value)) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn role(&self, name: &str) -> Option<&Role> {
        match self.values.get(name) {
            Some(OptionValue::Role(value)) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn mentionable(&self, name: &str) -> Option<&Mentionable> {
        match self.values.get(name) {
            Some(OptionValue::Mentionable(value)) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn attachment(&self, name: &str) -> Option<&Attachment> {
        match self.values.get(name) {
            Some(OptionValue::Attachment(value)) => Some(value),
            _ => None,
        }
    }
}

/// Validates and resolves every declared option of a leaf against the
/// invocation payload.
///
/// Constraint violations (range, length, fixed choice set) are user-facing
/// [`Error::Validation`]; a required option missing from the payload or an id
/// absent from the resolved tables is a platform contract violation,
/// [`Error::Resolution`].
pub fn materialize_args(
    leaf: &Command,
    options: &[RawOptionValue],
    resolved: &ResolvedData,
) -> Result<CommandArgs> {
    let mut values = HashMap::new();
    for declared in leaf.options() {
        let Some(raw) = options.iter().find(|option| option.name == declared.name) else {
            if declared.required {
                return Err(Error::resolution(format!(
                    "required option '{}' missing from payload",
                    declared.name
                )));
            }
            continue;
        };
        values.insert(declared.name.clone(), materialize_option(declared, raw, resolved)?);
    }
    Ok(CommandArgs { values })
}

fn materialize_option(
    declared: &CommandOption,
    raw: &RawOptionValue,
    resolved: &ResolvedData,
) -> Result<OptionValue> {
    let name = &declared.name;
    match &declared.kind {
        OptionKind::String {
            min_length,
            max_length,
            choices,
            ..
        } => {
            let value = raw
                .value
                .as_ref()
                .and_then(serde_json::Value::as_str)
                .ok_or_else(|| missing_value(name, "string"))?;
            let length = value.chars().count();
            if let Some(min) = min_length {
                if length < *min as usize {
                    return Err(Error::validation(format!(
                        "'{name}' must be at least {min} characters long"
                    )));
                }
            }
            if let Some(max) = max_length {
                if length > *max as usize {
                    return Err(Error::validation(format!(
                        "'{name}' must be at most {max} characters long"
                    )));
                }
            }
            check_choice_membership(name, choices, raw.value.as_ref())?;
            Ok(OptionValue::String(value.to_string()))
        }
        OptionKind::Integer { min, max, choices, .. } => {
            let value = raw
                .value
                .as_ref()
                .and_then(serde_json::Value::as_i64)
                .ok_or_else(|| missing_value(name, "integer"))?;
            if let Some(min) = min {
                if value < *min {
                    return Err(Error::validation(format!("'{name}' must be at least {min}")));
                }
            }
            if let Some(max) = max {
                if value > *max {
                    return Err(Error::validation(format!("'{name}' must be at most {max}")));
                }
            }
            check_choice_membership(name, choices, raw.value.as_ref())?;
            Ok(OptionValue::Integer(value))
        }
        OptionKind::Number { min, max } => {
            let value = raw
                .value
                .as_ref()
                .and_then(serde_json::Value::as_f64)
                .ok_or_else(|| missing_value(name, "number"))?;
            if let Some(min) = min {
                if value < *min {
                    return Err(Error::validation(format!("'{name}' must be at least {min}")));
                }
            }
            if let Some(max) = max {
                if value > *max {
                    return Err(Error::validation(format!("'{name}' must be at most {max}")));
                }
            }
            Ok(OptionValue::Number(value))
        }
        OptionKind::Boolean => {
            let value = raw
                .value
                .as_ref()
                .and_then(serde_json::Value::as_bool)
                .ok_or_else(|| missing_value(name, "boolean"))?;
            Ok(OptionValue::Boolean(value))
        }
        OptionKind::User => {
            let id = option_id(name, raw)?;
            let user = resolved
                .user(&id)
                .cloned()
                .ok_or_else(|| unresolved(name, "user", &id))?;
            Ok(OptionValue::User {
                user,
                member: resolved.member(&id).cloned(),
            })
        }
        OptionKind::Channel => {
            let id = option_id(name, raw)?;
            let channel = resolved
                .channel(&id)
                .cloned()
                .ok_or_else(|| unresolved(name, "channel", &id))?;
            Ok(OptionValue::Channel(channel))
        }
        OptionKind::Role => {
            let id = option_id(name, raw)?;
            let role = resolved
                .role(&id)
                .cloned()
                .ok_or_else(|| unresolved(name, "role", &id))?;
            Ok(OptionValue::Role(role))
        }
        OptionKind::Mentionable => {
            let id = option_id(name, raw)?;
            let mentionable = resolved
                .mentionable(&id)
                .ok_or_else(|| unresolved(name, "mentionable", &id))?;
            Ok(OptionValue::Mentionable(mentionable))
        }
        OptionKind::Attachment => {
            let id = option_id(name, raw)?;
            let attachment = resolved
                .attachment(&id)
                .cloned()
                .ok_or_else(|| unresolved(name, "attachment", &id))?;
            Ok(OptionValue::Attachment(attachment))
        }
    }
}

fn option_id(name: &str, raw: &RawOptionValue) -> Result<Snowflake> {
    raw.value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .map(Snowflake::from)
        .ok_or_else(|| missing_value(name, "id"))
}

fn missing_value(name: &str, expected: &str) -> Error {
    Error::resolution(format!("option '{name}' carried no usable {expected} value"))
}

fn unresolved(name: &str, table: &str, id: &Snowflake) -> Error {
    Error::resolution(format!(
        "option '{name}' references {table} '{id}' absent from resolved data"
    ))
}

fn check_choice_membership(
    name: &str,
    choices: &[Choice],
    value: Option<&serde_json::Value>,
) -> Result<()> {
    if choices.is_empty() {
        return Ok(());
    }
    let matched = value.is_some_and(|value| choices.iter().any(|choice| &choice.value == value));
    if matched {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "'{name}' is not one of the allowed choices"
        )))
    }
}
