//! `Commandeer` - An interaction dispatch and command routing engine for
//! chat-platform bots
//!
//! This crate turns raw inbound interaction payloads into typed values,
//! routes command invocations through nested command trees with validated
//! options, and fans component/modal/lifecycle events out to subscribed
//! listeners. Features plug in as modules carrying their own commands,
//! events, and middleware, installed in dependency order.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    // Documentation - missing docs should be added gradually
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,
    clippy::nursery,

    // Performance
    clippy::inefficient_to_string,
    clippy::large_types_passed_by_value,
    clippy::needless_pass_by_value,
    clippy::unnecessary_wraps,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Complexity and readability
    clippy::cognitive_complexity,
    clippy::large_enum_variant,
    clippy::match_same_arms,
    clippy::too_many_lines,

    // Style consistency
    clippy::enum_glob_use,
    clippy::inconsistent_struct_constructor,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::redundant_closure_for_method_calls,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Declarative command trees, option materialization, and the registry
pub mod command;
/// Configuration management for identity, owners, and message templates
pub mod config;
/// Per-user command cooldown store with lazy expiry
pub mod cooldown;
/// The inbound front door routing payloads to handlers and listeners
pub mod dispatcher;
/// Unified error types and result handling
pub mod errors;
/// Event subscriptions and the name-keyed fan-out bus
pub mod event;
/// Typed interaction variants and the one-shot acknowledgment state machine
pub mod interaction;
/// Ordered middleware chains wrapping command and event execution
pub mod middleware;
/// Pluggable feature modules with dependency-ordered installation
pub mod module;

#[cfg(test)]
pub mod test_utils;

pub use command::{
    AutocompleteProvider, Command, CommandContext, CommandHandler, CommandKind, CommandOption,
};
pub use config::{BotConfig, MessageStyle, load_config};
pub use dispatcher::Dispatcher;
pub use errors::{Error, Result};
pub use event::{Event, EventContext, EventPayload};
pub use interaction::payload::Snowflake;
pub use interaction::response::{Choice, Gateway, ResponseData, ResponseTransport};
pub use interaction::{Interaction, Replyable, Updatable};
pub use middleware::{ErrorBoundary, Middleware, Next};
pub use module::Module;
