//! Lazily-expiring cooldown store gating repeated command invocation.
//!
//! Keys map to absolute expiry timestamps. A key whose expiry has passed is
//! logically absent even before physical removal; `get` deletes it as a side
//! effect, so no background sweeper is needed. The dispatcher arms the
//! cooldown *before* awaiting the leaf handler, closing the race where two
//! rapid invocations would both pass the check.

use crate::interaction::payload::Snowflake;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::trace;

/// Builds the scope key gating one leaf for one invoker: command identity,
/// invoking user, and the guild when the command is guild-scoped.
#[must_use]
pub fn scope_key(command: &str, user: &Snowflake, guild: Option<&Snowflake>) -> String {
    match guild {
        Some(guild) => format!("{command}:{user}:{guild}"),
        None => format!("{command}:{user}"),
    }
}

/// Key -> absolute expiry store with lazy expiration.
#[derive(Debug, Default)]
pub struct CooldownManager {
    expiries: HashMap<String, DateTime<Utc>>,
}

impl CooldownManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an expiry of now + `duration_secs` for the key.
    pub fn set(&mut self, key: impl Into<String>, duration_secs: u64) {
        let duration = Duration::seconds(i64::try_from(duration_secs).unwrap_or(i64::MAX));
        self.set_expiry(key, Utc::now() + duration);
    }

    /// Records an absolute expiry for the key. Useful for restoring persisted
    /// cooldowns.
    pub fn set_expiry(&mut self, key: impl Into<String>, expires_at: DateTime<Utc>) {
        let key = key.into();
        trace!(%key, %expires_at, "cooldown armed");
        self.expiries.insert(key, expires_at);
    }

    /// Returns the expiry if it is still in the future. An already-passed
    /// expiry is removed as a side effect and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<DateTime<Utc>> {
        let expires_at = *self.expiries.get(key)?;
        if expires_at > Utc::now() {
            Some(expires_at)
        } else {
            self.expiries.remove(key);
            None
        }
    }

    /// Whether the key is currently gated.
    pub fn has(&mut self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Deletes the key unconditionally, returning the stored expiry if any.
    pub fn remove(&mut self, key: &str) -> Option<DateTime<Utc>> {
        self.expiries.remove(key)
    }

    /// Number of physically stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expiries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }
}
