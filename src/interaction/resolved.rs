//! Per-interaction resolved lookup tables.
//!
//! The platform ships id-keyed tables of full objects alongside each
//! interaction so option values never need a round trip. The one contract
//! subtlety lives here: wire member entries omit their user object, and a
//! member is meaningless without one, so construction merges each member with
//! its paired user entry and fails with [`Error::Resolution`] when the pair
//! is missing.

use crate::errors::{Error, Result};
use crate::interaction::payload::{
    Attachment, Channel, Message, RawMember, RawResolvedData, Role, Snowflake, User,
};
use std::collections::HashMap;

/// A guild member with its user merged on. Unlike [`RawMember`], the user is
/// always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub user: User,
    pub nick: Option<String>,
    pub roles: Vec<Snowflake>,
    pub joined_at: Option<String>,
    /// Permission bits the invoker holds in the channel, already parsed.
    pub permissions: u64,
}

impl Member {
    /// Merges a wire member with the user it belongs to.
    pub(crate) fn from_raw(raw: RawMember, user: User) -> Result<Self> {
        let permissions = parse_permissions(raw.permissions.as_deref())?;
        Ok(Self {
            user,
            nick: raw.nick,
            roles: raw.roles,
            joined_at: raw.joined_at,
            permissions,
        })
    }

    /// Display name: nickname, then the user's own display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or_else(|| self.user.display_name())
    }
}

fn parse_permissions(raw: Option<&str>) -> Result<u64> {
    match raw {
        None => Ok(0),
        Some(bits) => bits
            .parse()
            .map_err(|_| Error::resolution(format!("unparseable permission bits '{bits}'"))),
    }
}

/// Either side of a mentionable option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mentionable {
    User(User),
    Role(Role),
}

/// Normalized resolved tables for one interaction. Read-only after
/// construction.
#[derive(Debug, Clone, Default)]
pub struct ResolvedData {
    users: HashMap<Snowflake, User>,
    members: HashMap<Snowflake, Member>,
    roles: HashMap<Snowflake, Role>,
    channels: HashMap<Snowflake, Channel>,
    attachments: HashMap<Snowflake, Attachment>,
    messages: HashMap<Snowflake, Message>,
}

impl ResolvedData {
    /// Builds the normalized tables from the wire representation.
    ///
    /// Every member entry must be paired with a user: either inline on the
    /// member itself or under the same id in the `users` table. A member
    /// without one is a contract violation of the inbound payload, not an
    /// empty-result case, and aborts construction.
    pub fn from_raw(raw: RawResolvedData) -> Result<Self> {
        let mut members = HashMap::with_capacity(raw.members.len());
        for (id, raw_member) in raw.members {
            let user = match raw_member.user.clone() {
                Some(user) => user,
                None => raw.users.get(&id).cloned().ok_or_else(|| {
                    Error::resolution(format!("resolved member '{id}' has no matching user entry"))
                })?,
            };
            members.insert(id, Member::from_raw(raw_member, user)?);
        }

        Ok(Self {
            users: raw.users,
            members,
            roles: raw.roles,
            channels: raw.channels,
            attachments: raw.attachments,
            messages: raw.messages,
        })
    }

    #[must_use]
    pub fn user(&self, id: &Snowflake) -> Option<&User> {
        self.users.get(id)
    }

    #[must_use]
    pub fn member(&self, id: &Snowflake) -> Option<&Member> {
        self.members.get(id)
    }

    #[must_use]
    pub fn role(&self, id: &Snowflake) -> Option<&Role> {
        self.roles.get(id)
    }

    #[must_use]
    pub fn channel(&self, id: &Snowflake) -> Option<&Channel> {
        self.channels.get(id)
    }

    #[must_use]
    pub fn attachment(&self, id: &Snowflake) -> Option<&Attachment> {
        self.attachments.get(id)
    }

    #[must_use]
    pub fn message(&self, id: &Snowflake) -> Option<&Message> {
        self.messages.get(id)
    }

    /// Looks up a mentionable id, preferring the user table over roles.
    #[must_use]
    pub fn mentionable(&self, id: &Snowflake) -> Option<Mentionable> {
        if let Some(user) = self.users.get(id) {
            return Some(Mentionable::User(user.clone()));
        }
        self.roles.get(id).map(|role| Mentionable::Role(role.clone()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.members.is_empty()
            && self.roles.is_empty()
            && self.channels.is_empty()
            && self.attachments.is_empty()
            && self.messages.is_empty()
    }
}
