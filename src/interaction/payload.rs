//! Raw wire-shaped interaction payloads.
//!
//! Everything in this module deserializes straight off the inbound boundary
//! (webhook body or gateway dispatch frame) and is deliberately loose: fields
//! the platform may omit are `Option` or defaulted. The typed layer in
//! [`crate::interaction`] is built from these by the factory and is the only
//! thing the rest of the engine touches.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque platform identifier. Kept as a string: the engine never does
/// arithmetic on ids, only equality and map lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snowflake(pub String);

impl Snowflake {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Snowflake {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Snowflake {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Inbound interaction type discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
    MessageComponent,
    ApplicationCommandAutocomplete,
    ModalSubmit,
}

impl InteractionType {
    /// Maps the wire code to the discriminant; `None` for codes this engine
    /// does not know about.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Ping),
            2 => Some(Self::ApplicationCommand),
            3 => Some(Self::MessageComponent),
            4 => Some(Self::ApplicationCommandAutocomplete),
            5 => Some(Self::ModalSubmit),
            _ => None,
        }
    }

    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Ping => 1,
            Self::ApplicationCommand => 2,
            Self::MessageComponent => 3,
            Self::ApplicationCommandAutocomplete => 4,
            Self::ModalSubmit => 5,
        }
    }
}

/// Wire codes for nested command options (subcommand / subcommand group).
pub const OPTION_SUBCOMMAND: u8 = 1;
/// See [`OPTION_SUBCOMMAND`].
pub const OPTION_SUBCOMMAND_GROUP: u8 = 2;

/// A platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// Display name preferred by the platform: global name, then username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

/// A guild member as it appears on the wire. The paired `user` object is
/// frequently absent (resolved-data member tables omit it); the factory is
/// responsible for locating the matching user and producing a full
/// [`crate::interaction::Member`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMember {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    #[serde(default)]
    pub joined_at: Option<String>,
    /// Permission bits, transmitted as a decimal string.
    #[serde(default)]
    pub permissions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub permissions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Snowflake,
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    #[serde(default)]
    pub channel_id: Option<Snowflake>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Option<User>,
}

/// Per-interaction resolved lookup tables, exactly as transmitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResolvedData {
    #[serde(default)]
    pub users: HashMap<Snowflake, User>,
    #[serde(default)]
    pub members: HashMap<Snowflake, RawMember>,
    #[serde(default)]
    pub roles: HashMap<Snowflake, Role>,
    #[serde(default)]
    pub channels: HashMap<Snowflake, Channel>,
    #[serde(default)]
    pub attachments: HashMap<Snowflake, Attachment>,
    #[serde(default)]
    pub messages: HashMap<Snowflake, Message>,
}

/// One option value supplied by the invocation. Subcommand-shaped options
/// (`kind` 1 or 2) carry no `value` and nest further options instead.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOptionValue {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub options: Vec<RawOptionValue>,
    #[serde(default)]
    pub focused: bool,
}

impl RawOptionValue {
    /// Whether this option descends into a child command rather than carrying
    /// a value.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.kind == OPTION_SUBCOMMAND || self.kind == OPTION_SUBCOMMAND_GROUP
    }
}

/// One row of a submitted modal, holding the individual field values.
#[derive(Debug, Clone, Deserialize)]
pub struct RawComponentRow {
    #[serde(default)]
    pub components: Vec<RawComponentValue>,
}

/// A single submitted modal field.
#[derive(Debug, Clone, Deserialize)]
pub struct RawComponentValue {
    pub custom_id: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// Type-specific payload data; which fields are populated depends on the
/// interaction type code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInteractionData {
    #[serde(default)]
    pub id: Option<Snowflake>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<u8>,
    #[serde(default)]
    pub options: Vec<RawOptionValue>,
    #[serde(default)]
    pub resolved: Option<RawResolvedData>,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub component_type: Option<u8>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub components: Vec<RawComponentRow>,
    /// Target of a user/message context-menu command.
    #[serde(default)]
    pub target_id: Option<Snowflake>,
}

/// The loosely-typed inbound payload, straight off the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct RawInteraction {
    pub id: Snowflake,
    pub token: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub application_id: Option<Snowflake>,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub channel_id: Option<Snowflake>,
    #[serde(default)]
    pub member: Option<RawMember>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub data: Option<RawInteractionData>,
    #[serde(default)]
    pub message: Option<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interaction_type_codes_round_trip() {
        for code in 1..=5u8 {
            let ty = InteractionType::from_code(code).expect("known code");
            assert_eq!(ty.code(), code);
        }
        assert!(InteractionType::from_code(0).is_none());
        assert!(InteractionType::from_code(99).is_none());
    }

    #[test]
    fn deserializes_command_payload() {
        let raw: RawInteraction = serde_json::from_value(json!({
            "id": "846",
            "token": "tok",
            "type": 2,
            "guild_id": "500",
            "member": {
                "user": { "id": "7", "username": "maya" },
                "nick": "M",
                "roles": ["1", "2"],
                "permissions": "8"
            },
            "data": {
                "id": "90",
                "name": "cases",
                "type": 1,
                "options": [
                    { "name": "notes", "type": 2, "options": [
                        { "name": "add", "type": 1, "options": [
                            { "name": "text", "type": 3, "value": "hi", "focused": true }
                        ]}
                    ]}
                ]
            }
        }))
        .expect("payload should deserialize");

        assert_eq!(raw.kind, 2);
        assert_eq!(raw.guild_id, Some(Snowflake::from("500")));
        let data = raw.data.expect("data present");
        assert_eq!(data.name.as_deref(), Some("cases"));
        assert!(data.options[0].is_nested());
        let leaf_opts = &data.options[0].options[0].options;
        assert_eq!(leaf_opts[0].name, "text");
        assert!(leaf_opts[0].focused);
    }

    #[test]
    fn deserializes_modal_payload_fields() {
        let raw: RawInteraction = serde_json::from_value(json!({
            "id": "1",
            "token": "tok",
            "type": 5,
            "user": { "id": "7", "username": "maya" },
            "data": {
                "custom_id": "report-form",
                "components": [
                    { "components": [ { "custom_id": "reason", "value": "spam" } ] }
                ]
            }
        }))
        .expect("payload should deserialize");

        let data = raw.data.expect("data present");
        assert_eq!(data.custom_id.as_deref(), Some("report-form"));
        assert_eq!(
            data.components[0].components[0].value.as_deref(),
            Some("spam")
        );
    }

    #[test]
    fn user_display_name_prefers_global_name() {
        let user = User {
            id: Snowflake::from("7"),
            username: "maya".into(),
            global_name: Some("Maya".into()),
            bot: false,
        };
        assert_eq!(user.display_name(), "Maya");
    }
}
