//! Outbound response types and the narrow external-collaborator traits.
//!
//! The engine never talks to the platform directly; it issues calls through
//! [`ResponseTransport`], which a host application implements on top of its
//! REST client. The one-shot discipline (at most one initial response per
//! interaction) is enforced by [`crate::interaction::ResponseHandle`], not by
//! the transport.

use crate::errors::Result;
use crate::interaction::payload::Snowflake;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

/// Message flag marking a response as visible only to the invoking user.
pub const EPHEMERAL: u64 = 1 << 6;

/// One autocomplete choice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub name: String,
    pub value: serde_json::Value,
}

impl Choice {
    #[must_use]
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: serde_json::Value::String(value.into()),
        }
    }

    #[must_use]
    pub fn integer(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value: serde_json::Value::from(value),
        }
    }
}

/// Body of a message-bearing response, edit, or follow-up.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
    /// Modal-only: identifies the form on submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    /// Modal-only: the form title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ResponseData {
    /// A plain text message.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// A text message visible only to the invoking user.
    #[must_use]
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            flags: Some(EPHEMERAL),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_ephemeral(&self) -> bool {
        self.flags.is_some_and(|flags| flags & EPHEMERAL != 0)
    }
}

/// The initial, one-shot interaction response. Exactly one of these may be
/// issued per interaction; edits and follow-ups are separate calls.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionResponse {
    Pong,
    ChannelMessageWithSource(ResponseData),
    DeferredChannelMessageWithSource(ResponseData),
    DeferredUpdateMessage,
    UpdateMessage(ResponseData),
    AutocompleteResult(Vec<Choice>),
    Modal(ResponseData),
}

impl InteractionResponse {
    /// Wire type code for the `create response` call.
    #[must_use]
    pub const fn kind(&self) -> u8 {
        match self {
            Self::Pong => 1,
            Self::ChannelMessageWithSource(_) => 4,
            Self::DeferredChannelMessageWithSource(_) => 5,
            Self::DeferredUpdateMessage => 6,
            Self::UpdateMessage(_) => 7,
            Self::AutocompleteResult(_) => 8,
            Self::Modal(_) => 9,
        }
    }

    /// Serializes to the `{ type, data? }` body the platform expects.
    #[must_use]
    pub fn to_wire(&self) -> serde_json::Value {
        match self {
            Self::Pong | Self::DeferredUpdateMessage => json!({ "type": self.kind() }),
            Self::ChannelMessageWithSource(data)
            | Self::DeferredChannelMessageWithSource(data)
            | Self::UpdateMessage(data)
            | Self::Modal(data) => json!({ "type": self.kind(), "data": data }),
            Self::AutocompleteResult(choices) => {
                json!({ "type": self.kind(), "data": { "choices": choices } })
            }
        }
    }
}

/// Outbound boundary: issues platform calls addressed by interaction id and
/// token. `create_response` is valid exactly once per interaction (enforced
/// upstream); the edit/follow-up pair is valid any number of times after the
/// first acknowledgment.
#[async_trait]
pub trait ResponseTransport: Send + Sync {
    async fn create_response(
        &self,
        id: &Snowflake,
        token: &str,
        response: &InteractionResponse,
    ) -> Result<()>;

    async fn edit_original(&self, token: &str, data: &ResponseData) -> Result<()>;

    async fn create_followup(&self, token: &str, data: &ResponseData) -> Result<()>;
}

/// Inbound boundary: the persistent event-stream collaborator that delivers
/// raw interactions and lifecycle events. Implemented outside the engine; the
/// demo binary ships a loopback implementation.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn connect(&self) -> Result<()>;

    async fn send(&self, shard_id: u64, payload: serde_json::Value) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_kind_codes_match_the_wire_contract() {
        assert_eq!(InteractionResponse::Pong.kind(), 1);
        assert_eq!(
            InteractionResponse::ChannelMessageWithSource(ResponseData::default()).kind(),
            4
        );
        assert_eq!(
            InteractionResponse::DeferredChannelMessageWithSource(ResponseData::default()).kind(),
            5
        );
        assert_eq!(InteractionResponse::DeferredUpdateMessage.kind(), 6);
        assert_eq!(
            InteractionResponse::UpdateMessage(ResponseData::default()).kind(),
            7
        );
        assert_eq!(InteractionResponse::AutocompleteResult(Vec::new()).kind(), 8);
        assert_eq!(InteractionResponse::Modal(ResponseData::default()).kind(), 9);
    }

    #[test]
    fn wire_body_nests_data_only_when_present() {
        let pong = InteractionResponse::Pong.to_wire();
        assert_eq!(pong["type"], 1);
        assert!(pong.get("data").is_none());

        let reply =
            InteractionResponse::ChannelMessageWithSource(ResponseData::ephemeral("shh")).to_wire();
        assert_eq!(reply["type"], 4);
        assert_eq!(reply["data"]["content"], "shh");
        assert_eq!(reply["data"]["flags"], EPHEMERAL);

        let choices =
            InteractionResponse::AutocompleteResult(vec![Choice::string("Rent", "rent")]).to_wire();
        assert_eq!(choices["data"]["choices"][0]["name"], "Rent");
    }

    #[test]
    fn ephemeral_flag_is_detected() {
        assert!(ResponseData::ephemeral("x").is_ephemeral());
        assert!(!ResponseData::text("x").is_ephemeral());
    }
}
