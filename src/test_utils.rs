//! Shared test utilities for the dispatch engine.
//!
//! Provides a recording fake of the outbound [`ResponseTransport`] boundary
//! plus builders for the raw payload shapes the tests feed through the
//! factory and dispatcher.

use crate::errors::Result;
use crate::interaction::payload::Snowflake;
use crate::interaction::response::{InteractionResponse, ResponseData, ResponseTransport};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, PoisonError};
use tracing_subscriber::EnvFilter;

/// Initializes tracing for a test; safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// One call observed by the [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Create {
        id: Snowflake,
        token: String,
        body: Value,
    },
    Edit {
        token: String,
        data: ResponseData,
    },
    Followup {
        token: String,
        data: ResponseData,
    },
}

/// Fake transport that records every outbound call instead of performing it.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, call: RecordedCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// Snapshot of every observed call, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of initial (`create response`) calls observed.
    pub fn create_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RecordedCall::Create { .. }))
            .count()
    }

    pub fn edit_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RecordedCall::Edit { .. }))
            .count()
    }

    pub fn followup_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RecordedCall::Followup { .. }))
            .count()
    }

    /// Wire type code of the most recent initial response, if any.
    pub fn last_create_kind(&self) -> Option<u8> {
        self.calls().iter().rev().find_map(|call| match call {
            RecordedCall::Create { body, .. } => {
                body.get("type").and_then(Value::as_u64).map(|kind| kind as u8)
            }
            _ => None,
        })
    }

    /// Content of the most recent initial response body, if it carried one.
    pub fn last_create_content(&self) -> Option<String> {
        self.calls().iter().rev().find_map(|call| match call {
            RecordedCall::Create { body, .. } => body
                .pointer("/data/content")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
    }

    /// Whether the most recent initial response was flagged ephemeral.
    pub fn last_create_is_ephemeral(&self) -> bool {
        self.calls()
            .iter()
            .rev()
            .find_map(|call| match call {
                RecordedCall::Create { body, .. } => Some(
                    body.pointer("/data/flags")
                        .and_then(Value::as_u64)
                        .unwrap_or(0),
                ),
                _ => None,
            })
            .is_some_and(|flags| flags & crate::interaction::response::EPHEMERAL != 0)
    }
}

#[async_trait]
impl ResponseTransport for RecordingTransport {
    async fn create_response(
        &self,
        id: &Snowflake,
        token: &str,
        response: &InteractionResponse,
    ) -> Result<()> {
        self.push(RecordedCall::Create {
            id: id.clone(),
            token: token.to_string(),
            body: response.to_wire(),
        });
        Ok(())
    }

    async fn edit_original(&self, token: &str, data: &ResponseData) -> Result<()> {
        self.push(RecordedCall::Edit {
            token: token.to_string(),
            data: data.clone(),
        });
        Ok(())
    }

    async fn create_followup(&self, token: &str, data: &ResponseData) -> Result<()> {
        self.push(RecordedCall::Followup {
            token: token.to_string(),
            data: data.clone(),
        });
        Ok(())
    }
}

/// The standard invoking user for test payloads.
pub fn test_user() -> Value {
    json!({ "id": "100", "username": "tester" })
}

/// A ping payload with fixed identity.
pub fn ping_payload() -> Value {
    json!({ "id": "1", "token": "ping-token", "type": 1 })
}

/// A chat-input command payload invoked in a DM context.
pub fn slash_payload(name: &str, options: Value) -> Value {
    json!({
        "id": "10",
        "token": format!("token-{name}"),
        "type": 2,
        "channel_id": "555",
        "user": test_user(),
        "data": { "id": "90", "name": name, "type": 1, "options": options }
    })
}

/// A chat-input command payload carrying resolved lookup tables.
pub fn slash_payload_with_resolved(name: &str, options: Value, resolved: Value) -> Value {
    json!({
        "id": "10",
        "token": format!("token-{name}"),
        "type": 2,
        "channel_id": "555",
        "user": test_user(),
        "data": {
            "id": "90", "name": name, "type": 1,
            "options": options, "resolved": resolved
        }
    })
}

/// A chat-input command payload invoked inside a guild, with member
/// permission bits.
pub fn guild_slash_payload(name: &str, options: Value, guild_id: &str, permissions: &str) -> Value {
    json!({
        "id": "10",
        "token": format!("token-{name}"),
        "type": 2,
        "guild_id": guild_id,
        "channel_id": "555",
        "member": { "user": test_user(), "roles": [], "permissions": permissions },
        "data": { "id": "90", "name": name, "type": 1, "options": options }
    })
}

/// An autocomplete payload for a chat-input command.
pub fn autocomplete_payload(name: &str, options: Value) -> Value {
    json!({
        "id": "11",
        "token": format!("ac-token-{name}"),
        "type": 4,
        "user": test_user(),
        "data": { "id": "90", "name": name, "type": 1, "options": options }
    })
}

/// A message-component click payload.
pub fn component_payload(custom_id: &str) -> Value {
    json!({
        "id": "12",
        "token": format!("component-token-{custom_id}"),
        "type": 3,
        "user": test_user(),
        "message": { "id": "800", "content": "original" },
        "data": { "custom_id": custom_id, "component_type": 2 }
    })
}

/// A modal submission payload with the given field values.
pub fn modal_payload(custom_id: &str, fields: &[(&str, &str)]) -> Value {
    let rows: Vec<Value> = fields
        .iter()
        .map(|(field_id, value)| {
            json!({ "components": [ { "custom_id": field_id, "value": value } ] })
        })
        .collect();
    json!({
        "id": "13",
        "token": format!("modal-token-{custom_id}"),
        "type": 5,
        "user": test_user(),
        "data": { "custom_id": custom_id, "components": rows }
    })
}
