//! JSON envelopes exchanged over the persistent connection, discriminated by `type`.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Credential, Language};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEnvelope {
    Auth { token: Credential, language: Language },
    Message { content: String },
    SetLanguage { language: Language },
    NewConversation,
}

impl OutboundEnvelope {
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundEnvelope::Auth { .. } => "auth",
            OutboundEnvelope::Message { .. } => "message",
            OutboundEnvelope::SetLanguage { .. } => "set_language",
            OutboundEnvelope::NewConversation => "new_conversation",
        }
    }
}

/// Profile returned by the backend on a successful handshake.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct AuthenticatedUser {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEnvelope {
    AuthSuccess {
        #[serde(default)]
        user: Option<AuthenticatedUser>,
    },
    AuthFailed {
        reason: String,
        #[serde(default)]
        message: Option<String>,
    },
    Message {
        content: String,
    },
    Typing {
        status: bool,
    },
}

impl InboundEnvelope {
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEnvelope::AuthSuccess { .. } => "auth_success",
            InboundEnvelope::AuthFailed { .. } => "auth_failed",
            InboundEnvelope::Message { .. } => "message",
            InboundEnvelope::Typing { .. } => "typing",
        }
    }

    /// Chat-level payloads, as opposed to handshake replies.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            InboundEnvelope::Message { .. } | InboundEnvelope::Typing { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("malformed envelope: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode envelope: {0}")]
    Encode(#[source] serde_json::Error),
}

pub fn decode_inbound(text: &str) -> Result<InboundEnvelope, EnvelopeError> {
    serde_json::from_str(text).map_err(EnvelopeError::Decode)
}

pub fn encode_outbound(envelope: &OutboundEnvelope) -> Result<String, EnvelopeError> {
    serde_json::to_string(envelope).map_err(EnvelopeError::Encode)
}
