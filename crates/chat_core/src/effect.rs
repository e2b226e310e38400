use std::time::Duration;

use crate::envelope::OutboundEnvelope;
use crate::{ConnectionId, UserNotice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RequestCredential { epoch: u64 },
    OpenConnection { conn: ConnectionId },
    SendEnvelope {
        conn: ConnectionId,
        envelope: OutboundEnvelope,
    },
    CloseConnection { conn: ConnectionId },
    StartHandshakeTimer { conn: ConnectionId, after: Duration },
    CancelHandshakeTimer { conn: ConnectionId },
    ScheduleReconnect { epoch: u64, after: Duration },
    CancelReconnect,
    /// Terminate the identity-provider session.
    SignOut,
    FetchCandidateData { epoch: u64 },
    Emit(ChatEvent),
}

/// Events on the chat stream consumed by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Ready,
    MessageReceived { content: String },
    Typing { active: bool },
    Notice(UserNotice),
}
