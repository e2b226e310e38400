use crate::candidate::CandidateSnapshot;
use crate::envelope::InboundEnvelope;
use crate::{ConnectionId, Credential, Language};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// UI asked to connect.
    ConnectRequested,
    /// Identity provider reported sign-in (`true`) or sign-out (`false`).
    IdentityChanged { signed_in: bool },
    /// Credential lookup finished for the given session epoch.
    CredentialResolved {
        epoch: u64,
        credential: Option<Credential>,
    },
    ConnectionOpened { conn: ConnectionId },
    EnvelopeReceived {
        conn: ConnectionId,
        envelope: InboundEnvelope,
    },
    /// Inbound payload that could not be decoded.
    EnvelopeMalformed { conn: ConnectionId, detail: String },
    ConnectionClosed {
        conn: ConnectionId,
        code: Option<u16>,
    },
    /// Socket failed to open or errored.
    ConnectionFailed { conn: ConnectionId, detail: String },
    HandshakeTimedOut { conn: ConnectionId },
    ReconnectTimerFired { epoch: u64 },
    /// User typed a chat message.
    SendRequested(String),
    LanguageChanged(Language),
    NewConversationRequested,
    CandidateDataLoaded {
        epoch: u64,
        result: Result<CandidateSnapshot, CandidateFetchFailure>,
    },
    DisconnectRequested,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateFetchFailure {
    /// `403`: credential valid, identity not a known candidate.
    IdentityUnverified,
    NoCredential,
    Unavailable(String),
}
