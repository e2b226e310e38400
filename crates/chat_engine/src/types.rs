use std::fmt;

use chat_core::{CandidateSnapshot, ConnectionId, Credential, InboundEnvelope};
use thiserror::Error;

/// Lifecycle and traffic of one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Opened,
    Envelope(InboundEnvelope),
    /// Inbound payload that failed to decode; the connection stays open.
    Malformed(String),
    Closed { code: Option<u16> },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Connection {
        conn: ConnectionId,
        event: ConnectionEvent,
    },
    CredentialResolved {
        epoch: u64,
        result: Result<Option<Credential>, TokenError>,
    },
    CandidateFetched {
        epoch: u64,
        result: Result<CandidateSnapshot, FetchError>,
    },
    HandshakeTimerFired {
        conn: ConnectionId,
    },
    ReconnectTimerFired {
        epoch: u64,
    },
    IdentityChanged {
        signed_in: bool,
    },
}

/// Receives engine events from background tasks.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    NoCredential,
    Unauthorized,
    /// `403`: credential valid, identity not recognized as a candidate.
    IdentityUnverified,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::NoCredential => write!(f, "no credential"),
            FailureKind::Unauthorized => write!(f, "unauthorized"),
            FailureKind::IdentityUnverified => write!(f, "identity unverified"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "undecodable body"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("failed to spawn engine thread: {0}")]
    Thread(#[source] std::io::Error),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
