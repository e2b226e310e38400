//! Chat session core: pure state machine, handshake, reconnect policy and
//! candidate projection.
mod candidate;
mod credential;
mod effect;
mod envelope;
mod error;
mod handshake;
mod language;
mod msg;
mod projection;
mod reconnect;
mod state;
mod update;
mod view_model;

pub use candidate::{
    CandidateSnapshot, Document, DocumentStatus, Recruiter, Stage, Task, UpcomingEvent,
};
pub use credential::Credential;
pub use effect::{ChatEvent, Effect};
pub use envelope::{
    decode_inbound, encode_outbound, AuthenticatedUser, EnvelopeError, InboundEnvelope,
    OutboundEnvelope,
};
pub use error::{SessionErrorKind, UserNotice, IDENTITY_UNVERIFIED_TEXT};
pub use handshake::{
    classify_auth_failure, AuthHandshake, HandshakeOutcome, HandshakePhase,
    REASON_EMAIL_NOT_REGISTERED,
};
pub use language::{Language, LanguageError};
pub use msg::{CandidateFetchFailure, Msg};
pub use projection::{project, status_label};
pub use reconnect::{
    ReconnectDecision, ReconnectInput, ReconnectPolicy, SkipReason, DEFAULT_RECONNECT_DELAY,
};
pub use state::{
    AuthState, ConnectionId, SessionConfig, SessionState, DEFAULT_HANDSHAKE_TIMEOUT,
};
pub use update::update;
pub use view_model::{
    CandidateView, DocumentRow, RecruiterPanel, SessionView, StageRow, TaskRow, UpcomingPanel,
};
