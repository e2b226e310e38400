//! Chat session engine: sockets, timers, and backend calls behind the core's effects.
mod connection;
mod engine;
mod fetch;
mod token;
mod types;

pub use connection::ConnectionHandle;
pub use engine::{EngineCommand, EngineHandle, EngineSettings};
pub use fetch::{CandidateFetcher, FetchSettings, ReqwestCandidateFetcher};
pub use token::{StaticTokenProvider, TokenProvider};
pub use types::{
    ChannelEventSink, ConnectionEvent, EngineError, EngineEvent, EventSink, FailureKind,
    FetchError, TokenError,
};
