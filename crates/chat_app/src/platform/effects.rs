use std::sync::{mpsc, Arc};

use chat_core::{CandidateFetchFailure, Effect, Msg};
use chat_engine::{
    CandidateFetcher, ConnectionEvent, EngineCommand, EngineError, EngineEvent, EngineHandle,
    EngineSettings, EventSink, FailureKind, FetchError, TokenProvider,
};
use chat_logging::{chat_debug, chat_warn};

use super::app::AppInput;

/// Executes core effects against the engine.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(
        settings: EngineSettings,
        tokens: Arc<dyn TokenProvider>,
        fetcher: Arc<dyn CandidateFetcher>,
        input_tx: mpsc::Sender<AppInput>,
    ) -> Result<Self, EngineError> {
        let sink = Arc::new(SessionEventSink { tx: input_tx });
        let engine = EngineHandle::new(settings, tokens, fetcher, sink)?;
        Ok(Self { engine })
    }

    pub fn run(&self, effect: Effect) {
        match engine_command(effect) {
            Some(command) => self.engine.dispatch(command),
            None => chat_debug!("effect handled by the UI"),
        }
    }

    /// Ends the identity-provider session on user request.
    pub fn sign_out(&self) {
        self.engine.dispatch(EngineCommand::SignOut);
    }
}

/// `Emit` effects belong to the UI and have no engine counterpart.
pub(crate) fn engine_command(effect: Effect) -> Option<EngineCommand> {
    let command = match effect {
        Effect::RequestCredential { epoch } => EngineCommand::RequestCredential { epoch },
        Effect::OpenConnection { conn } => EngineCommand::Open { conn },
        Effect::SendEnvelope { conn, envelope } => EngineCommand::Send { conn, envelope },
        Effect::CloseConnection { conn } => EngineCommand::Close { conn },
        Effect::StartHandshakeTimer { conn, after } => {
            EngineCommand::StartHandshakeTimer { conn, after }
        }
        Effect::CancelHandshakeTimer { conn } => EngineCommand::CancelHandshakeTimer { conn },
        Effect::ScheduleReconnect { epoch, after } => {
            EngineCommand::ScheduleReconnect { epoch, after }
        }
        Effect::CancelReconnect => EngineCommand::CancelReconnect,
        Effect::SignOut => EngineCommand::SignOut,
        Effect::FetchCandidateData { epoch } => EngineCommand::FetchCandidateData { epoch },
        Effect::Emit(_) => return None,
    };
    Some(command)
}

pub(crate) fn session_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Connection { conn, event } => match event {
            ConnectionEvent::Opened => Msg::ConnectionOpened { conn },
            ConnectionEvent::Envelope(envelope) => Msg::EnvelopeReceived { conn, envelope },
            ConnectionEvent::Malformed(detail) => Msg::EnvelopeMalformed { conn, detail },
            ConnectionEvent::Closed { code } => Msg::ConnectionClosed { conn, code },
            ConnectionEvent::Failed(detail) => Msg::ConnectionFailed { conn, detail },
        },
        EngineEvent::CredentialResolved { epoch, result } => {
            let credential = result.unwrap_or_else(|err| {
                chat_warn!("credential lookup failed, treating as signed out: {}", err);
                None
            });
            Msg::CredentialResolved { epoch, credential }
        }
        EngineEvent::CandidateFetched { epoch, result } => Msg::CandidateDataLoaded {
            epoch,
            result: result.map_err(fetch_failure),
        },
        EngineEvent::HandshakeTimerFired { conn } => Msg::HandshakeTimedOut { conn },
        EngineEvent::ReconnectTimerFired { epoch } => Msg::ReconnectTimerFired { epoch },
        EngineEvent::IdentityChanged { signed_in } => Msg::IdentityChanged { signed_in },
    }
}

fn fetch_failure(err: FetchError) -> CandidateFetchFailure {
    match err.kind {
        FailureKind::IdentityUnverified => CandidateFetchFailure::IdentityUnverified,
        FailureKind::NoCredential => CandidateFetchFailure::NoCredential,
        _ => CandidateFetchFailure::Unavailable(err.to_string()),
    }
}

struct SessionEventSink {
    tx: mpsc::Sender<AppInput>,
}

impl EventSink for SessionEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(AppInput::Session(session_msg(event)));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chat_core::{ChatEvent, Credential, InboundEnvelope, OutboundEnvelope};
    use chat_engine::TokenError;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn emit_effects_stay_in_the_ui() {
        assert_eq!(engine_command(Effect::Emit(ChatEvent::Ready)), None);
    }

    #[test]
    fn io_effects_map_to_engine_commands() {
        assert_eq!(
            engine_command(Effect::SendEnvelope {
                conn: 2,
                envelope: OutboundEnvelope::NewConversation,
            }),
            Some(EngineCommand::Send {
                conn: 2,
                envelope: OutboundEnvelope::NewConversation,
            })
        );
        assert_eq!(
            engine_command(Effect::ScheduleReconnect {
                epoch: 3,
                after: Duration::from_secs(3),
            }),
            Some(EngineCommand::ScheduleReconnect {
                epoch: 3,
                after: Duration::from_secs(3),
            })
        );
        assert_eq!(engine_command(Effect::SignOut), Some(EngineCommand::SignOut));
    }

    #[test]
    fn connection_events_keep_their_id() {
        let msg = session_msg(EngineEvent::Connection {
            conn: 9,
            event: ConnectionEvent::Envelope(InboundEnvelope::Typing { status: true }),
        });
        assert_eq!(
            msg,
            Msg::EnvelopeReceived {
                conn: 9,
                envelope: InboundEnvelope::Typing { status: true },
            }
        );
    }

    #[test]
    fn token_errors_resolve_as_absent_credential() {
        let msg = session_msg(EngineEvent::CredentialResolved {
            epoch: 1,
            result: Err(TokenError::Unavailable("offline".to_string())),
        });
        assert_eq!(
            msg,
            Msg::CredentialResolved {
                epoch: 1,
                credential: None,
            }
        );

        let msg = session_msg(EngineEvent::CredentialResolved {
            epoch: 1,
            result: Ok(Some(Credential::new("t"))),
        });
        assert_eq!(
            msg,
            Msg::CredentialResolved {
                epoch: 1,
                credential: Some(Credential::new("t")),
            }
        );
    }

    #[test]
    fn forbidden_fetch_becomes_identity_unverified() {
        let msg = session_msg(EngineEvent::CandidateFetched {
            epoch: 4,
            result: Err(FetchError {
                kind: FailureKind::IdentityUnverified,
                message: "403 Forbidden".to_string(),
            }),
        });
        assert_eq!(
            msg,
            Msg::CandidateDataLoaded {
                epoch: 4,
                result: Err(CandidateFetchFailure::IdentityUnverified),
            }
        );
    }

    #[test]
    fn other_fetch_failures_are_unavailable() {
        let msg = session_msg(EngineEvent::CandidateFetched {
            epoch: 4,
            result: Err(FetchError {
                kind: FailureKind::Timeout,
                message: "slow".to_string(),
            }),
        });
        assert!(matches!(
            msg,
            Msg::CandidateDataLoaded {
                result: Err(CandidateFetchFailure::Unavailable(_)),
                ..
            }
        ));
    }
}
