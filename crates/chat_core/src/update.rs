use chat_logging::{chat_debug, chat_info, chat_warn};

use crate::envelope::{InboundEnvelope, OutboundEnvelope};
use crate::handshake::{AuthHandshake, HandshakeOutcome};
use crate::msg::CandidateFetchFailure;
use crate::projection::project;
use crate::reconnect::ReconnectDecision;
use crate::{
    AuthState, ChatEvent, ConnectionId, Credential, Effect, Language, Msg, SessionErrorKind,
    SessionState, UserNotice,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::ConnectRequested => begin_connect(&mut state),
        Msg::IdentityChanged { signed_in: true } => {
            state.mark_signed_in();
            begin_connect(&mut state)
        }
        Msg::IdentityChanged { signed_in: false } => {
            let effects = reset(&mut state);
            state.clear_identity();
            chat_info!("identity signed out; session reset to epoch {}", state.epoch());
            effects
        }
        Msg::CredentialResolved { epoch, credential } => {
            on_credential(&mut state, epoch, credential)
        }
        Msg::ConnectionOpened { conn } => on_opened(&mut state, conn),
        Msg::EnvelopeReceived { conn, envelope } => on_envelope(&mut state, conn, envelope),
        Msg::EnvelopeMalformed { conn, detail } => {
            if state.is_current(conn) {
                chat_warn!(
                    "{} on connection {}: {}; dropped",
                    SessionErrorKind::MalformedEnvelope,
                    conn,
                    detail
                );
            }
            Vec::new()
        }
        Msg::ConnectionClosed { conn, code } => {
            on_connection_lost(&mut state, conn, &format!("closed with code {code:?}"))
        }
        Msg::ConnectionFailed { conn, detail } => on_connection_lost(&mut state, conn, &detail),
        Msg::HandshakeTimedOut { conn } => on_handshake_timeout(&mut state, conn),
        Msg::ReconnectTimerFired { epoch } => {
            if epoch != state.epoch() || !state.take_reconnect_pending() {
                chat_debug!("stale reconnect timer for epoch {} ignored", epoch);
                return (state, Vec::new());
            }
            if state.auth_state() == AuthState::Failed {
                chat_info!(
                    "reconnect attempt {} starting",
                    state.reconnect_attempts()
                );
                begin_connect(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::SendRequested(content) => on_send(&state, content),
        Msg::LanguageChanged(language) => on_language(&mut state, language),
        Msg::NewConversationRequested => match ready_connection(&state) {
            Some(conn) => vec![Effect::SendEnvelope {
                conn,
                envelope: OutboundEnvelope::NewConversation,
            }],
            None => {
                chat_info!(
                    "{}: new conversation ignored in {:?}",
                    SessionErrorKind::SendWhileNotReady,
                    state.auth_state()
                );
                Vec::new()
            }
        },
        Msg::CandidateDataLoaded { epoch, result } => {
            if epoch != state.epoch() {
                chat_debug!("discarding candidate data from stale epoch {}", epoch);
                return (state, Vec::new());
            }
            match result {
                Ok(snapshot) => {
                    state.set_candidate(project(&snapshot));
                    Vec::new()
                }
                Err(CandidateFetchFailure::IdentityUnverified) => {
                    fail_identity_unverified(&mut state, None)
                }
                Err(CandidateFetchFailure::NoCredential) => {
                    chat_info!("candidate data skipped: no credential");
                    Vec::new()
                }
                Err(CandidateFetchFailure::Unavailable(detail)) => {
                    chat_warn!("candidate data unavailable: {}", detail);
                    Vec::new()
                }
            }
        }
        Msg::DisconnectRequested => {
            chat_info!("disconnect requested");
            reset(&mut state)
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn begin_connect(state: &mut SessionState) -> Vec<Effect> {
    if state.auth_state().is_active() {
        chat_debug!("connect ignored: already {:?}", state.auth_state());
        return Vec::new();
    }
    if state.credential_pending() {
        chat_debug!("connect ignored: credential request in flight");
        return Vec::new();
    }
    let mut effects = Vec::with_capacity(2);
    if state.take_reconnect_pending() {
        effects.push(Effect::CancelReconnect);
    }
    state.set_credential_pending(true);
    effects.push(Effect::RequestCredential {
        epoch: state.epoch(),
    });
    effects
}

fn on_credential(
    state: &mut SessionState,
    epoch: u64,
    credential: Option<Credential>,
) -> Vec<Effect> {
    if epoch != state.epoch() || !state.credential_pending() {
        chat_debug!("discarding credential resolved for stale epoch {}", epoch);
        return Vec::new();
    }
    state.set_credential_pending(false);
    match credential {
        None => {
            chat_info!("no credential available; staying unauthenticated");
            state.record_no_credential();
            Vec::new()
        }
        Some(credential) => {
            let fingerprint = credential.fingerprint();
            let conn = state.begin_connection(credential);
            chat_info!("opening connection {} with credential {}", conn, fingerprint);
            vec![Effect::OpenConnection { conn }]
        }
    }
}

fn on_opened(state: &mut SessionState, conn: ConnectionId) -> Vec<Effect> {
    if !state.is_current(conn) {
        chat_warn!("closing stale connection {}", conn);
        return vec![Effect::CloseConnection { conn }];
    }
    if state.auth_state() != AuthState::Connecting {
        chat_debug!("open for connection {} ignored in {:?}", conn, state.auth_state());
        return Vec::new();
    }
    let language = state.language().clone();
    let credential = state
        .connection_mut()
        .and_then(|active| active.credential.take());
    let Some(credential) = credential else {
        chat_warn!("connection {} opened without a credential", conn);
        state.fail(SessionErrorKind::CredentialRejected);
        let mut effects = vec![Effect::CloseConnection { conn }];
        effects.extend(schedule_reconnect(state));
        return effects;
    };

    let (handshake, envelope) = AuthHandshake::start(conn, credential, &language);
    state.begin_authenticating(handshake);
    chat_debug!("connection {} open; auth sent (language {})", conn, language);
    vec![
        Effect::SendEnvelope { conn, envelope },
        Effect::StartHandshakeTimer {
            conn,
            after: state.config().handshake_timeout,
        },
    ]
}

fn on_envelope(
    state: &mut SessionState,
    conn: ConnectionId,
    envelope: InboundEnvelope,
) -> Vec<Effect> {
    if !state.is_current(conn) {
        chat_debug!("envelope {} from stale connection {} ignored", envelope.kind(), conn);
        return Vec::new();
    }
    match state.auth_state() {
        AuthState::Authenticating => on_handshake_envelope(state, conn, envelope),
        AuthState::Ready => match envelope {
            InboundEnvelope::Message { content } => {
                state.set_typing(false);
                vec![Effect::Emit(ChatEvent::MessageReceived { content })]
            }
            InboundEnvelope::Typing { status } => {
                state.set_typing(status);
                vec![Effect::Emit(ChatEvent::Typing { active: status })]
            }
            other => {
                chat_warn!("unexpected {} after handshake; ignored", other.kind());
                Vec::new()
            }
        },
        other => {
            chat_debug!("envelope {} ignored in {:?}", envelope.kind(), other);
            Vec::new()
        }
    }
}

fn on_handshake_envelope(
    state: &mut SessionState,
    conn: ConnectionId,
    envelope: InboundEnvelope,
) -> Vec<Effect> {
    let kind = envelope.kind();
    let (outcome, sent_language) = match state
        .connection_mut()
        .and_then(|active| active.handshake.as_mut())
    {
        Some(handshake) => (handshake.resolve(envelope), Some(handshake.language().clone())),
        None => (HandshakeOutcome::Rejected, None),
    };

    match outcome {
        HandshakeOutcome::Succeeded { user } => {
            state.mark_ready(user);
            chat_info!("connection {} authenticated; session ready", conn);
            let mut effects = vec![Effect::CancelHandshakeTimer { conn }];
            // Language changed while the handshake was in flight.
            if sent_language.as_ref() != Some(state.language()) {
                effects.push(Effect::SendEnvelope {
                    conn,
                    envelope: OutboundEnvelope::SetLanguage {
                        language: state.language().clone(),
                    },
                });
            }
            effects.push(Effect::Emit(ChatEvent::Ready));
            effects.push(Effect::FetchCandidateData {
                epoch: state.epoch(),
            });
            effects
        }
        HandshakeOutcome::Failed {
            kind: SessionErrorKind::IdentityUnverified,
            reason,
            message,
        } => {
            chat_warn!("handshake rejected identity ({}); signing out", reason);
            let mut effects = vec![Effect::CancelHandshakeTimer { conn }];
            effects.extend(fail_identity_unverified(state, message));
            effects
        }
        HandshakeOutcome::Failed { kind, reason, .. } => {
            chat_warn!("handshake failed on connection {}: {} ({})", conn, kind, reason);
            state.fail(kind);
            let mut effects = vec![
                Effect::CancelHandshakeTimer { conn },
                Effect::CloseConnection { conn },
            ];
            effects.extend(schedule_reconnect(state));
            effects
        }
        HandshakeOutcome::Rejected | HandshakeOutcome::AlreadyResolved => {
            chat_warn!(
                "{} received before handshake resolution on connection {}; rejected",
                kind,
                conn
            );
            Vec::new()
        }
    }
}

fn on_connection_lost(state: &mut SessionState, conn: ConnectionId, detail: &str) -> Vec<Effect> {
    if !state.is_current(conn) {
        chat_debug!("event for stale connection {} ignored: {}", conn, detail);
        return Vec::new();
    }
    let mut effects = Vec::new();
    if state.handshake_pending() {
        effects.push(Effect::CancelHandshakeTimer { conn });
    }
    let prior = state.auth_state();
    state.fail(SessionErrorKind::ConnectionUnreachable);
    chat_warn!(
        "connection {} lost while {:?}: {}",
        conn,
        prior,
        detail
    );
    effects.extend(schedule_reconnect(state));
    effects
}

fn on_handshake_timeout(state: &mut SessionState, conn: ConnectionId) -> Vec<Effect> {
    if !state.is_current(conn) || !state.handshake_pending() {
        chat_debug!("handshake timer for connection {} ignored", conn);
        return Vec::new();
    }
    chat_warn!("{} on connection {}", SessionErrorKind::HandshakeTimeout, conn);
    state.fail(SessionErrorKind::HandshakeTimeout);
    let mut effects = vec![Effect::CloseConnection { conn }];
    effects.extend(schedule_reconnect(state));
    effects
}

fn schedule_reconnect(state: &mut SessionState) -> Vec<Effect> {
    match state.config().reconnect.decide(state.reconnect_input()) {
        ReconnectDecision::Schedule { after } => {
            state.begin_reconnect_wait();
            chat_info!(
                "reconnect {} scheduled in {:?}",
                state.reconnect_attempts(),
                after
            );
            vec![Effect::ScheduleReconnect {
                epoch: state.epoch(),
                after,
            }]
        }
        ReconnectDecision::AlreadyPending => {
            chat_debug!("reconnect already pending");
            Vec::new()
        }
        ReconnectDecision::Skip(reason) => {
            chat_info!("no reconnect: {:?}", reason);
            Vec::new()
        }
        ReconnectDecision::GiveUp { attempts } => {
            chat_warn!("{} after {} attempts", SessionErrorKind::RetriesExhausted, attempts);
            let notice = UserNotice::ConnectionLost { attempts };
            state.give_up(notice.clone());
            vec![Effect::Emit(ChatEvent::Notice(notice))]
        }
    }
}

fn fail_identity_unverified(state: &mut SessionState, message: Option<String>) -> Vec<Effect> {
    if state.is_terminal() {
        return Vec::new();
    }
    let mut effects = reset(state);
    state.clear_identity();
    let notice = UserNotice::IdentityUnverified { message };
    state.mark_terminal(notice.clone());
    effects.push(Effect::SignOut);
    effects.push(Effect::Emit(ChatEvent::Notice(notice)));
    effects
}

/// Closes the connection, cancels timers and returns to `Unauthenticated`.
fn reset(state: &mut SessionState) -> Vec<Effect> {
    let mut effects = Vec::new();
    let handshake_pending = state.handshake_pending();
    if let Some(active) = state.take_connection() {
        if handshake_pending {
            effects.push(Effect::CancelHandshakeTimer { conn: active.id });
        }
        effects.push(Effect::CloseConnection { conn: active.id });
    }
    if state.take_reconnect_pending() {
        effects.push(Effect::CancelReconnect);
    }
    state.reset();
    effects
}

fn ready_connection(state: &SessionState) -> Option<ConnectionId> {
    if state.auth_state() == AuthState::Ready {
        state.connection()
    } else {
        None
    }
}

fn on_send(state: &SessionState, content: String) -> Vec<Effect> {
    let Some(conn) = ready_connection(state) else {
        chat_info!(
            "{}: outbound message ({} chars) dropped in {:?}",
            SessionErrorKind::SendWhileNotReady,
            content.chars().count(),
            state.auth_state()
        );
        return Vec::new();
    };
    if content.trim().is_empty() {
        chat_debug!("empty message not sent");
        return Vec::new();
    }
    vec![Effect::SendEnvelope {
        conn,
        envelope: OutboundEnvelope::Message { content },
    }]
}

fn on_language(state: &mut SessionState, language: Language) -> Vec<Effect> {
    if *state.language() == language {
        return Vec::new();
    }
    state.set_language(language.clone());
    match ready_connection(state) {
        Some(conn) => vec![Effect::SendEnvelope {
            conn,
            envelope: OutboundEnvelope::SetLanguage { language },
        }],
        None => Vec::new(),
    }
}
