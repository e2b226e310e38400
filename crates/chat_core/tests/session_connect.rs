use std::sync::Once;

use chat_core::{
    update, AuthState, Credential, Effect, Msg, SessionErrorKind, SessionState,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(chat_logging::initialize_for_tests);
}

fn open_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::OpenConnection { .. }))
        .count()
}

#[test]
fn connect_requests_a_fresh_credential() {
    init_logging();
    let (state, effects) = update(SessionState::new(), Msg::ConnectRequested);

    assert_eq!(effects, vec![Effect::RequestCredential { epoch: 0 }]);
    assert_eq!(state.auth_state(), AuthState::Unauthenticated);
    assert!(state.credential_pending());
}

#[test]
fn missing_credential_never_opens_a_connection() {
    init_logging();
    let (state, _) = update(SessionState::new(), Msg::ConnectRequested);
    let (mut state, effects) = update(
        state,
        Msg::CredentialResolved {
            epoch: 0,
            credential: None,
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.auth_state(), AuthState::Unauthenticated);
    assert_eq!(state.last_error(), Some(SessionErrorKind::NoCredential));
    assert_eq!(state.connection(), None);
    assert!(state.consume_dirty());
}

#[test]
fn credential_opens_exactly_one_connection() {
    init_logging();
    let (state, _) = update(SessionState::new(), Msg::ConnectRequested);
    let (state, effects) = update(
        state,
        Msg::CredentialResolved {
            epoch: 0,
            credential: Some(Credential::new("tok")),
        },
    );

    assert_eq!(effects, vec![Effect::OpenConnection { conn: 1 }]);
    assert_eq!(state.auth_state(), AuthState::Connecting);
    assert_eq!(state.connection(), Some(1));
}

#[test]
fn repeated_connects_are_idempotent() {
    init_logging();
    let mut all_effects = Vec::new();
    let (mut state, effects) = update(SessionState::new(), Msg::ConnectRequested);
    all_effects.extend(effects);

    // While the credential request is in flight.
    for _ in 0..3 {
        let (next, effects) = update(state, Msg::ConnectRequested);
        assert!(effects.is_empty());
        state = next;
    }

    let (mut state, effects) = update(
        state,
        Msg::CredentialResolved {
            epoch: 0,
            credential: Some(Credential::new("tok")),
        },
    );
    all_effects.extend(effects);

    // While connecting, and again after the socket opens.
    for msg in [
        Msg::ConnectRequested,
        Msg::IdentityChanged { signed_in: true },
        Msg::ConnectionOpened { conn: 1 },
        Msg::ConnectRequested,
    ] {
        let (next, effects) = update(state, msg);
        all_effects.extend(effects);
        state = next;
    }

    assert_eq!(open_count(&all_effects), 1);
    assert_eq!(
        all_effects
            .iter()
            .filter(|effect| matches!(effect, Effect::RequestCredential { .. }))
            .count(),
        1
    );
    assert_eq!(state.auth_state(), AuthState::Authenticating);
}

#[test]
fn credential_resolved_after_reset_is_discarded() {
    init_logging();
    let (state, _) = update(SessionState::new(), Msg::ConnectRequested);
    let (state, _) = update(state, Msg::DisconnectRequested);
    assert_eq!(state.epoch(), 1);

    let (state, effects) = update(
        state,
        Msg::CredentialResolved {
            epoch: 0,
            credential: Some(Credential::new("late")),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.auth_state(), AuthState::Unauthenticated);
    assert_eq!(state.connection(), None);
}

#[test]
fn sign_in_event_connects() {
    init_logging();
    let (state, effects) = update(SessionState::new(), Msg::IdentityChanged { signed_in: true });

    assert_eq!(effects, vec![Effect::RequestCredential { epoch: 0 }]);
    assert!(state.is_signed_in());
}

#[test]
fn stale_open_is_closed() {
    init_logging();
    let (state, _) = update(SessionState::new(), Msg::ConnectRequested);
    let (state, _) = update(
        state,
        Msg::CredentialResolved {
            epoch: 0,
            credential: Some(Credential::new("tok")),
        },
    );
    let (state, _) = update(state, Msg::DisconnectRequested);
    let (state, effects) = update(state, Msg::ConnectionOpened { conn: 1 });

    assert_eq!(effects, vec![Effect::CloseConnection { conn: 1 }]);
    assert_eq!(state.auth_state(), AuthState::Unauthenticated);
}

#[test]
fn tick_is_noop() {
    let state = SessionState::new();
    let (next, effects) = update(state.clone(), Msg::Tick);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
