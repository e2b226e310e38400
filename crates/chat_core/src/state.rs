use std::time::Duration;

use crate::envelope::AuthenticatedUser;
use crate::handshake::AuthHandshake;
use crate::reconnect::{ReconnectInput, ReconnectPolicy};
use crate::view_model::{CandidateView, SessionView};
use crate::{Credential, Language, SessionErrorKind, UserNotice};

pub type ConnectionId = u64;

pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Connecting,
    Authenticating,
    Ready,
    Failed,
}

impl AuthState {
    /// A connection attempt is underway or established.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            AuthState::Connecting | AuthState::Authenticating | AuthState::Ready
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub handshake_timeout: Duration,
    pub reconnect: ReconnectPolicy,
    pub language: Language,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            reconnect: ReconnectPolicy::default(),
            language: Language::default(),
        }
    }
}

/// The single connection owned by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ActiveConnection {
    pub(crate) id: ConnectionId,
    /// Held only between credential resolution and the socket opening.
    pub(crate) credential: Option<Credential>,
    pub(crate) handshake: Option<AuthHandshake>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    config: SessionConfig,
    auth_state: AuthState,
    language: Language,
    last_error: Option<SessionErrorKind>,
    epoch: u64,
    next_connection: ConnectionId,
    connection: Option<ActiveConnection>,
    credential_pending: bool,
    reconnect_pending: bool,
    reconnect_attempts: u32,
    was_authenticated: bool,
    signed_in: bool,
    terminal: bool,
    user: Option<AuthenticatedUser>,
    assistant_typing: bool,
    candidate: Option<CandidateView>,
    notice: Option<UserNotice>,
    dirty: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::with_config(SessionConfig::default())
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            language: config.language.clone(),
            config,
            auth_state: AuthState::Unauthenticated,
            last_error: None,
            epoch: 0,
            next_connection: 1,
            connection: None,
            credential_pending: false,
            reconnect_pending: false,
            reconnect_attempts: 0,
            was_authenticated: false,
            signed_in: false,
            terminal: false,
            user: None,
            assistant_typing: false,
            candidate: None,
            notice: None,
            dirty: false,
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            auth_state: self.auth_state,
            language: self.language.clone(),
            last_error: self.last_error,
            user: self.user.clone(),
            assistant_typing: self.assistant_typing,
            reconnect_pending: self.reconnect_pending,
            notice: self.notice.clone(),
            candidate: self.candidate.clone(),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn auth_state(&self) -> AuthState {
        self.auth_state
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn last_error(&self) -> Option<SessionErrorKind> {
        self.last_error
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn connection(&self) -> Option<ConnectionId> {
        self.connection.as_ref().map(|conn| conn.id)
    }

    pub fn credential_pending(&self) -> bool {
        self.credential_pending
    }

    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn candidate(&self) -> Option<&CandidateView> {
        self.candidate.as_ref()
    }

    pub(crate) fn is_current(&self, conn: ConnectionId) -> bool {
        self.connection() == Some(conn)
    }

    pub(crate) fn handshake_pending(&self) -> bool {
        self.connection
            .as_ref()
            .and_then(|conn| conn.handshake.as_ref())
            .is_some_and(AuthHandshake::is_pending)
    }

    pub(crate) fn connection_mut(&mut self) -> Option<&mut ActiveConnection> {
        self.connection.as_mut()
    }

    pub(crate) fn reconnect_input(&self) -> ReconnectInput {
        ReconnectInput {
            was_authenticated: self.was_authenticated,
            terminal_failure: self.terminal,
            signed_in: self.signed_in,
            timer_pending: self.reconnect_pending,
            attempts: self.reconnect_attempts,
        }
    }

    pub(crate) fn set_credential_pending(&mut self, pending: bool) {
        self.credential_pending = pending;
    }

    pub(crate) fn mark_signed_in(&mut self) {
        self.signed_in = true;
        self.terminal = false;
    }

    pub(crate) fn record_no_credential(&mut self) {
        self.signed_in = false;
        self.auth_state = AuthState::Unauthenticated;
        self.last_error = Some(SessionErrorKind::NoCredential);
        self.dirty = true;
    }

    /// Allocates the next connection id and enters `Connecting`.
    pub(crate) fn begin_connection(&mut self, credential: Credential) -> ConnectionId {
        let id = self.next_connection;
        self.next_connection += 1;
        self.connection = Some(ActiveConnection {
            id,
            credential: Some(credential),
            handshake: None,
        });
        self.signed_in = true;
        self.terminal = false;
        self.auth_state = AuthState::Connecting;
        self.dirty = true;
        id
    }

    pub(crate) fn begin_authenticating(&mut self, handshake: AuthHandshake) {
        if let Some(conn) = self.connection.as_mut() {
            conn.handshake = Some(handshake);
        }
        self.auth_state = AuthState::Authenticating;
        self.dirty = true;
    }

    pub(crate) fn mark_ready(&mut self, user: Option<AuthenticatedUser>) {
        self.auth_state = AuthState::Ready;
        self.was_authenticated = true;
        self.reconnect_attempts = 0;
        self.last_error = None;
        self.notice = None;
        if user.is_some() {
            self.user = user;
        }
        self.dirty = true;
    }

    /// Drops the connection and enters `Failed` with the given tag.
    pub(crate) fn fail(&mut self, kind: SessionErrorKind) -> Option<ConnectionId> {
        let dropped = self.connection.take().map(|conn| conn.id);
        self.auth_state = AuthState::Failed;
        self.last_error = Some(kind);
        self.assistant_typing = false;
        self.dirty = true;
        dropped
    }

    pub(crate) fn take_connection(&mut self) -> Option<ActiveConnection> {
        self.connection.take()
    }

    pub(crate) fn take_reconnect_pending(&mut self) -> bool {
        std::mem::take(&mut self.reconnect_pending)
    }

    pub(crate) fn begin_reconnect_wait(&mut self) {
        self.reconnect_pending = true;
        self.reconnect_attempts += 1;
        self.dirty = true;
    }

    /// Back to `Unauthenticated` under a new epoch.
    pub(crate) fn reset(&mut self) {
        self.epoch += 1;
        self.auth_state = AuthState::Unauthenticated;
        self.connection = None;
        self.credential_pending = false;
        self.reconnect_pending = false;
        self.reconnect_attempts = 0;
        self.was_authenticated = false;
        self.assistant_typing = false;
        // A terminal failure stays visible alongside its notice.
        if !self.terminal {
            self.last_error = None;
        }
        self.dirty = true;
    }

    pub(crate) fn clear_identity(&mut self) {
        self.signed_in = false;
        self.user = None;
        self.candidate = None;
        self.dirty = true;
    }

    pub(crate) fn mark_terminal(&mut self, notice: UserNotice) {
        self.terminal = true;
        self.last_error = Some(notice.kind());
        self.notice = Some(notice);
        self.dirty = true;
    }

    pub(crate) fn give_up(&mut self, notice: UserNotice) {
        self.last_error = Some(notice.kind());
        self.notice = Some(notice);
        self.dirty = true;
    }

    pub(crate) fn set_language(&mut self, language: Language) {
        self.language = language;
        self.dirty = true;
    }

    pub(crate) fn set_typing(&mut self, active: bool) {
        if self.assistant_typing != active {
            self.assistant_typing = active;
            self.dirty = true;
        }
    }

    pub(crate) fn set_candidate(&mut self, view: CandidateView) {
        self.candidate = Some(view);
        self.dirty = true;
    }
}
