use thiserror::Error;

/// Default text shown when the backend does not recognize the signed-in identity.
pub const IDENTITY_UNVERIFIED_TEXT: &str =
    "This email is not registered. Please complete the interpreter application form first.";

/// Failure taxonomy recorded as `last_error` on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SessionErrorKind {
    /// Not signed in. A normal state rather than a fault.
    #[error("no-credential")]
    NoCredential,
    #[error("connection-unreachable")]
    ConnectionUnreachable,
    #[error("handshake-timeout")]
    HandshakeTimeout,
    /// Credential is valid but the identity is unknown to the backend. Terminal.
    #[error("identity-unverified")]
    IdentityUnverified,
    #[error("credential-rejected")]
    CredentialRejected,
    #[error("malformed-envelope")]
    MalformedEnvelope,
    #[error("send-while-not-ready")]
    SendWhileNotReady,
    #[error("retries-exhausted")]
    RetriesExhausted,
}

impl SessionErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::ConnectionUnreachable | Self::HandshakeTimeout | Self::CredentialRejected
        )
    }

    pub fn is_user_visible(self) -> bool {
        matches!(self, Self::IdentityUnverified | Self::RetriesExhausted)
    }
}

/// Messages the UI must show to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNotice {
    IdentityUnverified { message: Option<String> },
    ConnectionLost { attempts: u32 },
}

impl UserNotice {
    pub fn kind(&self) -> SessionErrorKind {
        match self {
            UserNotice::IdentityUnverified { .. } => SessionErrorKind::IdentityUnverified,
            UserNotice::ConnectionLost { .. } => SessionErrorKind::RetriesExhausted,
        }
    }

    pub fn text(&self) -> String {
        match self {
            UserNotice::IdentityUnverified { message } => message
                .clone()
                .unwrap_or_else(|| IDENTITY_UNVERIFIED_TEXT.to_string()),
            UserNotice::ConnectionLost { attempts } => format!(
                "Lost connection to the chat service after {attempts} reconnect attempts. Use /connect to try again."
            ),
        }
    }
}
