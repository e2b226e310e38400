use crate::envelope::{AuthenticatedUser, InboundEnvelope, OutboundEnvelope};
use crate::{ConnectionId, Credential, Language, SessionErrorKind};

/// Backend reason code for an identity that is not a known candidate.
pub const REASON_EMAIL_NOT_REGISTERED: &str = "email_not_registered";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakePhase {
    Sent,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeOutcome {
    Succeeded {
        user: Option<AuthenticatedUser>,
    },
    Failed {
        kind: SessionErrorKind,
        reason: String,
        message: Option<String>,
    },
    /// The envelope arrived before resolution and does not resolve it.
    Rejected,
    AlreadyResolved,
}

/// Protocol-level login exchange for one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHandshake {
    conn: ConnectionId,
    phase: HandshakePhase,
    /// Language carried by the `auth` envelope.
    language: Language,
}

impl AuthHandshake {
    /// Consumes the credential into the `auth` envelope to send on open.
    pub fn start(
        conn: ConnectionId,
        credential: Credential,
        language: &Language,
    ) -> (Self, OutboundEnvelope) {
        let envelope = OutboundEnvelope::Auth {
            token: credential,
            language: language.clone(),
        };
        (
            Self {
                conn,
                phase: HandshakePhase::Sent,
                language: language.clone(),
            },
            envelope,
        )
    }

    pub fn connection(&self) -> ConnectionId {
        self.conn
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn phase(&self) -> HandshakePhase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        self.phase == HandshakePhase::Sent
    }

    pub fn resolve(&mut self, envelope: InboundEnvelope) -> HandshakeOutcome {
        if self.phase == HandshakePhase::Resolved {
            return HandshakeOutcome::AlreadyResolved;
        }
        match envelope {
            InboundEnvelope::AuthSuccess { user } => {
                self.phase = HandshakePhase::Resolved;
                HandshakeOutcome::Succeeded { user }
            }
            InboundEnvelope::AuthFailed { reason, message } => {
                self.phase = HandshakePhase::Resolved;
                HandshakeOutcome::Failed {
                    kind: classify_auth_failure(&reason),
                    reason,
                    message,
                }
            }
            InboundEnvelope::Message { .. } | InboundEnvelope::Typing { .. } => {
                HandshakeOutcome::Rejected
            }
        }
    }
}

pub fn classify_auth_failure(reason: &str) -> SessionErrorKind {
    match reason {
        REASON_EMAIL_NOT_REGISTERED => SessionErrorKind::IdentityUnverified,
        _ => SessionErrorKind::CredentialRejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> AuthHandshake {
        AuthHandshake::start(4, Credential::new("tok"), &Language::default()).0
    }

    #[test]
    fn start_builds_auth_envelope() {
        let (handshake, envelope) =
            AuthHandshake::start(4, Credential::new("tok"), &Language::parse("es").unwrap());
        assert_eq!(handshake.connection(), 4);
        assert!(handshake.is_pending());
        assert_eq!(handshake.language().as_str(), "es");
        assert_eq!(
            envelope,
            OutboundEnvelope::Auth {
                token: Credential::new("tok"),
                language: Language::parse("es").unwrap(),
            }
        );
    }

    #[test]
    fn success_resolves_once() {
        let mut handshake = started();
        assert_eq!(
            handshake.resolve(InboundEnvelope::AuthSuccess { user: None }),
            HandshakeOutcome::Succeeded { user: None }
        );
        assert_eq!(handshake.phase(), HandshakePhase::Resolved);
        assert_eq!(
            handshake.resolve(InboundEnvelope::AuthSuccess { user: None }),
            HandshakeOutcome::AlreadyResolved
        );
    }

    #[test]
    fn failure_reasons_map_to_taxonomy() {
        let mut handshake = started();
        let outcome = handshake.resolve(InboundEnvelope::AuthFailed {
            reason: "email_not_registered".to_string(),
            message: None,
        });
        assert!(matches!(
            outcome,
            HandshakeOutcome::Failed {
                kind: SessionErrorKind::IdentityUnverified,
                ..
            }
        ));
        assert_eq!(
            classify_auth_failure("invalid_token"),
            SessionErrorKind::CredentialRejected
        );
        assert_eq!(
            classify_auth_failure("something_new"),
            SessionErrorKind::CredentialRejected
        );
    }

    #[test]
    fn domain_envelope_does_not_resolve() {
        let mut handshake = started();
        assert_eq!(
            handshake.resolve(InboundEnvelope::Message {
                content: "early".to_string()
            }),
            HandshakeOutcome::Rejected
        );
        assert!(handshake.is_pending());
    }
}
