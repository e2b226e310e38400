use std::fmt;

use serde::Serialize;

/// Short-lived bearer token issued by the identity provider.
///
/// `Debug` only ever shows a fingerprint. The session fetches a fresh one for
/// every connection attempt and hands it to exactly one handshake.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Builds a credential from untrusted input, treating blank values as absent.
    pub fn from_raw(raw: &str) -> Option<Self> {
        let token = raw.trim();
        (!token.is_empty()).then(|| Self(token.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn fingerprint(&self) -> String {
        chat_logging::credential_fingerprint(&self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.fingerprint())
    }
}
