#![deny(missing_docs)]
//! Shared logging utilities for the chat session workspace.
//!
//! This crate provides the `chat_*` logging macros used across the codebase,
//! a minimal test initializer for the global logger, and the credential
//! fingerprint used whenever a bearer token has to be identified in a log line.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the credential digest.
const FINGERPRINT_LEN: usize = 8;

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! chat_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! chat_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! chat_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! chat_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! chat_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Returns a short, stable fingerprint for a secret token.
///
/// The raw token never reaches a log sink; two log lines mentioning the same
/// fingerprint refer to the same credential.
pub fn credential_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut out = String::with_capacity(FINGERPRINT_LEN);
    for byte in digest.iter().take(FINGERPRINT_LEN / 2) {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::credential_fingerprint;

    #[test]
    fn fingerprint_is_short_and_stable() {
        let first = credential_fingerprint("secret-token");
        let second = credential_fingerprint("secret-token");
        assert_eq!(first, second);
        assert_eq!(first.len(), 8);
        assert!(!first.contains("secret"));
    }

    #[test]
    fn fingerprint_differs_per_token() {
        assert_ne!(credential_fingerprint("a"), credential_fingerprint("b"));
    }
}
