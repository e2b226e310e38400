use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chat_core::{Language, ReconnectPolicy, SessionConfig};
use chat_engine::{EngineSettings, FetchSettings};
use serde::{Deserialize, Serialize};
use url::Url;

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "chat_session.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ws_url: String,
    pub api_base: String,
    pub language: String,
    pub handshake_timeout_ms: u64,
    pub reconnect_delay_ms: u64,
    pub max_reconnect_attempts: Option<u32>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// Environment variable holding the bearer credential.
    pub token_env: String,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:8006/chat".to_string(),
            api_base: "http://localhost:8006".to_string(),
            language: "en".to_string(),
            handshake_timeout_ms: 10_000,
            reconnect_delay_ms: 3_000,
            max_reconnect_attempts: None,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            token_env: "CHAT_SESSION_TOKEN".to_string(),
            log_destination: LogDestination::File,
            log_file: PathBuf::from("./chat_session.log"),
        }
    }
}

impl AppConfig {
    /// A missing file yields defaults; an unreadable or malformed one is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read config {path:?}"));
            }
        };
        ron::from_str(&content).with_context(|| format!("failed to parse config {path:?}"))
    }

    pub fn session_config(&self) -> anyhow::Result<SessionConfig> {
        let language = Language::parse(&self.language)
            .with_context(|| format!("invalid language {:?}", self.language))?;
        Ok(SessionConfig {
            handshake_timeout: Duration::from_millis(self.handshake_timeout_ms),
            reconnect: ReconnectPolicy {
                delay: Duration::from_millis(self.reconnect_delay_ms),
                max_attempts: self.max_reconnect_attempts,
            },
            language,
        })
    }

    pub fn engine_settings(&self) -> anyhow::Result<EngineSettings> {
        let ws_url = Url::parse(&self.ws_url)
            .with_context(|| format!("invalid ws_url {:?}", self.ws_url))?;
        let mut api_base = Url::parse(&self.api_base)
            .with_context(|| format!("invalid api_base {:?}", self.api_base))?;
        // Joined relative paths replace the last segment unless it ends in '/'.
        if !api_base.path().ends_with('/') {
            let path = format!("{}/", api_base.path());
            api_base.set_path(&path);
        }

        let mut fetch = FetchSettings::new(api_base);
        fetch.connect_timeout = Duration::from_millis(self.connect_timeout_ms);
        fetch.request_timeout = Duration::from_millis(self.request_timeout_ms);
        Ok(EngineSettings {
            ws_url,
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            fetch,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_file_overrides_named_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat_session.ron");
        fs::write(
            &path,
            r#"(
                ws_url: "wss://chat.example.com/chat",
                language: "es",
                max_reconnect_attempts: Some(5),
                log_destination: Both,
            )"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.ws_url, "wss://chat.example.com/chat");
        assert_eq!(config.language, "es");
        assert_eq!(config.max_reconnect_attempts, Some(5));
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.reconnect_delay_ms, 3_000);
        assert_eq!(config.token_env, "CHAT_SESSION_TOKEN");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat_session.ron");
        fs::write(&path, "(ws_url: 42").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn session_config_carries_timeouts_and_policy() {
        let config = AppConfig {
            handshake_timeout_ms: 2_500,
            reconnect_delay_ms: 500,
            max_reconnect_attempts: Some(3),
            language: "FR".to_string(),
            ..AppConfig::default()
        };
        let session = config.session_config().unwrap();
        assert_eq!(session.handshake_timeout, Duration::from_millis(2_500));
        assert_eq!(session.reconnect.delay, Duration::from_millis(500));
        assert_eq!(session.reconnect.max_attempts, Some(3));
        assert_eq!(session.language.as_str(), "fr");
    }

    #[test]
    fn invalid_language_is_rejected() {
        let config = AppConfig {
            language: "english".to_string(),
            ..AppConfig::default()
        };
        assert!(config.session_config().is_err());
    }

    #[test]
    fn api_base_gains_trailing_slash() {
        let config = AppConfig {
            api_base: "https://example.com/portal".to_string(),
            ..AppConfig::default()
        };
        let settings = config.engine_settings().unwrap();
        assert_eq!(settings.fetch.api_base.as_str(), "https://example.com/portal/");
        assert_eq!(settings.ws_url.as_str(), "ws://localhost:8006/chat");
    }
}
