use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid language code {0:?}: expected two ASCII letters")]
pub struct LanguageError(pub String);

/// Two-letter, lowercase language code used for local rendering and for the
/// backend's localized replies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Language(String);

impl Language {
    pub fn parse(raw: &str) -> Result<Self, LanguageError> {
        let code = raw.trim();
        if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_lowercase()))
        } else {
            Err(LanguageError(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Language {
    fn default() -> Self {
        Self("en".to_string())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Language {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Language {
    type Error = LanguageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Language> for String {
    fn from(value: Language) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_english() {
        assert_eq!(Language::default().as_str(), "en");
    }

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        assert_eq!(Language::parse(" ES ").unwrap().as_str(), "es");
    }

    #[test]
    fn parse_rejects_non_codes() {
        assert!(Language::parse("eng").is_err());
        assert!(Language::parse("e1").is_err());
        assert!(Language::parse("").is_err());
    }

    #[test]
    fn deserialize_validates() {
        let ok: Language = serde_json::from_str("\"fr\"").unwrap();
        assert_eq!(ok.as_str(), "fr");
        assert!(serde_json::from_str::<Language>("\"french\"").is_err());
    }
}
