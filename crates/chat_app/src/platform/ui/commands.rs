//! Parsing of stdin lines into client commands.
use chat_core::{Language, LanguageError};
use thiserror::Error;

/// Preset questions offered alongside free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    Status,
    Documents,
    Human,
}

impl QuickAction {
    pub const ALL: [QuickAction; 3] = [QuickAction::Status, QuickAction::Documents, QuickAction::Human];

    pub fn name(self) -> &'static str {
        match self {
            QuickAction::Status => "status",
            QuickAction::Documents => "documents",
            QuickAction::Human => "human",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            QuickAction::Status => "What is the current status of my application?",
            QuickAction::Documents => "Which documents do I still need to submit?",
            QuickAction::Human => "I would like to talk to a recruiter.",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Ask(QuickAction),
    Connect,
    Disconnect,
    SignOut,
    Language(Language),
    NewConversation,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command /{0}; try /help")]
    Unknown(String),
    #[error("/{0} needs an argument")]
    MissingArgument(&'static str),
    #[error(transparent)]
    Language(#[from] LanguageError),
    #[error("unknown quick action {0:?}; choose status, documents or human")]
    UnknownQuickAction(String),
}

pub const HELP: &str = "\
commands:
  <text>              send a chat message
  /ask <action>       send a preset question (status, documents, human)
  /connect            open the chat session
  /disconnect         close the chat session
  /signout            sign out of the identity provider
  /lang <code>        switch language (two letters, e.g. es)
  /new                start a new conversation
  /status             show session and candidate details
  /quit               exit";

/// `Ok(None)` for blank lines.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Send(line.to_string())));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let command = match name {
        "connect" => Command::Connect,
        "disconnect" => Command::Disconnect,
        "signout" => Command::SignOut,
        "new" => Command::NewConversation,
        "status" => Command::Status,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "lang" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument("lang"));
            }
            Command::Language(Language::parse(arg)?)
        }
        "ask" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument("ask"));
            }
            let action = QuickAction::from_name(arg)
                .ok_or_else(|| CommandError::UnknownQuickAction(arg.to_string()))?;
            Command::Ask(action)
        }
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}
