use crate::envelope::AuthenticatedUser;
use crate::{AuthState, Language, SessionErrorKind, UserNotice};

/// Read-only projection of the session handed to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionView {
    pub auth_state: AuthState,
    pub language: Language,
    pub last_error: Option<SessionErrorKind>,
    pub user: Option<AuthenticatedUser>,
    pub assistant_typing: bool,
    pub reconnect_pending: bool,
    pub notice: Option<UserNotice>,
    pub candidate: Option<CandidateView>,
    pub dirty: bool,
}

/// UI aggregates derived from a candidate snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidateView {
    pub name: Option<String>,
    pub status: Option<String>,
    /// Position of the current stage; `None` when the stage is unknown or absent.
    pub stage_index: Option<usize>,
    pub progress_percent: u8,
    pub stages: Vec<StageRow>,
    pub documents: Vec<DocumentRow>,
    pub tasks: Vec<TaskRow>,
    pub recruiter: Option<RecruiterPanel>,
    pub upcoming: Option<UpcomingPanel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRow {
    pub label: &'static str,
    pub completed: bool,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRow {
    pub name: String,
    pub status_label: &'static str,
    pub uploaded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecruiterPanel {
    pub name: String,
    pub title: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingPanel {
    pub title: String,
    pub date: Option<String>,
    pub location: Option<String>,
}
