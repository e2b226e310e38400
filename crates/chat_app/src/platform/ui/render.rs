use std::fmt::Write as _;

use chat_core::{AuthState, CandidateView, SessionView, UserNotice};

use super::chat_log::{ChatMessage, Role};

const PROGRESS_BAR_WIDTH: usize = 20;

pub fn auth_state_label(state: AuthState) -> &'static str {
    match state {
        AuthState::Unauthenticated => "Disconnected",
        AuthState::Connecting => "Connecting",
        AuthState::Authenticating => "Authenticating",
        AuthState::Ready => "Connected",
        AuthState::Failed => "Connection failed",
    }
}

pub fn message_line(message: &ChatMessage) -> String {
    let who = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    format!(
        "[{}] {}: {}",
        message.timestamp.format("%H:%M:%S"),
        who,
        message.content
    )
}

pub fn notice_line(notice: &UserNotice) -> String {
    format!("! {}", notice.text())
}

/// Lines describing what changed between two renders of the session.
pub fn changes(previous: &SessionView, next: &SessionView) -> Vec<String> {
    let mut lines = Vec::new();

    if previous.auth_state != next.auth_state {
        let mut line = format!("* {}", auth_state_label(next.auth_state));
        if next.auth_state == AuthState::Ready {
            if let Some(name) = next.user.as_ref().and_then(|user| user.name.as_deref()) {
                let _ = write!(line, " as {name}");
            }
        }
        if let Some(error) = next.last_error {
            if next.auth_state != AuthState::Ready {
                let _ = write!(line, " ({error})");
            }
        }
        lines.push(line);
    }
    if next.reconnect_pending && !previous.reconnect_pending {
        lines.push("* Reconnecting shortly".to_string());
    }
    if next.language != previous.language {
        lines.push(format!("* Language set to {}", next.language));
    }
    if next.assistant_typing && !previous.assistant_typing {
        lines.push("assistant is typing...".to_string());
    }
    if next.candidate != previous.candidate {
        if let Some(candidate) = &next.candidate {
            lines.push(candidate_panel(candidate));
        }
    }
    lines
}

pub fn status(view: &SessionView, messages: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "session:  {}", auth_state_label(view.auth_state));
    let _ = writeln!(out, "language: {}", view.language);
    if let Some(user) = &view.user {
        let who = user
            .name
            .as_deref()
            .or(user.email.as_deref())
            .unwrap_or("unknown user");
        let _ = writeln!(out, "user:     {who}");
    }
    if let Some(error) = view.last_error {
        let _ = writeln!(out, "error:    {error}");
    }
    if view.reconnect_pending {
        let _ = writeln!(out, "reconnect pending");
    }
    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "{}", notice_line(notice));
    }
    let _ = writeln!(out, "messages: {messages}");
    match &view.candidate {
        Some(candidate) => out.push_str(&candidate_panel(candidate)),
        None => out.push_str("no candidate data"),
    }
    out
}

pub fn candidate_panel(view: &CandidateView) -> String {
    let mut out = String::new();
    let name = view.name.as_deref().unwrap_or("Candidate");
    let _ = write!(out, "== {name}");
    if let Some(status) = &view.status {
        let _ = write!(out, " ({status})");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", progress_bar(view.progress_percent));

    for stage in &view.stages {
        let marker = if stage.active {
            ">"
        } else if stage.completed {
            "x"
        } else {
            " "
        };
        let _ = writeln!(out, "  [{marker}] {}", stage.label);
    }

    if !view.documents.is_empty() {
        let _ = writeln!(out, "documents:");
        for doc in &view.documents {
            let _ = writeln!(out, "  {} - {}", doc.name, doc.status_label);
        }
    }
    if !view.tasks.is_empty() {
        let _ = writeln!(out, "tasks:");
        for task in &view.tasks {
            let check = if task.completed { "x" } else { " " };
            let _ = write!(out, "  [{check}] {}", task.title);
            if let Some(due) = &task.due_date {
                let _ = write!(out, " (due {due})");
            }
            let _ = writeln!(out);
        }
    }
    if let Some(upcoming) = &view.upcoming {
        let _ = write!(out, "next: {}", upcoming.title);
        if let Some(date) = &upcoming.date {
            let _ = write!(out, " on {date}");
        }
        if let Some(location) = &upcoming.location {
            let _ = write!(out, " at {location}");
        }
        let _ = writeln!(out);
    }
    if let Some(recruiter) = &view.recruiter {
        let _ = write!(out, "recruiter: {}", recruiter.name);
        if let Some(title) = &recruiter.title {
            let _ = write!(out, ", {title}");
        }
        if let Some(email) = &recruiter.email {
            let _ = write!(out, " <{email}>");
        }
        let _ = writeln!(out);
    }
    out.trim_end().to_string()
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * PROGRESS_BAR_WIDTH / 100;
    format!(
        "[{}{}] {percent}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}
