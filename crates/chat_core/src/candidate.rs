//! Candidate pipeline data as delivered by `GET /api/candidate-data`.
//!
//! The wire body is loose (nulls, missing keys and empty strings all occur), so
//! it is decoded into private wire structs and normalized into
//! [`CandidateSnapshot`], where every optional field is either `Some` with
//! real content or `None`.
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ApplicationReview,
    CandidateInterview,
    LanguageAssessment,
    BackgroundVerification,
    ContractSetup,
    TrainingRequired,
    ClientToolOrientation,
    ReadyForProduction,
}

impl Stage {
    /// Pipeline order.
    pub const ALL: [Stage; 8] = [
        Stage::ApplicationReview,
        Stage::CandidateInterview,
        Stage::LanguageAssessment,
        Stage::BackgroundVerification,
        Stage::ContractSetup,
        Stage::TrainingRequired,
        Stage::ClientToolOrientation,
        Stage::ReadyForProduction,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stage::ApplicationReview => "Application Review",
            Stage::CandidateInterview => "Candidate Interview",
            Stage::LanguageAssessment => "Candidate Language Assessment",
            Stage::BackgroundVerification => "Candidate ID/Background Verification",
            Stage::ContractSetup => "Contract & Payment Setup",
            Stage::TrainingRequired => "Training Required",
            Stage::ClientToolOrientation => "Client Tool Orientation",
            Stage::ReadyForProduction => "Interpreter Ready for Production",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Exact-match lookup. Unknown keys are not an error, just no stage.
    pub fn from_label(label: &str) -> Option<Stage> {
        Stage::ALL.iter().copied().find(|stage| stage.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Uploaded,
    Pending,
    Other,
}

impl DocumentStatus {
    fn from_wire(raw: Option<&str>) -> Self {
        match raw {
            Some("uploaded") => DocumentStatus::Uploaded,
            Some("pending") => DocumentStatus::Pending,
            _ => DocumentStatus::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub status: DocumentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingEvent {
    pub title: String,
    pub date: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recruiter {
    pub name: String,
    pub title: Option<String>,
    pub email: Option<String>,
}

/// Latest candidate data. Replaced wholesale on every successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidateSnapshot {
    pub name: Option<String>,
    pub email: Option<String>,
    pub language: Option<String>,
    /// Raw stage key; may be outside the known vocabulary.
    pub stage: Option<String>,
    pub status: Option<String>,
    pub progress_percent: Option<i64>,
    pub documents: Vec<Document>,
    pub tasks: Vec<Task>,
    pub upcoming: Option<UpcomingEvent>,
    pub recruiter: Option<Recruiter>,
}

impl CandidateSnapshot {
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        let wire: WireSnapshot = serde_json::from_slice(body)?;
        Ok(wire.into_snapshot())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireSnapshot {
    name: Option<String>,
    email: Option<String>,
    language: Option<String>,
    stage: Option<String>,
    status: Option<String>,
    progress_percent: Option<serde_json::Number>,
    upcoming: Option<WireUpcoming>,
    tasks: Option<Vec<WireTask>>,
    documents: Option<Vec<WireDocument>>,
    recruiter: Option<WireRecruiter>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireUpcoming {
    title: Option<String>,
    date: Option<String>,
    location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireTask {
    id: Option<serde_json::Value>,
    title: Option<String>,
    description: Option<String>,
    due_date: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    completed: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireDocument {
    name: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireRecruiter {
    name: Option<String>,
    title: Option<String>,
    email: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

impl WireSnapshot {
    fn into_snapshot(self) -> CandidateSnapshot {
        CandidateSnapshot {
            name: present(self.name),
            email: present(self.email),
            language: present(self.language),
            stage: present(self.stage),
            status: present(self.status),
            progress_percent: self.progress_percent.and_then(|n| {
                n.as_i64()
                    .or_else(|| n.as_f64().map(|value| value.trunc() as i64))
            }),
            documents: self
                .documents
                .unwrap_or_default()
                .into_iter()
                .filter_map(|doc| {
                    let status = DocumentStatus::from_wire(doc.status.as_deref());
                    present(doc.name).map(|name| Document { name, status })
                })
                .collect(),
            tasks: self
                .tasks
                .unwrap_or_default()
                .into_iter()
                .map(|task| Task {
                    id: task.id.and_then(|id| match id {
                        serde_json::Value::String(text) => present(Some(text)),
                        serde_json::Value::Number(number) => Some(number.to_string()),
                        _ => None,
                    }),
                    title: present(task.title).unwrap_or_else(|| "Untitled Task".to_string()),
                    description: present(task.description),
                    due_date: present(task.due_date),
                    priority: present(task.priority),
                    status: present(task.status),
                    completed: task.completed.unwrap_or(false),
                })
                .collect(),
            upcoming: self.upcoming.and_then(|upcoming| {
                present(upcoming.title).map(|title| UpcomingEvent {
                    title,
                    date: present(upcoming.date),
                    location: present(upcoming.location),
                })
            }),
            recruiter: self.recruiter.and_then(|recruiter| {
                present(recruiter.name).map(|name| Recruiter {
                    name,
                    title: present(recruiter.title),
                    email: present(recruiter.email),
                })
            }),
        }
    }
}
