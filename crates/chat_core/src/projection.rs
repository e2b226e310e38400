use crate::candidate::{CandidateSnapshot, DocumentStatus, Stage};
use crate::view_model::{
    CandidateView, DocumentRow, RecruiterPanel, StageRow, TaskRow, UpcomingPanel,
};

/// Pure derivation of candidate UI aggregates. Same snapshot in, same view out.
pub fn project(snapshot: &CandidateSnapshot) -> CandidateView {
    let current = snapshot.stage.as_deref().and_then(Stage::from_label);
    let stage_index = current.map(Stage::index);

    let stages = Stage::ALL
        .iter()
        .map(|stage| StageRow {
            label: stage.label(),
            completed: stage_index.is_some_and(|active| stage.index() < active),
            active: stage_index == Some(stage.index()),
        })
        .collect();

    let progress_percent = match snapshot.progress_percent {
        Some(percent) => percent.clamp(0, 100) as u8,
        None => progress_for_stage(stage_index),
    };

    CandidateView {
        name: snapshot.name.clone(),
        status: snapshot.status.clone(),
        stage_index,
        progress_percent,
        stages,
        documents: snapshot
            .documents
            .iter()
            .map(|doc| DocumentRow {
                name: doc.name.clone(),
                status_label: status_label(doc.status),
                uploaded: doc.status == DocumentStatus::Uploaded,
            })
            .collect(),
        tasks: snapshot
            .tasks
            .iter()
            .map(|task| TaskRow {
                title: task.title.clone(),
                description: task.description.clone(),
                due_date: task.due_date.clone(),
                completed: task.completed,
            })
            .collect(),
        recruiter: snapshot.recruiter.as_ref().map(|recruiter| RecruiterPanel {
            name: recruiter.name.clone(),
            title: recruiter.title.clone(),
            email: recruiter.email.clone(),
        }),
        upcoming: snapshot.upcoming.as_ref().map(|event| UpcomingPanel {
            title: event.title.clone(),
            date: event.date.clone(),
            location: event.location.clone(),
        }),
    }
}

pub fn status_label(status: DocumentStatus) -> &'static str {
    match status {
        DocumentStatus::Uploaded => "Uploaded",
        DocumentStatus::Pending => "Pending",
        DocumentStatus::Other => "Unknown",
    }
}

fn progress_for_stage(stage_index: Option<usize>) -> u8 {
    match stage_index {
        Some(index) => ((index + 1) * 100 / Stage::ALL.len()) as u8,
        None => 0,
    }
}
