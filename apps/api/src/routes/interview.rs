//! Interview API handlers.
//!
//! The generating endpoints (`simulate`, `begin`, `answer`) respond with an
//! SSE stream: the engine runs in a spawned task and forwards every sink
//! callback over a channel, so partial text reaches the client as it is
//! generated. `cancel` flips the session's token; the running task observes
//! it at the next checkpoint and closes its own stream.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::stream::Stream;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::engine::{begin_interview, run_simulation, submit_answer};
use crate::interview::export::export_transcript;
use crate::interview::models::{
    InteractiveInterviewState, InterviewMessage, InterviewMode, InterviewSettings, InterviewSink,
    SupplementInfo,
};
use crate::interview::phase::Phase;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    /// Client-chosen session id; generated when absent. Reusing an id cancels
    /// the run already registered under it.
    pub session_id: Option<Uuid>,
    pub resume: String,
    pub job_description: String,
    pub settings: InterviewSettings,
    #[serde(default)]
    pub supplement_info: Option<SupplementInfo>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub session_id: Option<Uuid>,
    pub state: InteractiveInterviewState,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub messages: Vec<InterviewMessage>,
    pub mode: InterviewMode,
    #[serde(default)]
    pub candidate_label: Option<String>,
}

/// Everything the engine can tell the client, as one SSE event each.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum SinkEvent {
    Session { session_id: Uuid },
    Message(InterviewMessage),
    WaitingForInput { round: u32, phase: Phase },
    State(InteractiveInterviewState),
    Error { message: String },
    Complete,
}

impl SinkEvent {
    fn name(&self) -> &'static str {
        match self {
            SinkEvent::Session { .. } => "session",
            SinkEvent::Message(_) => "message",
            SinkEvent::WaitingForInput { .. } => "waiting_for_input",
            SinkEvent::State(_) => "state",
            SinkEvent::Error { .. } => "error",
            SinkEvent::Complete => "complete",
        }
    }

    fn into_sse(self) -> Event {
        let event = Event::default().event(self.name());
        event
            .json_data(&self)
            .unwrap_or_else(|_| Event::default().event("error").data("event serialization failed"))
    }
}

/// Sink that forwards engine callbacks over a channel to the SSE response.
/// Send failures mean the client went away; the run keeps going until its
/// token is cancelled.
struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

impl InterviewSink for ChannelSink {
    fn on_message(&self, message: InterviewMessage) {
        let _ = self.tx.send(SinkEvent::Message(message));
    }

    fn on_complete(&self) {
        let _ = self.tx.send(SinkEvent::Complete);
    }

    fn on_error(&self, error: &str) {
        let _ = self.tx.send(SinkEvent::Error {
            message: error.to_string(),
        });
    }

    fn on_waiting_for_input(&self, round: u32, phase: Phase) {
        let _ = self.tx.send(SinkEvent::WaitingForInput { round, phase });
    }
}

type EventStream = Sse<Box<dyn Stream<Item = Result<Event, Infallible>> + Send + Unpin>>;

fn sse_response(rx: mpsc::UnboundedReceiver<SinkEvent>) -> EventStream {
    let stream = UnboundedReceiverStream::new(rx).map(|event| Ok(event.into_sse()));
    Sse::new(Box::new(stream) as Box<dyn Stream<Item = Result<Event, Infallible>> + Send + Unpin>)
        .keep_alive(KeepAlive::default())
}

fn validate_inputs(resume: &str, job_description: &str) -> Result<(), AppError> {
    if resume.trim().is_empty() {
        return Err(AppError::Validation("resume must not be empty".to_string()));
    }
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/v1/interview/simulate
/// Runs a full autonomous interview, streaming every message as SSE.
pub async fn handle_simulate(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewRequest>,
) -> Result<EventStream, AppError> {
    validate_inputs(&req.resume, &req.job_description)?;

    let session = req.session_id.unwrap_or_else(Uuid::new_v4);
    let (cancel, generation) = state.sessions.begin(session);
    let (tx, rx) = mpsc::unbounded_channel();
    let _ = tx.send(SinkEvent::Session {
        session_id: session,
    });

    let llm = Arc::clone(&state.llm);
    let sessions = state.sessions.clone();
    info!(%session, rounds = req.settings.total_rounds, "starting simulation");

    tokio::spawn(async move {
        let sink = ChannelSink { tx };
        let _ = run_simulation(
            llm.as_ref(),
            &sink,
            &cancel,
            &req.resume,
            &req.job_description,
            &req.settings,
            req.supplement_info.as_ref(),
        )
        .await;
        sessions.finish(session, generation);
    });

    Ok(sse_response(rx))
}

/// POST /api/v1/interview/begin
/// Starts an interactive interview; the final SSE event carries the
/// continuation state to pass back with each answer.
pub async fn handle_begin(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewRequest>,
) -> Result<EventStream, AppError> {
    validate_inputs(&req.resume, &req.job_description)?;

    let session = req.session_id.unwrap_or_else(Uuid::new_v4);
    let (cancel, generation) = state.sessions.begin(session);
    let (tx, rx) = mpsc::unbounded_channel();
    let _ = tx.send(SinkEvent::Session {
        session_id: session,
    });

    let llm = Arc::clone(&state.llm);
    let sessions = state.sessions.clone();
    info!(%session, rounds = req.settings.total_rounds, "starting interactive interview");

    tokio::spawn(async move {
        let sink = ChannelSink { tx: tx.clone() };
        if let Ok(Some(next)) = begin_interview(
            llm.as_ref(),
            &sink,
            &cancel,
            &req.resume,
            &req.job_description,
            &req.settings,
            req.supplement_info.as_ref(),
        )
        .await
        {
            let _ = tx.send(SinkEvent::State(next));
        }
        sessions.finish(session, generation);
    });

    Ok(sse_response(rx))
}

/// POST /api/v1/interview/answer
/// Resumes an interactive interview with the candidate's answer.
pub async fn handle_answer(
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> Result<EventStream, AppError> {
    if req.answer.trim().is_empty() {
        return Err(AppError::Validation("answer must not be empty".to_string()));
    }
    if req.state.is_complete {
        return Err(AppError::Validation(
            "interview is already complete".to_string(),
        ));
    }

    let session = req.session_id.unwrap_or_else(Uuid::new_v4);
    let (cancel, generation) = state.sessions.begin(session);
    let (tx, rx) = mpsc::unbounded_channel();

    let llm = Arc::clone(&state.llm);
    let sessions = state.sessions.clone();

    tokio::spawn(async move {
        let sink = ChannelSink { tx: tx.clone() };
        if let Ok(Some(next)) =
            submit_answer(llm.as_ref(), &sink, &cancel, req.state, &req.answer).await
        {
            let _ = tx.send(SinkEvent::State(next));
        }
        sessions.finish(session, generation);
    });

    Ok(sse_response(rx))
}

/// POST /api/v1/interview/cancel
/// Stops the live run for a session. Idempotent.
pub async fn handle_cancel(
    State(state): State<AppState>,
    Json(req): Json<CancelRequest>,
) -> Json<serde_json::Value> {
    state.sessions.cancel(req.session_id);
    info!(session = %req.session_id, "cancellation requested");
    Json(json!({ "status": "cancelled" }))
}

/// POST /api/v1/interview/export
/// Renders a finalized message log as a markdown transcript.
pub async fn handle_export(
    Json(req): Json<ExportRequest>,
) -> impl axum::response::IntoResponse {
    let markdown = export_transcript(&req.messages, req.mode, req.candidate_label.as_deref());
    (
        [(CONTENT_TYPE, "text/markdown; charset=utf-8")],
        markdown,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::InterviewerRole;

    #[test]
    fn test_start_request_deserializes_with_defaults() {
        let req: StartInterviewRequest = serde_json::from_str(
            r#"{
                "resume": "my resume",
                "job_description": "backend engineer",
                "settings": {
                    "total_rounds": 5,
                    "interviewer_role": "hrbp",
                    "mode": "simulation"
                }
            }"#,
        )
        .unwrap();
        assert!(req.session_id.is_none());
        assert!(req.supplement_info.is_none());
        assert_eq!(req.settings.interviewer_role, InterviewerRole::Hrbp);
    }

    #[test]
    fn test_sink_event_names_and_payloads() {
        let event = SinkEvent::WaitingForInput {
            round: 2,
            phase: Phase::Basic,
        };
        assert_eq!(event.name(), "waiting_for_input");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["round"], 2);
        assert_eq!(value["phase"], "basic");

        let message = SinkEvent::Message(InterviewMessage::system("hello"));
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "system");
        assert_eq!(value["content"], "hello");
    }

    #[test]
    fn test_input_validation() {
        assert!(validate_inputs("resume", "jd").is_ok());
        assert!(validate_inputs("  ", "jd").is_err());
        assert!(validate_inputs("resume", "").is_err());
    }
}
