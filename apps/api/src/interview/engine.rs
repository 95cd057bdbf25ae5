//! Turn engine — the phase-driven, role-parameterized, turn-taking state
//! machine for one interview run.
//!
//! Simulation mode: one autonomous loop, interviewer turn then simulated
//! candidate turn per round, then the evaluation.
//! Interactive mode: suspend after each interviewer turn; the caller holds
//! the `InteractiveInterviewState` continuation token and resumes via
//! `submit_answer`.
//!
//! Cancellation is cooperative: the token is checked before every generation
//! call and inside every chunk loop, so an abandoned run never emits after a
//! reset. Streaming messages re-emit the full accumulated text on every
//! chunk; the caller replaces, not appends.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::interview::evaluation::split_evaluation;
use crate::interview::models::{
    ConversationTurn, InteractiveInterviewState, InterviewMessage, InterviewSettings,
    InterviewSink, MessageType, SupplementInfo,
};
use crate::interview::phase::{phase_of, Phase};
use crate::interview::prompts::{
    build_candidate_prompt, build_evaluation_prompt, build_feedback_prompt,
    build_question_prompt, PromptContext, CANDIDATE_TEMPERATURE, EVALUATION_SYSTEM,
    EVALUATION_TEMPERATURE, INTERVIEWER_TEMPERATURE,
};
use crate::interview::retry::stream_with_retry;
use crate::interview::roles::role_config;
use crate::interview::InterviewError;
use crate::llm_client::{GenerationRequest, GenerationService, LlmError};

const QUESTION_USER_CONTENT: &str =
    "Ask your question for the current stage of the interview.";
const FEEDBACK_USER_CONTENT: &str =
    "Comment briefly on the candidate's answer, then ask your next question.";
const STOPPED_NOTICE: &str = "Interview stopped";
const FINISHED_NOTICE: &str = "Interview finished";

/// How one run ended, cancellation being a terminal outcome rather than an
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Stopped,
}

// ────────────────────────────────────────────────────────────────────────────
// Simulation mode
// ────────────────────────────────────────────────────────────────────────────

/// Runs a fully autonomous interview: both sides generated, no suspension.
///
/// Emits exactly one `stopped` system message if cancelled (no matter how
/// many times or where the token was observed), routes fatal errors through
/// `on_error` exactly once, and calls `on_complete` only on full success.
pub async fn run_simulation(
    llm: &dyn GenerationService,
    sink: &dyn InterviewSink,
    cancel: &CancellationToken,
    resume: &str,
    job_description: &str,
    settings: &InterviewSettings,
    supplement: Option<&SupplementInfo>,
) -> Result<RunOutcome, InterviewError> {
    match simulate_inner(llm, sink, cancel, resume, job_description, settings, supplement).await {
        Ok(()) => Ok(RunOutcome::Completed),
        Err(InterviewError::Cancelled) => {
            sink.on_message(InterviewMessage::system(STOPPED_NOTICE));
            info!("simulation run stopped by cancellation");
            Ok(RunOutcome::Stopped)
        }
        Err(e) => {
            warn!("simulation run failed: {e}");
            sink.on_error(&e.to_string());
            Err(e)
        }
    }
}

async fn simulate_inner(
    llm: &dyn GenerationService,
    sink: &dyn InterviewSink,
    cancel: &CancellationToken,
    resume: &str,
    job_description: &str,
    settings: &InterviewSettings,
    supplement: Option<&SupplementInfo>,
) -> Result<(), InterviewError> {
    validate_settings(settings)?;
    let total = settings.total_rounds;
    let role = role_config(settings.interviewer_role);

    sink.on_message(InterviewMessage::system(format!(
        "Interview started: {total} rounds"
    )));

    let mut history: Vec<ConversationTurn> = Vec::new();

    for round in 1..=total {
        if cancel.is_cancelled() {
            return Err(InterviewError::Cancelled);
        }
        let phase = phase_of(round, total);
        sink.on_message(InterviewMessage::round_marker(round, total, phase));

        // 1. Interviewer asks.
        let question_prompt = build_question_prompt(
            &PromptContext {
                resume,
                job_description,
                round,
                total_rounds: total,
                phase,
                role,
                history: &history,
                supplement,
            },
            false,
        );
        let question = stream_turn(
            llm,
            sink,
            cancel,
            MessageType::Interviewer,
            Some(round),
            Some(phase),
            question_prompt,
            QUESTION_USER_CONTENT.to_string(),
            INTERVIEWER_TEMPERATURE,
        )
        .await?;
        sink.on_message(InterviewMessage::finished(
            MessageType::Interviewer,
            question.clone(),
            Some(round),
            Some(phase),
        ));
        history.push(ConversationTurn::interviewer(question.clone()));

        if cancel.is_cancelled() {
            return Err(InterviewError::Cancelled);
        }

        // 2. Simulated candidate answers; its prompt depends on the
        //    completed question text, so the calls are strictly sequential.
        let candidate_prompt = build_candidate_prompt(&PromptContext {
            resume,
            job_description,
            round,
            total_rounds: total,
            phase,
            role,
            history: &history,
            supplement,
        });
        let answer = stream_turn(
            llm,
            sink,
            cancel,
            MessageType::Interviewee,
            Some(round),
            Some(phase),
            candidate_prompt,
            format!("Interviewer's question:\n{question}\n\nAnswer it as the candidate."),
            CANDIDATE_TEMPERATURE,
        )
        .await?;
        sink.on_message(InterviewMessage::finished(
            MessageType::Interviewee,
            answer.clone(),
            Some(round),
            Some(phase),
        ));
        history.push(ConversationTurn::interviewee(answer));
    }

    if cancel.is_cancelled() {
        return Err(InterviewError::Cancelled);
    }

    run_evaluation(llm, sink, cancel, resume, job_description, &history, settings, false).await?;

    sink.on_message(InterviewMessage::system(FINISHED_NOTICE));
    sink.on_complete();
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Interactive mode
// ────────────────────────────────────────────────────────────────────────────

/// Starts an interactive interview: runs round 1's opening question only and
/// returns the continuation state, marked awaiting an answer.
///
/// Returns `Ok(None)` when the run was cancelled (one `stopped` system
/// message emitted). Fatal errors are surfaced through `on_error` and
/// returned.
pub async fn begin_interview(
    llm: &dyn GenerationService,
    sink: &dyn InterviewSink,
    cancel: &CancellationToken,
    resume: &str,
    job_description: &str,
    settings: &InterviewSettings,
    supplement: Option<&SupplementInfo>,
) -> Result<Option<InteractiveInterviewState>, InterviewError> {
    validate_settings(settings)?;
    match begin_inner(llm, sink, cancel, resume, job_description, settings, supplement).await {
        Ok(state) => Ok(Some(state)),
        Err(InterviewError::Cancelled) => {
            sink.on_message(InterviewMessage::system(STOPPED_NOTICE));
            Ok(None)
        }
        Err(e) => {
            warn!("interactive begin failed: {e}");
            sink.on_error(&e.to_string());
            Err(e)
        }
    }
}

async fn begin_inner(
    llm: &dyn GenerationService,
    sink: &dyn InterviewSink,
    cancel: &CancellationToken,
    resume: &str,
    job_description: &str,
    settings: &InterviewSettings,
    supplement: Option<&SupplementInfo>,
) -> Result<InteractiveInterviewState, InterviewError> {
    let total = settings.total_rounds;
    let role = role_config(settings.interviewer_role);
    let round = 1;
    let phase = phase_of(round, total);

    sink.on_message(InterviewMessage::system(format!(
        "Interactive interview started: {total} rounds. Answer each question in your own words."
    )));
    sink.on_message(InterviewMessage::round_marker(round, total, phase));

    let prompt = build_question_prompt(
        &PromptContext {
            resume,
            job_description,
            round,
            total_rounds: total,
            phase,
            role,
            history: &[],
            supplement,
        },
        true,
    );
    let question = stream_turn(
        llm,
        sink,
        cancel,
        MessageType::Interviewer,
        Some(round),
        Some(phase),
        prompt,
        QUESTION_USER_CONTENT.to_string(),
        INTERVIEWER_TEMPERATURE,
    )
    .await?;
    sink.on_message(InterviewMessage::finished(
        MessageType::Interviewer,
        question.clone(),
        Some(round),
        Some(phase),
    ));

    sink.on_waiting_for_input(round, phase);

    Ok(InteractiveInterviewState {
        resume: resume.to_string(),
        job_description: job_description.to_string(),
        settings: settings.clone(),
        conversation_history: vec![ConversationTurn::interviewer(question)],
        current_round: round,
        is_complete: false,
        supplement_info: supplement.cloned(),
    })
}

/// Resumes an interactive interview with the human's answer.
///
/// Appends the answer, then either produces the feedback + next question for
/// `current_round + 1`, or, when rounds are exhausted, the final evaluation
/// with `is_complete = true`. Calling this on a completed state is a
/// precondition violation and fails fast without touching the sink.
pub async fn submit_answer(
    llm: &dyn GenerationService,
    sink: &dyn InterviewSink,
    cancel: &CancellationToken,
    state: InteractiveInterviewState,
    answer: &str,
) -> Result<Option<InteractiveInterviewState>, InterviewError> {
    if state.is_complete {
        return Err(InterviewError::InvalidState(
            "interview is already complete".to_string(),
        ));
    }
    if answer.trim().is_empty() {
        return Err(InterviewError::InvalidState(
            "answer must not be empty".to_string(),
        ));
    }

    match submit_inner(llm, sink, cancel, state, answer).await {
        Ok(next) => Ok(Some(next)),
        Err(InterviewError::Cancelled) => {
            sink.on_message(InterviewMessage::system(STOPPED_NOTICE));
            Ok(None)
        }
        Err(e) => {
            warn!("interactive turn failed: {e}");
            sink.on_error(&e.to_string());
            Err(e)
        }
    }
}

async fn submit_inner(
    llm: &dyn GenerationService,
    sink: &dyn InterviewSink,
    cancel: &CancellationToken,
    mut state: InteractiveInterviewState,
    answer: &str,
) -> Result<InteractiveInterviewState, InterviewError> {
    let total = state.settings.total_rounds;

    sink.on_message(InterviewMessage::finished(
        MessageType::Interviewee,
        answer,
        Some(state.current_round),
        Some(phase_of(state.current_round, total)),
    ));
    state
        .conversation_history
        .push(ConversationTurn::interviewee(answer));

    let next_round = state.current_round + 1;

    // Rounds exhausted: synthesize the evaluation over the full history.
    if next_round > total {
        if cancel.is_cancelled() {
            return Err(InterviewError::Cancelled);
        }
        run_evaluation(
            llm,
            sink,
            cancel,
            &state.resume,
            &state.job_description,
            &state.conversation_history,
            &state.settings,
            true,
        )
        .await?;
        sink.on_message(InterviewMessage::system(FINISHED_NOTICE));
        sink.on_complete();

        state.current_round = next_round;
        state.is_complete = true;
        return Ok(state);
    }

    let phase = phase_of(next_round, total);
    sink.on_message(InterviewMessage::round_marker(next_round, total, phase));

    let prompt = build_feedback_prompt(
        &PromptContext {
            resume: &state.resume,
            job_description: &state.job_description,
            round: next_round,
            total_rounds: total,
            phase,
            role: role_config(state.settings.interviewer_role),
            history: &state.conversation_history,
            supplement: state.supplement_info.as_ref(),
        },
        answer,
    );
    let reply = stream_turn(
        llm,
        sink,
        cancel,
        MessageType::Interviewer,
        Some(next_round),
        Some(phase),
        prompt,
        FEEDBACK_USER_CONTENT.to_string(),
        INTERVIEWER_TEMPERATURE,
    )
    .await?;
    sink.on_message(InterviewMessage::finished(
        MessageType::Interviewer,
        reply.clone(),
        Some(next_round),
        Some(phase),
    ));
    state
        .conversation_history
        .push(ConversationTurn::interviewer(reply));

    sink.on_waiting_for_input(next_round, phase);

    state.current_round = next_round;
    Ok(state)
}

// ────────────────────────────────────────────────────────────────────────────
// Shared turn plumbing
// ────────────────────────────────────────────────────────────────────────────

/// Streams one generation call, re-emitting the full accumulated text as a
/// streaming message on every chunk. Returns the final text; the caller
/// emits the finalized message (the evaluation path decorates it first).
async fn stream_turn(
    llm: &dyn GenerationService,
    sink: &dyn InterviewSink,
    cancel: &CancellationToken,
    kind: MessageType,
    round: Option<u32>,
    phase: Option<Phase>,
    system_instruction: String,
    user_content: String,
    temperature: f32,
) -> Result<String, InterviewError> {
    use futures_util::StreamExt;

    sink.on_message(InterviewMessage::streaming(kind, "", round, phase));

    let request = GenerationRequest {
        system_instruction,
        user_content,
        temperature,
    };
    let mut stream = stream_with_retry(|| llm.stream_generate(request.clone()), cancel).await?;

    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        if cancel.is_cancelled() {
            return Err(InterviewError::Cancelled);
        }
        text.push_str(&chunk?);
        sink.on_message(InterviewMessage::streaming(kind, text.clone(), round, phase));
    }

    if text.is_empty() {
        return Err(InterviewError::Llm(LlmError::EmptyContent));
    }
    Ok(text)
}

/// Streams the evaluation, splits it on the sentinel, and emits the
/// finalized summary message carrying the report plus optional suggestions.
#[allow(clippy::too_many_arguments)]
async fn run_evaluation(
    llm: &dyn GenerationService,
    sink: &dyn InterviewSink,
    cancel: &CancellationToken,
    resume: &str,
    job_description: &str,
    history: &[ConversationTurn],
    settings: &InterviewSettings,
    interactive: bool,
) -> Result<(), InterviewError> {
    let role = role_config(settings.interviewer_role);
    let prompt = build_evaluation_prompt(job_description, resume, history, role, interactive);

    let raw = stream_turn(
        llm,
        sink,
        cancel,
        MessageType::Summary,
        None,
        None,
        EVALUATION_SYSTEM.to_string(),
        prompt,
        EVALUATION_TEMPERATURE,
    )
    .await?;

    let (report, suggestions) = split_evaluation(&raw);
    let mut message = InterviewMessage::finished(MessageType::Summary, report, None, None);
    message.suggestions = suggestions;
    sink.on_message(message);
    Ok(())
}

fn validate_settings(settings: &InterviewSettings) -> Result<(), InterviewError> {
    if settings.total_rounds == 0 {
        return Err(InterviewError::InvalidState(
            "total_rounds must be at least 1".to_string(),
        ));
    }
    Ok(())
}
