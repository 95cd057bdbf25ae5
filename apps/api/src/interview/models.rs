//! Data model for one interview run.
//!
//! Everything here is transient: held in memory for the duration of a run
//! and discarded (or exported as a transcript) when it ends. The engine is
//! the sole writer of the conversation history; interactive callers hold the
//! continuation state between turns and pass it back verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interview::phase::Phase;

/// The five interviewer personas. Each has a distinct knowledge boundary,
/// tone, and negotiation behavior — see `roles.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewerRole {
    Ta,
    Peers,
    Leader,
    Director,
    Hrbp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewMode {
    Simulation,
    Interactive,
}

/// Immutable once an interview starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSettings {
    pub total_rounds: u32,
    pub interviewer_role: InterviewerRole,
    pub mode: InterviewMode,
}

/// Optional free-text description of the candidate's real negotiating
/// position. Only enriches hrbp/closing prompts; absence is the common case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplementInfo {
    #[serde(default)]
    pub current_salary: Option<String>,
    #[serde(default)]
    pub expected_salary: Option<String>,
    #[serde(default)]
    pub available_time: Option<String>,
    #[serde(default)]
    pub other_info: Option<String>,
}

impl SupplementInfo {
    pub fn is_empty(&self) -> bool {
        self.current_salary.is_none()
            && self.expected_salary.is_none()
            && self.available_time.is_none()
            && self.other_info.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Interviewer,
    Interviewee,
}

/// One finalized utterance in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub content: String,
}

impl ConversationTurn {
    pub fn interviewer(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Interviewer,
            content: content.into(),
        }
    }

    pub fn interviewee(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Interviewee,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    System,
    Round,
    Interviewer,
    Interviewee,
    Summary,
    Error,
}

/// The unit emitted to the caller's message sink.
///
/// A message with `is_streaming == true` is the same logical message as a
/// later non-streaming message of the same type and streaming run: each
/// update carries the full accumulated text so far, and the caller replaces
/// its previous partial entry rather than appending duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    pub is_streaming: bool,
    /// Follow-up questions split off the final evaluation output. Present
    /// only on the finalized summary message, and only when the model
    /// emitted the sentinel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl InterviewMessage {
    pub fn streaming(
        kind: MessageType,
        content: impl Into<String>,
        round: Option<u32>,
        phase: Option<Phase>,
    ) -> Self {
        Self {
            kind,
            content: content.into(),
            round,
            phase,
            is_streaming: true,
            suggestions: None,
            timestamp: Utc::now(),
        }
    }

    pub fn finished(
        kind: MessageType,
        content: impl Into<String>,
        round: Option<u32>,
        phase: Option<Phase>,
    ) -> Self {
        Self {
            kind,
            content: content.into(),
            round,
            phase,
            is_streaming: false,
            suggestions: None,
            timestamp: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::finished(MessageType::System, content, None, None)
    }

    pub fn round_marker(round: u32, total_rounds: u32, phase: Phase) -> Self {
        Self::finished(
            MessageType::Round,
            format!("Round {round}/{total_rounds} - {}", phase.label()),
            Some(round),
            Some(phase),
        )
    }
}

/// The serializable continuation token for interactive mode.
///
/// Created after the first interviewer turn, returned to the caller, and
/// passed back verbatim (plus one new answer) to resume. The engine holds no
/// hidden session state between turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractiveInterviewState {
    pub resume: String,
    pub job_description: String,
    pub settings: InterviewSettings,
    pub conversation_history: Vec<ConversationTurn>,
    pub current_round: u32,
    pub is_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplement_info: Option<SupplementInfo>,
}

/// Caller-facing callback interface for one interview run.
///
/// `on_message` fires one or more times per turn while text streams, then
/// once with the finalized message. `on_complete` fires exactly once, only
/// on full successful completion. `on_error` fires at most once and
/// terminates the run. `on_waiting_for_input` fires in interactive mode when
/// the caller should collect a human answer.
pub trait InterviewSink: Send + Sync {
    fn on_message(&self, message: InterviewMessage);
    fn on_complete(&self);
    fn on_error(&self, error: &str);
    fn on_waiting_for_input(&self, _round: u32, _phase: Phase) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip() {
        let settings = InterviewSettings {
            total_rounds: 5,
            interviewer_role: InterviewerRole::Hrbp,
            mode: InterviewMode::Interactive,
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"hrbp\""));
        assert!(json.contains("\"interactive\""));
        let back: InterviewSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total_rounds, 5);
        assert_eq!(back.interviewer_role, InterviewerRole::Hrbp);
    }

    #[test]
    fn test_message_serializes_type_field() {
        let message = InterviewMessage::system("Interview started");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "system");
        assert_eq!(value["is_streaming"], false);
        assert!(value.get("round").is_none());
        assert!(value.get("suggestions").is_none());
    }

    #[test]
    fn test_interactive_state_round_trips_verbatim() {
        let state = InteractiveInterviewState {
            resume: "résumé".to_string(),
            job_description: "jd".to_string(),
            settings: InterviewSettings {
                total_rounds: 3,
                interviewer_role: InterviewerRole::Peers,
                mode: InterviewMode::Interactive,
            },
            conversation_history: vec![ConversationTurn::interviewer("Tell me about yourself.")],
            current_round: 1,
            is_complete: false,
            supplement_info: None,
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: InteractiveInterviewState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.current_round, 1);
        assert!(!back.is_complete);
        assert_eq!(back.conversation_history.len(), 1);
        assert_eq!(back.conversation_history[0].speaker, Speaker::Interviewer);
    }

    #[test]
    fn test_supplement_info_emptiness() {
        assert!(SupplementInfo::default().is_empty());
        let supplement = SupplementInfo {
            expected_salary: Some("around 40k/month".to_string()),
            ..Default::default()
        };
        assert!(!supplement.is_empty());
    }
}
