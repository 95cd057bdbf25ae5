//! Transcript export — renders the finalized message log as a standalone
//! markdown document. Streaming partials are skipped; the finalized message
//! of each turn is the one that renders.

use chrono::Utc;

use crate::interview::models::{InterviewMessage, InterviewMode, MessageType};

/// Renders the transcript as markdown. `candidate` is an optional display
/// label for the header; messages still streaming are skipped.
pub fn export_transcript(
    messages: &[InterviewMessage],
    mode: InterviewMode,
    candidate: Option<&str>,
) -> String {
    let mode_label = match mode {
        InterviewMode::Simulation => "Simulation",
        InterviewMode::Interactive => "Interactive",
    };

    let mut out = String::new();
    out.push_str("# Mock Interview Transcript\n\n");
    out.push_str(&format!("**Date:** {}\n\n", Utc::now().format("%Y-%m-%d")));
    out.push_str(&format!("**Mode:** {mode_label}\n\n"));
    if let Some(name) = candidate {
        out.push_str(&format!("**Candidate:** {name}\n\n"));
    }
    out.push_str("---\n\n");

    for message in messages.iter().filter(|m| !m.is_streaming) {
        match message.kind {
            MessageType::System => {
                out.push_str(&format!("> 📌 {}\n\n", message.content));
            }
            MessageType::Round => {
                out.push_str(&format!("## {}\n\n", message.content));
            }
            MessageType::Interviewer => {
                out.push_str(&format!("### 🎤 Interviewer\n\n{}\n\n", message.content));
            }
            MessageType::Interviewee => {
                out.push_str(&format!("### 👤 Candidate\n\n{}\n\n", message.content));
            }
            MessageType::Summary => {
                out.push_str(&format!(
                    "---\n\n## 📊 Interview Evaluation\n\n{}\n\n",
                    message.content
                ));
                if let Some(suggestions) = &message.suggestions {
                    out.push_str(&format!(
                        "### Suggested Questions to Ask\n\n{suggestions}\n\n"
                    ));
                }
            }
            MessageType::Error => {
                out.push_str(&format!("> ⚠️ {}\n\n", message.content));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::phase::Phase;

    #[test]
    fn test_export_orders_sections_and_skips_streaming() {
        let mut summary =
            InterviewMessage::finished(MessageType::Summary, "Overall strong.", None, None);
        summary.suggestions = Some("1. Team structure?".to_string());
        let messages = vec![
            InterviewMessage::system("Interview started: 1 rounds"),
            InterviewMessage::round_marker(1, 1, Phase::Opening),
            InterviewMessage::streaming(MessageType::Interviewer, "partial", Some(1), None),
            InterviewMessage::finished(
                MessageType::Interviewer,
                "Tell me about yourself.",
                Some(1),
                Some(Phase::Opening),
            ),
            InterviewMessage::finished(
                MessageType::Interviewee,
                "I am a backend engineer.",
                Some(1),
                Some(Phase::Opening),
            ),
            summary,
        ];

        let md = export_transcript(&messages, InterviewMode::Simulation, Some("Jane"));
        assert!(md.starts_with("# Mock Interview Transcript"));
        assert!(md.contains("**Mode:** Simulation"));
        assert!(md.contains("**Candidate:** Jane"));
        assert!(md.contains("## Round 1/1 - Opening"));
        assert!(md.contains("### 🎤 Interviewer\n\nTell me about yourself."));
        assert!(md.contains("### 👤 Candidate\n\nI am a backend engineer."));
        assert!(md.contains("## 📊 Interview Evaluation\n\nOverall strong."));
        assert!(md.contains("### Suggested Questions to Ask\n\n1. Team structure?"));
        assert!(!md.contains("partial"));
    }

    #[test]
    fn test_export_without_candidate_or_suggestions() {
        let messages = vec![
            InterviewMessage::system("Interview stopped"),
            InterviewMessage::finished(MessageType::Error, "generation failed", None, None),
        ];
        let md = export_transcript(&messages, InterviewMode::Interactive, None);
        assert!(!md.contains("**Candidate:**"));
        assert!(md.contains("> 📌 Interview stopped"));
        assert!(md.contains("> ⚠️ generation failed"));
        assert!(!md.contains("Suggested Questions"));
    }
}
