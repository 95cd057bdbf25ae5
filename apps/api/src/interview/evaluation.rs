//! Evaluation synthesizer — splits the raw closing-report output on the
//! literal sentinel into the report and the optional suggested follow-up
//! questions. No other parsing or repair is attempted: a missing sentinel or
//! partial markdown passes through as-is, a documented tolerance.

use crate::interview::prompts::EVALUATION_SENTINEL;

/// Splits raw model output into (report, suggested questions).
/// The second segment is `None` when the model omitted the sentinel or left
/// the section empty; callers should then skip rendering it.
pub fn split_evaluation(raw: &str) -> (String, Option<String>) {
    match raw.split_once(EVALUATION_SENTINEL) {
        Some((report, rest)) => {
            let rest = rest.trim();
            let suggestions = if rest.is_empty() {
                None
            } else {
                Some(rest.to_string())
            };
            (report.trim().to_string(), suggestions)
        }
        None => (raw.trim().to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_with_sentinel() {
        let raw = format!("The report body.\n{EVALUATION_SENTINEL}\n1. Ask about the roadmap.");
        let (report, suggestions) = split_evaluation(&raw);
        assert_eq!(report, "The report body.");
        assert_eq!(suggestions.as_deref(), Some("1. Ask about the roadmap."));
    }

    #[test]
    fn test_split_without_sentinel_keeps_whole_report() {
        let (report, suggestions) = split_evaluation("Just a report, no questions.");
        assert_eq!(report, "Just a report, no questions.");
        assert!(suggestions.is_none());
    }

    #[test]
    fn test_split_with_empty_questions_section() {
        let raw = format!("Report.\n{EVALUATION_SENTINEL}\n   \n");
        let (report, suggestions) = split_evaluation(&raw);
        assert_eq!(report, "Report.");
        assert!(suggestions.is_none());
    }

    #[test]
    fn test_split_tolerates_partial_markdown() {
        // Malformed output is passed through untouched, not repaired.
        let raw = format!("**Unclosed bold\n{EVALUATION_SENTINEL}\n- q1\n- q2");
        let (report, suggestions) = split_evaluation(&raw);
        assert_eq!(report, "**Unclosed bold");
        assert_eq!(suggestions.as_deref(), Some("- q1\n- q2"));
    }
}
