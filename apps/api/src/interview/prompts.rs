//! Prompt composer — builds the instruction text for each of the four
//! speaking acts: opening/next question, feedback + next question, simulated
//! candidate answer, and the final evaluation.
//!
//! Every builder is a pure function of its inputs: identical inputs produce
//! byte-identical prompts. No builder performs I/O.

use crate::interview::models::{ConversationTurn, Speaker, SupplementInfo};
use crate::interview::phase::Phase;
use crate::interview::roles::RoleConfig;

/// Literal separator the evaluation model is instructed to emit between the
/// report and the suggested follow-up questions. Fragile by nature; the
/// splitter in `evaluation.rs` tolerates its absence.
pub const EVALUATION_SENTINEL: &str = "===FOLLOW_UP_QUESTIONS===";

/// System line for the evaluation call; the full rubric travels in the user
/// content.
pub const EVALUATION_SYSTEM: &str = "You are a seasoned interview assessor who \
    evaluates candidates from interview transcripts, objectively and in depth.";

/// History window embedded in question/candidate prompts.
const QUESTION_HISTORY_WINDOW: usize = 6;
/// History window embedded in feedback prompts.
const FEEDBACK_HISTORY_WINDOW: usize = 4;
/// Per-entry character clip for question/candidate prompts.
const QUESTION_CLIP_CHARS: usize = 500;
/// Per-entry character clip for feedback prompts.
const FEEDBACK_CLIP_CHARS: usize = 300;

pub const INTERVIEWER_TEMPERATURE: f32 = 0.8;
pub const CANDIDATE_TEMPERATURE: f32 = 0.7;
pub const EVALUATION_TEMPERATURE: f32 = 0.6;

/// Everything the interviewer-side builders need for one turn.
pub struct PromptContext<'a> {
    pub resume: &'a str,
    pub job_description: &'a str,
    pub round: u32,
    pub total_rounds: u32,
    pub phase: Phase,
    pub role: &'static RoleConfig,
    pub history: &'a [ConversationTurn],
    pub supplement: Option<&'a SupplementInfo>,
}

// ────────────────────────────────────────────────────────────────────────────
// Shared fragments
// ────────────────────────────────────────────────────────────────────────────

/// Renders the most recent `window` turns, clipping each entry to `clip`
/// characters. Full history is never embedded here; only the evaluation
/// builder sees the untruncated transcript.
fn render_history(
    history: &[ConversationTurn],
    window: usize,
    clip: usize,
    interviewer_label: &str,
    interviewee_label: &str,
) -> String {
    if history.is_empty() {
        return String::new();
    }
    let mut rendered = String::from("\n## Conversation so far\n");
    let start = history.len().saturating_sub(window);
    for turn in &history[start..] {
        let label = match turn.speaker {
            Speaker::Interviewer => interviewer_label,
            Speaker::Interviewee => interviewee_label,
        };
        rendered.push_str(&format!("\n**{label}**: {}\n", clip_content(&turn.content, clip)));
    }
    rendered
}

fn clip_content(content: &str, clip: usize) -> String {
    if content.chars().count() <= clip {
        content.to_string()
    } else {
        let clipped: String = content.chars().take(clip).collect();
        format!("{clipped}...")
    }
}

/// The knowledge-boundary constraint block shared by both interviewer-side
/// builders. Role asymmetry enters through `guidance_notes`.
fn interviewer_constraints(role: &RoleConfig) -> String {
    format!(
        "# Hard constraints\n\
         - Never reveal round numbers, never say this is the \"final round\", and never \
         mention hiring-committee, approval, or offer-process details.\n\
         - Ask only questions inside the knowledge domain the job description implies; \
         if the posting is for a commercialization track, do not drill into model-training \
         internals, and likewise for any other specialty the role does not require.\n\
         - {}\n",
        role.guidance_notes
    )
}

fn render_supplement(supplement: &SupplementInfo) -> String {
    let mut rendered = String::from("\n## Candidate's real negotiating position\n");
    if let Some(current) = &supplement.current_salary {
        rendered.push_str(&format!("- Current compensation: {current}\n"));
    }
    if let Some(expected) = &supplement.expected_salary {
        rendered.push_str(&format!("- Expected compensation: {expected}\n"));
    }
    if let Some(time) = &supplement.available_time {
        rendered.push_str(&format!("- Availability: {time}\n"));
    }
    if let Some(other) = &supplement.other_info {
        rendered.push_str(&format!("- Other: {other}\n"));
    }
    rendered
}

/// Supplement info only enriches closing-stage and HRBP conversations.
fn supplement_applies(ctx: &PromptContext<'_>) -> bool {
    match ctx.supplement {
        Some(s) if !s.is_empty() => {
            ctx.phase == Phase::Closing
                || matches!(
                    ctx.role.role,
                    crate::interview::models::InterviewerRole::Hrbp
                )
        }
        _ => false,
    }
}

/// Phase guidance parameterized by role so each persona's focus areas drive
/// the middle phases instead of a hardcoded technical script.
fn phase_guidance(role: &RoleConfig, phase: Phase) -> String {
    match phase {
        Phase::Opening => format!(
            "This is the opening. Briefly introduce yourself as {} and the team in a \
             sentence or two, then invite the candidate to introduce themselves with a \
             light, low-pressure question.",
            role.display_name
        ),
        Phase::Basic => format!(
            "This is the warm-up stage. Cover background and fundamentals relevant to \
             your remit: {}. Keep questions broad rather than deep.",
            role.focus_areas.join("; ")
        ),
        Phase::Professional => format!(
            "This is the deep-dive stage. Go substantially deeper into your remit \
             ({}), building directly on what the candidate has already said. Questions \
             in the spirit of: {}",
            role.focus_areas.join("; "),
            role.typical_questions.join(" | ")
        ),
        Phase::Scenario => format!(
            "This is the scenario stage. Pose a realistic working situation drawn from \
             your remit ({}) and examine how the candidate reasons through it. Follow up \
             on their thought process.",
            role.focus_areas.join("; ")
        ),
        Phase::Closing => format!(
            "This is the closing stage. Invite the candidate to ask you questions, and \
             answer them using the following guide: {} Do not volunteer \
             interview-process meta-information, and wrap up politely.",
            role.closing.interviewer_guide
        ),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Builder 1: opening / next question
// ────────────────────────────────────────────────────────────────────────────

/// Builds the interviewer prompt that opens a round. Used for every round in
/// simulation mode and for round 1 in interactive mode.
pub fn build_question_prompt(ctx: &PromptContext<'_>, interactive: bool) -> String {
    let interactive_block = if interactive {
        "\n# Live-candidate mode\n\
         A real person is answering. Read their answers carefully, follow up on what \
         they actually said, acknowledge strong answers, and press where an answer was \
         thin. Keep the conversation natural and coherent.\n"
    } else {
        ""
    };

    let supplement_block = if supplement_applies(ctx) {
        ctx.supplement.map(render_supplement).unwrap_or_default()
    } else {
        String::new()
    };

    format!(
        "# Persona\n\
         You are {display_name} ({title}) running one round of a job interview.\n\
         \n\
         # Interview style\n\
         {tone}\n\
         \n\
         # Job description\n\
         ```\n{jd}\n```\n\
         \n\
         # Candidate resume\n\
         ```\n{resume}\n```\n\
         \n\
         # Interview progress\n\
         - Round {round} of {total} (internal only; never say this aloud)\n\
         - Stage: {phase_label}\n\
         {history}{supplement}{interactive}\n\
         # This round\n\
         {phase_guidance}\n\
         \n\
         {constraints}\
         # Output\n\
         - Speak directly as the interviewer; no role labels, no narration.\n\
         - Ask at most one or two questions.\n\
         - Build on the candidate's earlier answers where possible.\n",
        display_name = ctx.role.display_name,
        title = ctx.role.title,
        tone = ctx.role.tone.description(),
        jd = ctx.job_description,
        resume = ctx.resume,
        round = ctx.round,
        total = ctx.total_rounds,
        phase_label = ctx.phase.label(),
        history = render_history(
            ctx.history,
            QUESTION_HISTORY_WINDOW,
            QUESTION_CLIP_CHARS,
            "You (the interviewer)",
            "Candidate",
        ),
        supplement = supplement_block,
        interactive = interactive_block,
        phase_guidance = phase_guidance(ctx.role, ctx.phase),
        constraints = interviewer_constraints(ctx.role),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Builder 2: feedback + next question (interactive mode only)
// ────────────────────────────────────────────────────────────────────────────

/// Builds the prompt that critiques the human's answer and pivots into the
/// next question. Deliberately separate from `build_question_prompt`: this
/// one reacts to a real answer, with its own length and structure contract.
pub fn build_feedback_prompt(ctx: &PromptContext<'_>, user_answer: &str) -> String {
    let supplement_block = if supplement_applies(ctx) {
        ctx.supplement.map(render_supplement).unwrap_or_default()
    } else {
        String::new()
    };

    format!(
        "# Persona\n\
         You are {display_name} ({title}). You just heard the candidate's answer and \
         will comment on it briefly before moving on.\n\
         \n\
         # Job description\n\
         ```\n{jd}\n```\n\
         \n\
         # Candidate resume\n\
         ```\n{resume}\n```\n\
         \n\
         # Interview progress\n\
         - Round {round} of {total} (internal only; never say this aloud)\n\
         - Stage: {phase_label}\n\
         {history}{supplement}\n\
         # The candidate's latest answer\n\
         ```\n{answer}\n```\n\
         \n\
         # This round\n\
         {phase_guidance}\n\
         \n\
         {constraints}\
         # Output\n\
         1. First give a specific, pointed critique of the answer above in 1-2 \
         sentences (appreciation, a follow-up push, or a concrete suggestion).\n\
         2. Then pivot naturally into your next question.\n\
         Keep the whole output to roughly 3-4 sentences, spoken directly as the \
         interviewer with no role labels.\n",
        display_name = ctx.role.display_name,
        title = ctx.role.title,
        jd = ctx.job_description,
        resume = ctx.resume,
        round = ctx.round,
        total = ctx.total_rounds,
        phase_label = ctx.phase.label(),
        history = render_history(
            ctx.history,
            FEEDBACK_HISTORY_WINDOW,
            FEEDBACK_CLIP_CHARS,
            "Interviewer",
            "Candidate",
        ),
        supplement = supplement_block,
        answer = user_answer,
        phase_guidance = phase_guidance(ctx.role, ctx.phase),
        constraints = interviewer_constraints(ctx.role),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Builder 3: simulated candidate (simulation mode only)
// ────────────────────────────────────────────────────────────────────────────

/// Builds the prompt that produces the candidate's answer in simulation mode.
/// Grounded strictly in the resume; no fabricated experience.
pub fn build_candidate_prompt(ctx: &PromptContext<'_>) -> String {
    let closing_block = if ctx.phase == Phase::Closing {
        format!(
            "\n# Closing stage\n\
             The interviewer is wrapping up. When invited, ask 1-2 targeted questions \
             of your own. Good topics for this interviewer: {topics}. For example: \
             {examples}. Never ask about: {avoid}.\n",
            topics = ctx.role.closing.candidate_question_topics.join("; "),
            examples = ctx.role.closing.example_questions.join(" | "),
            avoid = ctx.role.closing.avoid_questions.join("; "),
        )
    } else {
        String::new()
    };

    let supplement_block = if supplement_applies(ctx) {
        ctx.supplement
            .map(|s| {
                format!(
                    "{}\n\
                     Stay numerically consistent: once you state a figure or range in \
                     this interview you must never contradict it later, and you must \
                     never disclose your true floor, no matter how hard you are pressed.\n",
                    render_supplement(s)
                )
            })
            .unwrap_or_default()
    } else {
        String::new()
    };

    format!(
        "# Persona\n\
         You are the candidate in an important job interview, answering with deep \
         professional knowledge and confidence.\n\
         \n\
         # Your resume\n\
         ```\n{resume}\n```\n\
         \n\
         # Target position\n\
         ```\n{jd}\n```\n\
         {history}{supplement}{closing}\n\
         # Answering principles\n\
         1. Ground everything in the resume: expand on real experience, never invent \
         projects, employers, or numbers that are not supported by it.\n\
         2. For project questions, structure the answer as situation, task, action, \
         and result.\n\
         3. Show reasoning on technical questions, not just conclusions.\n\
         4. Admit honestly when you do not know something, and say how you would \
         learn it.\n\
         5. Stay concise: make the point, support it, stop.\n\
         \n\
         # Output\n\
         - Speak directly as the candidate; no role labels.\n\
         - If this is the opening, keep the self-introduction to one or two spoken \
         minutes.\n\
         - If the interviewer is closing, thank them and respond in kind.\n",
        resume = ctx.resume,
        jd = ctx.job_description,
        history = render_history(
            ctx.history,
            QUESTION_HISTORY_WINDOW,
            QUESTION_CLIP_CHARS,
            "Interviewer",
            "You",
        ),
        supplement = supplement_block,
        closing = closing_block,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Builder 4: final evaluation
// ────────────────────────────────────────────────────────────────────────────

/// Builds the closing-report prompt over the FULL (untruncated) history,
/// with the role-specific rubric and the sentinel instruction for the
/// follow-up questions section.
pub fn build_evaluation_prompt(
    job_description: &str,
    resume: &str,
    history: &[ConversationTurn],
    role: &RoleConfig,
    interactive: bool,
) -> String {
    let mut transcript = String::new();
    for turn in history {
        let label = match turn.speaker {
            Speaker::Interviewer => "Interviewer",
            Speaker::Interviewee => "Candidate",
        };
        transcript.push_str(&format!("\n**{label}**: {}\n", turn.content));
    }

    let mut rubric = String::new();
    for (i, dimension) in role.evaluation_dimensions.iter().enumerate() {
        rubric.push_str(&format!("{}. {dimension}\n", i + 1));
    }

    let interactive_note = if interactive {
        "\nNote: the candidate's answers were typed by a real person. Evaluate their \
         actual answers objectively; do not assume they were model-generated.\n"
    } else {
        ""
    };

    format!(
        "Write a detailed evaluation report for the interview below. The interviewer \
         was {display_name} ({title}); judge what that perspective can legitimately \
         judge.\n\
         \n\
         ## Position requirements\n\
         {jd}\n\
         \n\
         ## Candidate resume\n\
         {resume}\n\
         \n\
         ## Interview transcript\n\
         {transcript}\n\
         {interactive_note}\
         \n\
         ## Evaluation dimensions\n\
         {rubric}\
         \n\
         Give a detailed, professional, constructive report along those dimensions.\n\
         \n\
         After the report, output the exact line {sentinel} on its own line, followed \
         by 5-8 follow-up questions this candidate could realistically ask in a next \
         step, tailored to this resume and this position.\n",
        display_name = role.display_name,
        title = role.title,
        jd = job_description,
        resume = resume,
        transcript = transcript,
        interactive_note = interactive_note,
        rubric = rubric,
        sentinel = EVALUATION_SENTINEL,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::InterviewerRole;
    use crate::interview::roles::role_config;

    fn turns(n: usize) -> Vec<ConversationTurn> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    ConversationTurn::interviewer(format!("question-{i}"))
                } else {
                    ConversationTurn::interviewee(format!("answer-{i}"))
                }
            })
            .collect()
    }

    fn ctx<'a>(
        role: InterviewerRole,
        round: u32,
        total: u32,
        phase: Phase,
        history: &'a [ConversationTurn],
        supplement: Option<&'a SupplementInfo>,
    ) -> PromptContext<'a> {
        PromptContext {
            resume: "Ten years of backend work.",
            job_description: "Backend engineer, payments team.",
            round,
            total_rounds: total,
            phase,
            role: role_config(role),
            history,
            supplement,
        }
    }

    #[test]
    fn test_question_prompt_is_deterministic() {
        let history = turns(4);
        let context = ctx(InterviewerRole::Peers, 3, 5, Phase::Professional, &history, None);
        assert_eq!(
            build_question_prompt(&context, false),
            build_question_prompt(&context, false)
        );
    }

    #[test]
    fn test_question_history_window_is_six() {
        let history = turns(10);
        let context = ctx(InterviewerRole::Peers, 6, 10, Phase::Professional, &history, None);
        let prompt = build_question_prompt(&context, false);
        assert!(!prompt.contains("question-2"), "older entries must be dropped");
        assert!(!prompt.contains("answer-3"));
        assert!(prompt.contains("question-4"));
        assert!(prompt.contains("answer-9"));
    }

    #[test]
    fn test_feedback_history_window_is_four() {
        let history = turns(10);
        let context = ctx(InterviewerRole::Leader, 6, 10, Phase::Professional, &history, None);
        let prompt = build_feedback_prompt(&context, "my answer");
        assert!(!prompt.contains("answer-5"));
        assert!(prompt.contains("question-6"));
        assert!(prompt.contains("answer-9"));
        assert!(prompt.contains("my answer"));
    }

    #[test]
    fn test_long_entries_are_clipped() {
        let long = "x".repeat(600);
        let history = vec![ConversationTurn::interviewer(long)];
        let context = ctx(InterviewerRole::Peers, 2, 5, Phase::Professional, &history, None);
        let prompt = build_question_prompt(&context, false);
        assert!(prompt.contains(&format!("{}...", "x".repeat(500))));
        assert!(!prompt.contains(&"x".repeat(501)));
    }

    #[test]
    fn test_ta_prompts_never_request_technical_depth() {
        // Structural role-boundary property: the TA's prompts carry its
        // recruiting-only boundary and none of the peer persona's technical
        // probing guidance, in any phase.
        let history = turns(2);
        for phase in [Phase::Opening, Phase::Basic, Phase::Professional, Phase::Scenario] {
            let context = ctx(InterviewerRole::Ta, 2, 10, phase, &history, None);
            let prompt = build_question_prompt(&context, false);
            assert!(
                prompt.contains("Do not probe technical implementation detail"),
                "TA boundary missing in {phase:?}"
            );
            assert!(
                !prompt.contains("system design trade-offs"),
                "peer-only guidance leaked into TA prompt in {phase:?}"
            );
        }
    }

    #[test]
    fn test_interviewer_prompt_hides_process_meta() {
        let history = turns(2);
        let context = ctx(InterviewerRole::Leader, 4, 5, Phase::Closing, &history, None);
        let prompt = build_question_prompt(&context, false);
        assert!(prompt.contains("Never reveal round numbers"));
        assert!(prompt.contains(role_config(InterviewerRole::Leader).closing.interviewer_guide.split_whitespace().next().unwrap()));
    }

    #[test]
    fn test_interactive_block_only_in_interactive_mode() {
        let history = turns(2);
        let context = ctx(InterviewerRole::Peers, 2, 5, Phase::Professional, &history, None);
        assert!(build_question_prompt(&context, true).contains("Live-candidate mode"));
        assert!(!build_question_prompt(&context, false).contains("Live-candidate mode"));
    }

    #[test]
    fn test_supplement_reaches_hrbp_but_not_midgame_peers() {
        let history = turns(2);
        let supplement = SupplementInfo {
            current_salary: Some("30k/month".to_string()),
            expected_salary: Some("38-42k/month".to_string()),
            ..Default::default()
        };
        let hrbp = ctx(
            InterviewerRole::Hrbp,
            2,
            5,
            Phase::Professional,
            &history,
            Some(&supplement),
        );
        assert!(build_question_prompt(&hrbp, false).contains("38-42k/month"));

        let peers = ctx(
            InterviewerRole::Peers,
            2,
            5,
            Phase::Professional,
            &history,
            Some(&supplement),
        );
        assert!(!build_question_prompt(&peers, false).contains("38-42k/month"));
    }

    #[test]
    fn test_candidate_prompt_grounds_in_resume_and_uses_star() {
        let history = turns(2);
        let context = ctx(InterviewerRole::Peers, 2, 5, Phase::Professional, &history, None);
        let prompt = build_candidate_prompt(&context);
        assert!(prompt.contains("Ground everything in the resume"));
        assert!(prompt.contains("situation, task, action"));
        assert!(!prompt.contains("Closing stage"));
    }

    #[test]
    fn test_candidate_closing_respects_role_avoid_list() {
        let history = turns(2);
        let context = ctx(InterviewerRole::Ta, 5, 5, Phase::Closing, &history, None);
        let prompt = build_candidate_prompt(&context);
        assert!(prompt.contains("Never ask about"));
        assert!(prompt.contains("exact compensation numbers"));
        assert!(prompt.contains("team culture"));
    }

    #[test]
    fn test_candidate_salary_consistency_instruction() {
        let history = turns(2);
        let supplement = SupplementInfo {
            expected_salary: Some("38-42k/month".to_string()),
            ..Default::default()
        };
        let context = ctx(
            InterviewerRole::Hrbp,
            3,
            3,
            Phase::Closing,
            &history,
            Some(&supplement),
        );
        let prompt = build_candidate_prompt(&context);
        assert!(prompt.contains("never contradict it later"));
        assert!(prompt.contains("never disclose your true floor"));
    }

    #[test]
    fn test_evaluation_prompt_is_byte_identical_and_untruncated() {
        let history = turns(14);
        let role = role_config(InterviewerRole::Director);
        let first = build_evaluation_prompt("jd", "resume", &history, role, false);
        let second = build_evaluation_prompt("jd", "resume", &history, role, false);
        assert_eq!(first, second);
        // Full history: even the oldest entry appears.
        assert!(first.contains("question-0"));
        assert!(first.contains(EVALUATION_SENTINEL));
        assert!(first.contains("Strategic thinking"));
    }

    #[test]
    fn test_evaluation_rubric_differs_per_role() {
        let history = turns(2);
        let hrbp = build_evaluation_prompt(
            "jd",
            "resume",
            &history,
            role_config(InterviewerRole::Hrbp),
            true,
        );
        let peers = build_evaluation_prompt(
            "jd",
            "resume",
            &history,
            role_config(InterviewerRole::Peers),
            true,
        );
        assert!(hrbp.contains("Negotiation tactics"));
        assert!(!peers.contains("Negotiation tactics"));
        assert!(hrbp.contains("typed by a real person"));
    }
}
