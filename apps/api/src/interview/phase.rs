//! Interview phase — a pure function of (current round, total rounds).
//! Never stored; recomputed wherever it is needed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Opening,
    Basic,
    Professional,
    Scenario,
    Closing,
}

impl Phase {
    /// Human-readable label used in round markers and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Opening => "Opening",
            Phase::Basic => "Background & basics",
            Phase::Professional => "Professional deep dive",
            Phase::Scenario => "Scenario questions",
            Phase::Closing => "Closing",
        }
    }
}

/// Maps a round number onto its phase.
///
/// Boundaries: round 1 is always the opening; the first 30% of rounds are
/// basic, up to 70% professional, then scenario until the last two rounds,
/// which close the interview.
pub fn phase_of(round: u32, total_rounds: u32) -> Phase {
    if round == 1 {
        Phase::Opening
    } else if f64::from(round) <= f64::from(total_rounds) * 0.3 {
        Phase::Basic
    } else if f64::from(round) <= f64::from(total_rounds) * 0.7 {
        Phase::Professional
    } else if round + 2 <= total_rounds {
        Phase::Scenario
    } else {
        Phase::Closing
    }
}
