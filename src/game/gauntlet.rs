//! Gauntlet: sequential elimination among the race contenders.

use crate::game::{boon::BoonId, race::Race};

/// The gauntlet never runs past the third contender.
pub const MAX_GAUNTLET_STEPS: u8 = 3;

/// Result of one host decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GauntletOutcome {
    /// Contender answered correctly and wins the round's boon.
    Award { team: String, boon: BoonId },
    /// Move on to the next contender.
    Advance { step: u8 },
    /// No contender left; the round ends without an award.
    Exhausted,
}

/// Apply the host's verdict on the contender at `step`.
pub fn decide(race: &Race, step: u8, boon: BoonId, correct: bool) -> GauntletOutcome {
    let Some(contender) = race.at_rank(usize::from(step)) else {
        return GauntletOutcome::Exhausted;
    };
    if correct {
        return GauntletOutcome::Award {
            team: contender.team.clone(),
            boon,
        };
    }
    if step >= MAX_GAUNTLET_STEPS || usize::from(step) >= race.len() {
        GauntletOutcome::Exhausted
    } else {
        GauntletOutcome::Advance { step: step + 1 }
    }
}
