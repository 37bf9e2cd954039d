//! Boon registry: the fixed catalog of reward effects and the non-repeating
//! draw used to pick the prize of each Lightning round.

use std::fmt;

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier of a catalog boon, as stored in inventories and the session document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoonId {
    /// Force the next hint vote to pass.
    ExecOrder,
    /// Force the next hint vote to fail.
    Filibuster,
    /// Briefly disable a rival team's buzzer.
    Silencer,
    /// Jump to first place in the buzzer race.
    Priority,
    /// Jump from "too slow" into third place.
    Slingshot,
    /// Stakes-doubling wager, only ever handed out as a gauntlet prize.
    DoubleJeopardy,
}

/// Effect family a boon belongs to; the reward engine dispatches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Pending override that resolves the next hint vote as PASS.
    ForceVotePass,
    /// Pending override that resolves the next hint vote as FAIL.
    ForceVoteFail,
    /// Reject a target team's buzz for a short window.
    SilenceRival,
    /// Retime the caller's buzz ahead of the race leader.
    JumpToFirst,
    /// Retime the caller's buzz ahead of the third-place team.
    JumpToThird,
    /// Host-driven wager; never activated by its holder.
    Wager,
}

/// Static catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boon {
    /// Stable identifier.
    pub id: BoonId,
    /// Display name.
    pub name: &'static str,
    /// Player-facing rule text.
    pub description: &'static str,
    /// Handler applied on activation.
    pub effect: EffectKind,
    /// Whether activation must name a rival team.
    pub requires_target: bool,
    /// Whether the holder can play it directly.
    pub self_activatable: bool,
}

/// Every boon known to the game, in display order.
pub const CATALOG: [Boon; 6] = [
    Boon {
        id: BoonId::ExecOrder,
        name: "Executive Order",
        description: "Force the next Hint Vote to PASS, regardless of the majority.",
        effect: EffectKind::ForceVotePass,
        requires_target: false,
        self_activatable: true,
    },
    Boon {
        id: BoonId::Filibuster,
        name: "The Filibuster",
        description: "Force the next Hint Vote to FAIL.",
        effect: EffectKind::ForceVoteFail,
        requires_target: false,
        self_activatable: true,
    },
    Boon {
        id: BoonId::Silencer,
        name: "The Silencer",
        description: "Disable a rival team's buzzer for a moment.",
        effect: EffectKind::SilenceRival,
        requires_target: true,
        self_activatable: true,
    },
    Boon {
        id: BoonId::Priority,
        name: "Priority Pass",
        description: "Swap places with the 1st place team.",
        effect: EffectKind::JumpToFirst,
        requires_target: false,
        self_activatable: true,
    },
    Boon {
        id: BoonId::Slingshot,
        name: "The Slingshot",
        description: "Jump from \"Too Slow\" (4th+) to 3rd place.",
        effect: EffectKind::JumpToThird,
        requires_target: false,
        self_activatable: true,
    },
    Boon {
        id: BoonId::DoubleJeopardy,
        name: "Double Jeopardy",
        description: "Double the stakes of your next answer when the host offers the wager.",
        effect: EffectKind::Wager,
        requires_target: false,
        self_activatable: false,
    },
];

impl BoonId {
    /// Catalog entry for this id.
    pub fn boon(self) -> &'static Boon {
        match self {
            BoonId::ExecOrder => &CATALOG[0],
            BoonId::Filibuster => &CATALOG[1],
            BoonId::Silencer => &CATALOG[2],
            BoonId::Priority => &CATALOG[3],
            BoonId::Slingshot => &CATALOG[4],
            BoonId::DoubleJeopardy => &CATALOG[5],
        }
    }
}

impl fmt::Display for BoonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.boon().name)
    }
}

/// Boons that can be offered at the start of a Lightning round.
pub fn drawable() -> impl Iterator<Item = BoonId> {
    CATALOG
        .iter()
        .filter(|boon| boon.effect != EffectKind::Wager)
        .map(|boon| boon.id)
}

/// Result of one draw from the deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    /// Boon offered for the round.
    pub boon: BoonId,
    /// Deck-cycle tracker to write back into the session document.
    pub used: Vec<BoonId>,
    /// Whether the previous cycle was exhausted and the deck started over.
    pub reshuffled: bool,
}

/// Draw uniformly among boons not yet offered in the current deck cycle.
///
/// Once every drawable boon has been offered the cycle resets, so the same id
/// never comes up twice before the whole deck has been seen.
pub fn draw<R: Rng + ?Sized>(used: &[BoonId], rng: &mut R) -> Draw {
    let fresh: Vec<BoonId> = drawable().filter(|id| !used.contains(id)).collect();
    let (pool, mut next_used, reshuffled) = if fresh.is_empty() {
        (drawable().collect::<Vec<_>>(), Vec::new(), true)
    } else {
        (fresh, used.to_vec(), false)
    };

    // The catalog always holds drawable boons, so the pool is never empty.
    let boon = pool.choose(rng).copied().unwrap_or(BoonId::ExecOrder);
    next_used.push(boon);

    Draw {
        boon,
        used: next_used,
        reshuffled,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn catalog_lookup_matches_ids() {
        for boon in CATALOG.iter() {
            assert_eq!(boon.id.boon().id, boon.id);
        }
    }

    #[test]
    fn double_jeopardy_is_never_drawn() {
        assert!(drawable().all(|id| id != BoonId::DoubleJeopardy));
        assert_eq!(drawable().count(), 5);
        assert!(!BoonId::DoubleJeopardy.boon().self_activatable);
    }

    #[test]
    fn only_silencer_needs_a_target() {
        let targeted: Vec<_> = CATALOG
            .iter()
            .filter(|boon| boon.requires_target)
            .map(|boon| boon.id)
            .collect();
        assert_eq!(targeted, vec![BoonId::Silencer]);
    }

    #[test]
    fn a_full_cycle_offers_every_boon_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut used = Vec::new();
        let mut seen = HashSet::new();

        for _ in 0..5 {
            let draw = draw(&used, &mut rng);
            assert!(!draw.reshuffled);
            assert!(seen.insert(draw.boon), "{:?} drawn twice", draw.boon);
            used = draw.used;
        }

        assert_eq!(seen.len(), 5);
        assert_eq!(used.len(), 5);
    }

    #[test]
    fn exhausted_deck_reshuffles_and_starts_a_new_cycle() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut used = Vec::new();
        let mut cycles: Vec<Vec<BoonId>> = vec![Vec::new()];

        for _ in 0..17 {
            let draw = draw(&used, &mut rng);
            if draw.reshuffled {
                cycles.push(Vec::new());
                assert_eq!(draw.used, vec![draw.boon]);
            }
            let current = cycles.last_mut().expect("cycle");
            assert!(
                !current.contains(&draw.boon),
                "{:?} repeated within one cycle",
                draw.boon
            );
            current.push(draw.boon);
            used = draw.used;
        }

        assert_eq!(cycles.len(), 4);
        assert!(cycles[..3].iter().all(|cycle| cycle.len() == 5));
    }

    #[test]
    fn wire_names_are_screaming_snake_case() {
        let json = serde_json::to_string(&BoonId::DoubleJeopardy).unwrap();
        assert_eq!(json, "\"DOUBLE_JEOPARDY\"");
        let parsed: BoonId = serde_json::from_str("\"EXEC_ORDER\"").unwrap();
        assert_eq!(parsed, BoonId::ExecOrder);
    }
}
