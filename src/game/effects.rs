//! Reward engine: turns a boon activation into a pure state delta.
//!
//! Handlers never touch the store. They read the caller, the optional target
//! and the current race, and return what should be written; the caller of
//! [`resolve_effect`] performs the write and every client re-derives the race
//! from the ledger afterwards.

use std::fmt;

use crate::{
    game::{
        boon::{BoonId, EffectKind},
        clock::Millis,
        race::{CONTENDER_SLOTS, Race},
        vote::VoteOutcome,
    },
    state::state_machine::{Mode, RoundPhase},
    store::models::{SilenceEffect, TeamKey, VoteOverride},
};

/// Gap used to slip a retimed buzz in front of another one.
pub const EPSILON_MS: Millis = 1;

/// Everything a handler may look at.
pub struct BoonContext<'a> {
    /// Display name of the activating team.
    pub caller: &'a str,
    /// Display name of a joined target team, if one was named and found.
    pub target: Option<&'a str>,
    /// Race as ranked before the effect.
    pub race: &'a Race,
    /// Activation instant.
    pub now: Millis,
}

/// Write requested by an effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectDelta {
    /// Store a pending hint vote override.
    OverrideVote(VoteOverride),
    /// Append a silencer.
    Silence(SilenceEffect),
    /// Move a buzz to a new timestamp.
    Retime {
        /// Display name of the team whose buzz moves.
        team: String,
        /// New buzz instant.
        timestamp: Millis,
    },
    /// The effect had nothing to act on.
    Fizzle(Fizzle),
}

/// Why an activation changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fizzle {
    /// No joined team was named as target.
    MissingTarget,
    /// The caller named itself.
    SelfTarget,
    /// The caller has no buzz to move.
    NotBuzzed,
    /// The caller already leads the race.
    AlreadyFirst,
    /// There is no third place to take.
    TooFewBuzzes,
    /// The caller is already in the top three.
    AlreadyContender,
}

impl fmt::Display for Fizzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Fizzle::MissingTarget => "no valid target team",
            Fizzle::SelfTarget => "a team cannot silence itself",
            Fizzle::NotBuzzed => "team has not buzzed",
            Fizzle::AlreadyFirst => "team is already first",
            Fizzle::TooFewBuzzes => "fewer than three teams have buzzed",
            Fizzle::AlreadyContender => "team is already in the top three",
        };
        f.write_str(text)
    }
}

/// Whether a boon may be played in the current phase at all.
///
/// A disallowed activation is ignored and the boon stays in the inventory.
pub fn allowed(boon: BoonId, mode: Mode, round: Option<RoundPhase>) -> bool {
    match boon.boon().effect {
        EffectKind::ForceVotePass | EffectKind::ForceVoteFail => true,
        // The silence window is shorter than the spin and a gauntlet takes no buzzes.
        EffectKind::SilenceRival => {
            mode == Mode::Lightning
                && matches!(round, Some(RoundPhase::Reveal | RoundPhase::Buzzing))
        }
        EffectKind::JumpToFirst | EffectKind::JumpToThird => {
            mode == Mode::Lightning && round == Some(RoundPhase::Buzzing)
        }
        EffectKind::Wager => false,
    }
}

/// Dispatch on the boon's effect kind.
pub fn resolve_effect(boon: BoonId, ctx: &BoonContext<'_>) -> EffectDelta {
    match boon.boon().effect {
        EffectKind::ForceVotePass => force_vote(boon, ctx, VoteOutcome::Pass),
        EffectKind::ForceVoteFail => force_vote(boon, ctx, VoteOutcome::Fail),
        EffectKind::SilenceRival => silence(ctx),
        EffectKind::JumpToFirst => jump_to_first(ctx),
        EffectKind::JumpToThird => jump_to_third(ctx),
        // Not self-activatable; callers filter it through `allowed`.
        EffectKind::Wager => EffectDelta::Fizzle(Fizzle::MissingTarget),
    }
}

fn force_vote(boon: BoonId, ctx: &BoonContext<'_>, outcome: VoteOutcome) -> EffectDelta {
    EffectDelta::OverrideVote(VoteOverride {
        boon_id: boon,
        team: ctx.caller.to_owned(),
        outcome,
    })
}

fn silence(ctx: &BoonContext<'_>) -> EffectDelta {
    let Some(target) = ctx.target else {
        return EffectDelta::Fizzle(Fizzle::MissingTarget);
    };
    if TeamKey::normalize(ctx.caller).matches(target) {
        return EffectDelta::Fizzle(Fizzle::SelfTarget);
    }
    EffectDelta::Silence(SilenceEffect {
        target: target.to_owned(),
        user: ctx.caller.to_owned(),
        timestamp: ctx.now,
    })
}

fn jump_to_first(ctx: &BoonContext<'_>) -> EffectDelta {
    let caller = TeamKey::normalize(ctx.caller);
    let Some(rank) = ctx.race.rank_of(&caller) else {
        return EffectDelta::Fizzle(Fizzle::NotBuzzed);
    };
    match ctx.race.at_rank(1) {
        Some(leader) if rank > 1 => EffectDelta::Retime {
            team: ctx.caller.to_owned(),
            timestamp: leader.timestamp - EPSILON_MS,
        },
        _ => EffectDelta::Fizzle(Fizzle::AlreadyFirst),
    }
}

fn jump_to_third(ctx: &BoonContext<'_>) -> EffectDelta {
    if ctx.race.len() < CONTENDER_SLOTS {
        return EffectDelta::Fizzle(Fizzle::TooFewBuzzes);
    }
    let caller = TeamKey::normalize(ctx.caller);
    let Some(rank) = ctx.race.rank_of(&caller) else {
        return EffectDelta::Fizzle(Fizzle::NotBuzzed);
    };
    if rank <= CONTENDER_SLOTS {
        return EffectDelta::Fizzle(Fizzle::AlreadyContender);
    }
    match ctx.race.at_rank(CONTENDER_SLOTS) {
        Some(third) => EffectDelta::Retime {
            team: ctx.caller.to_owned(),
            timestamp: third.timestamp - EPSILON_MS,
        },
        None => EffectDelta::Fizzle(Fizzle::TooFewBuzzes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::BuzzEntity;

    fn race(buzzes: &[(&str, Millis)]) -> Race {
        let ledger: Vec<BuzzEntity> = buzzes
            .iter()
            .map(|(team, timestamp)| BuzzEntity {
                team_name: (*team).into(),
                timestamp: *timestamp,
            })
            .collect();
        Race::resolve(&ledger, 3_500)
    }

    fn ctx<'a>(caller: &'a str, target: Option<&'a str>, race: &'a Race) -> BoonContext<'a> {
        BoonContext {
            caller,
            target,
            race,
            now: 5_000,
        }
    }

    fn retimed(ledger: &[(&str, Millis)], delta: &EffectDelta) -> Vec<String> {
        let EffectDelta::Retime { team, timestamp } = delta else {
            panic!("expected a retime, got {delta:?}");
        };
        let moved: Vec<(&str, Millis)> = ledger
            .iter()
            .map(|(name, ts)| {
                if *name == team.as_str() {
                    (*name, *timestamp)
                } else {
                    (*name, *ts)
                }
            })
            .collect();
        race(&moved)
            .standings()
            .iter()
            .map(|s| s.team.clone())
            .collect()
    }

    #[test]
    fn priority_moves_the_caller_in_front_of_the_leader() {
        let ledger = [("A", 100), ("B", 200), ("C", 400)];
        let current = race(&ledger);
        let delta = resolve_effect(BoonId::Priority, &ctx("B", None, &current));

        assert_eq!(
            delta,
            EffectDelta::Retime {
                team: "B".into(),
                timestamp: 99
            }
        );
        assert_eq!(retimed(&ledger, &delta), vec!["B", "A", "C"]);
    }

    #[test]
    fn retimed_ledger_resolves_identically_on_every_pass() {
        let moved = [("A", 100), ("B", 99), ("C", 400)];
        assert_eq!(race(&moved), race(&moved));
        let mut reversed = moved;
        reversed.reverse();
        assert_eq!(race(&moved), race(&reversed));
    }

    #[test]
    fn priority_fizzles_for_the_leader_or_a_team_without_a_buzz() {
        let current = race(&[("A", 100), ("B", 200)]);
        assert_eq!(
            resolve_effect(BoonId::Priority, &ctx("a", None, &current)),
            EffectDelta::Fizzle(Fizzle::AlreadyFirst)
        );
        assert_eq!(
            resolve_effect(BoonId::Priority, &ctx("Z", None, &current)),
            EffectDelta::Fizzle(Fizzle::NotBuzzed)
        );
    }

    #[test]
    fn slingshot_needs_a_fourth_buzz() {
        let short = race(&[("A", 100), ("C", 400)]);
        assert_eq!(
            resolve_effect(BoonId::Slingshot, &ctx("C", None, &short)),
            EffectDelta::Fizzle(Fizzle::TooFewBuzzes)
        );

        let ledger = [("A", 100), ("B", 200), ("C", 400), ("D", 900)];
        let full = race(&ledger);
        assert_eq!(
            resolve_effect(BoonId::Slingshot, &ctx("C", None, &full)),
            EffectDelta::Fizzle(Fizzle::AlreadyContender)
        );

        let delta = resolve_effect(BoonId::Slingshot, &ctx("D", None, &full));
        assert_eq!(
            delta,
            EffectDelta::Retime {
                team: "D".into(),
                timestamp: 399
            }
        );
        assert_eq!(retimed(&ledger, &delta), vec!["A", "B", "D", "C"]);
    }

    #[test]
    fn silencer_requires_a_rival_target() {
        let empty = race(&[]);
        assert_eq!(
            resolve_effect(BoonId::Silencer, &ctx("Owls", None, &empty)),
            EffectDelta::Fizzle(Fizzle::MissingTarget)
        );
        assert_eq!(
            resolve_effect(BoonId::Silencer, &ctx("Owls", Some("owls"), &empty)),
            EffectDelta::Fizzle(Fizzle::SelfTarget)
        );
        assert_eq!(
            resolve_effect(BoonId::Silencer, &ctx("Owls", Some("Bats"), &empty)),
            EffectDelta::Silence(SilenceEffect {
                target: "Bats".into(),
                user: "Owls".into(),
                timestamp: 5_000,
            })
        );
    }

    #[test]
    fn vote_overrides_carry_their_outcome() {
        let empty = race(&[]);
        let EffectDelta::OverrideVote(pending) =
            resolve_effect(BoonId::Filibuster, &ctx("Owls", None, &empty))
        else {
            panic!("expected an override");
        };
        assert_eq!(pending.outcome, VoteOutcome::Fail);
        assert_eq!(pending.boon_id, BoonId::Filibuster);
    }

    #[test]
    fn phase_rules_gate_activation() {
        let buzzing = Some(RoundPhase::Buzzing);
        assert!(allowed(BoonId::ExecOrder, Mode::Lobby, None));
        assert!(allowed(BoonId::Filibuster, Mode::HyperFocus, None));
        assert!(allowed(BoonId::Silencer, Mode::Lightning, Some(RoundPhase::Reveal)));
        assert!(allowed(BoonId::Silencer, Mode::Lightning, buzzing));
        assert!(!allowed(BoonId::Silencer, Mode::Hint, None));
        assert!(!allowed(BoonId::Silencer, Mode::Lightning, None));
        for phase in [RoundPhase::Spinning, RoundPhase::Gauntlet] {
            assert!(!allowed(BoonId::Silencer, Mode::Lightning, Some(phase)));
        }
        assert!(allowed(BoonId::Priority, Mode::Lightning, buzzing));
        assert!(!allowed(BoonId::Slingshot, Mode::Lightning, Some(RoundPhase::Gauntlet)));
        assert!(!allowed(BoonId::DoubleJeopardy, Mode::Lightning, buzzing));
    }
}
