//! Buzz ledger race resolution.
//!
//! Nothing about the race is stored: ranks are recomputed from the full set of
//! buzz timestamps every time, so every client derives the same standings from
//! the same replicated ledger. Timestamps come from the buzzing devices, which
//! means clock skew between devices changes the outcome.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    game::clock::Millis,
    store::models::{BuzzEntity, SilenceEffect, TeamKey},
};

/// Number of teams that make it into the gauntlet.
pub const CONTENDER_SLOTS: usize = 3;

/// One ranked buzz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Standing {
    /// 1-based race rank.
    pub rank: usize,
    /// Display name of the buzzing team.
    pub team: String,
    /// Buzz instant used for ranking.
    pub timestamp: Millis,
}

/// Ranked view of a round's buzz ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Race {
    standings: Vec<Standing>,
    window_ms: Millis,
}

impl Race {
    /// Rank buzzes by ascending timestamp.
    ///
    /// Equal timestamps are ordered by team key so that every client breaks
    /// the tie the same way.
    pub fn resolve(buzzes: &[BuzzEntity], window_ms: Millis) -> Self {
        let mut ordered: Vec<(Millis, TeamKey, &BuzzEntity)> = buzzes
            .iter()
            .map(|buzz| (buzz.timestamp, buzz.key(), buzz))
            .collect();
        ordered.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        let standings = ordered
            .into_iter()
            .enumerate()
            .map(|(index, (timestamp, _, buzz))| Standing {
                rank: index + 1,
                team: buzz.team_name.clone(),
                timestamp,
            })
            .collect();

        Self {
            standings,
            window_ms,
        }
    }

    /// Number of buzzes in the ledger.
    pub fn len(&self) -> usize {
        self.standings.len()
    }

    /// Whether nobody has buzzed.
    pub fn is_empty(&self) -> bool {
        self.standings.is_empty()
    }

    /// Every standing in rank order.
    pub fn standings(&self) -> &[Standing] {
        &self.standings
    }

    /// Ranks 1 to 3.
    pub fn contenders(&self) -> &[Standing] {
        let end = self.standings.len().min(CONTENDER_SLOTS);
        &self.standings[..end]
    }

    /// Rank 4 and beyond.
    pub fn too_slow(&self) -> &[Standing] {
        let start = self.standings.len().min(CONTENDER_SLOTS);
        &self.standings[start..]
    }

    /// Standing at a 1-based rank.
    pub fn at_rank(&self, rank: usize) -> Option<&Standing> {
        rank.checked_sub(1).and_then(|index| self.standings.get(index))
    }

    /// 1-based rank of `key`, if it buzzed.
    pub fn rank_of(&self, key: &TeamKey) -> Option<usize> {
        self.standings
            .iter()
            .find(|standing| key.matches(&standing.team))
            .map(|standing| standing.rank)
    }

    /// Timestamp of the leading buzz.
    pub fn first_timestamp(&self) -> Option<Millis> {
        self.standings.first().map(|standing| standing.timestamp)
    }

    /// Instant after which teams without a buzz are locked out.
    pub fn window_closes_at(&self) -> Option<Millis> {
        self.first_timestamp().map(|first| first + self.window_ms)
    }

    /// Time left in the race window, `None` until somebody buzzes.
    pub fn window_remaining(&self, now: Millis) -> Option<Millis> {
        self.window_closes_at().map(|closes| (closes - now).max(0))
    }

    /// A team that has not buzzed once the window elapsed can never buzz this round.
    pub fn is_locked_out(&self, key: &TeamKey, now: Millis) -> bool {
        self.rank_of(key).is_none()
            && self
                .window_closes_at()
                .is_some_and(|closes_at| now > closes_at)
    }
}

/// Whether an active silencer targets `key` at `now`.
pub fn is_silenced(
    silenced: &[SilenceEffect],
    key: &TeamKey,
    now: Millis,
    duration_ms: Millis,
) -> bool {
    silenced
        .iter()
        .any(|effect| key.matches(&effect.target) && now - effect.timestamp < duration_ms)
}

/// What a team's buzzer would do if pressed right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuzzEligibility {
    /// Team already buzzed this round.
    Buzzed { rank: usize },
    /// Round is not accepting buzzes.
    Closed,
    /// A silencer is holding the buzzer down.
    Silenced,
    /// Race window elapsed without a buzz from this team.
    LockedOut,
    /// Buzzer is live.
    Open,
}

impl BuzzEligibility {
    /// Evaluate the buzzer for `key`.
    ///
    /// A silencer is only consulted while the target has not buzzed yet.
    pub fn evaluate(
        buzzing: bool,
        race: &Race,
        silenced: &[SilenceEffect],
        key: &TeamKey,
        now: Millis,
        silence_ms: Millis,
    ) -> Self {
        if let Some(rank) = race.rank_of(key) {
            return BuzzEligibility::Buzzed { rank };
        }
        if !buzzing {
            return BuzzEligibility::Closed;
        }
        if is_silenced(silenced, key, now, silence_ms) {
            return BuzzEligibility::Silenced;
        }
        if race.is_locked_out(key, now) {
            return BuzzEligibility::LockedOut;
        }
        BuzzEligibility::Open
    }
}

impl fmt::Display for BuzzEligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuzzEligibility::Buzzed { rank } => write!(f, "already buzzed (rank {rank})"),
            BuzzEligibility::Closed => f.write_str("buzzers are closed"),
            BuzzEligibility::Silenced => f.write_str("buzzer is silenced"),
            BuzzEligibility::LockedOut => f.write_str("race window closed"),
            BuzzEligibility::Open => f.write_str("buzzer is open"),
        }
    }
}
