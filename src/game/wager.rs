//! Double-jeopardy wager side protocol.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    game::{boon::BoonId, clock::Millis},
    store::models::{DjOffer, LastWinner, TeamKey},
};

/// Settlement of a wager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WagerOutcome {
    /// The team took the wager.
    Accepted,
    /// Declined, or left to expire.
    Rejected,
}

/// Reason an offer or decision was ignored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WagerRejection {
    /// Another offer is still open.
    #[error("an offer is already outstanding")]
    OfferOutstanding,
    /// The team is not the Double Jeopardy winner.
    #[error("team did not just win Double Jeopardy")]
    NotEligible,
    /// Nothing open for this team.
    #[error("no offer is outstanding for this team")]
    NoOffer,
    /// The decision window has closed.
    #[error("the offer has expired")]
    Expired,
}

/// An offer requires the team to have just won DOUBLE_JEOPARDY and no other
/// offer to be pending.
pub fn can_offer(
    team: &TeamKey,
    last_winner: Option<&LastWinner>,
    outstanding: Option<&DjOffer>,
) -> Result<(), WagerRejection> {
    if outstanding.is_some() {
        return Err(WagerRejection::OfferOutstanding);
    }
    match last_winner {
        Some(winner) if winner.boon_id == BoonId::DoubleJeopardy && team.matches(&winner.team) => {
            Ok(())
        }
        _ => Err(WagerRejection::NotEligible),
    }
}

/// Fresh offer to `team` that expires `window_ms` after `now`.
pub fn new_offer(team: &str, now: Millis, window_ms: Millis) -> DjOffer {
    DjOffer {
        id: Uuid::new_v4(),
        team: team.to_owned(),
        expires_at: now + window_ms,
    }
}

/// Whether the decision window closed at or before `now`.
pub fn is_expired(offer: &DjOffer, now: Millis) -> bool {
    now >= offer.expires_at
}

/// Validate a decision from `team` against the outstanding offer.
pub fn check_decision<'a>(
    team: &TeamKey,
    outstanding: Option<&'a DjOffer>,
    now: Millis,
) -> Result<&'a DjOffer, WagerRejection> {
    let offer = outstanding
        .filter(|offer| team.matches(&offer.team))
        .ok_or(WagerRejection::NoOffer)?;
    if is_expired(offer, now) {
        return Err(WagerRejection::Expired);
    }
    Ok(offer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winner(team: &str, boon_id: BoonId) -> LastWinner {
        LastWinner {
            team: team.into(),
            boon_id,
        }
    }

    #[test]
    fn offers_need_a_fresh_double_jeopardy_win() {
        let owls = TeamKey::normalize("Owls");
        let dj = winner("owls", BoonId::DoubleJeopardy);

        assert_eq!(can_offer(&owls, Some(&dj), None), Ok(()));
        assert_eq!(
            can_offer(&owls, Some(&winner("owls", BoonId::Priority)), None),
            Err(WagerRejection::NotEligible)
        );
        assert_eq!(
            can_offer(&TeamKey::normalize("bats"), Some(&dj), None),
            Err(WagerRejection::NotEligible)
        );
        assert_eq!(can_offer(&owls, None, None), Err(WagerRejection::NotEligible));

        let pending = new_offer("Owls", 0, 10_000);
        assert_eq!(
            can_offer(&owls, Some(&dj), Some(&pending)),
            Err(WagerRejection::OfferOutstanding)
        );
    }

    #[test]
    fn decisions_are_bound_to_the_offered_team_and_window() {
        let offer = new_offer("Owls", 1_000, 10_000);
        let owls = TeamKey::normalize("owls");

        assert_eq!(offer.expires_at, 11_000);
        assert!(check_decision(&owls, Some(&offer), 10_999).is_ok());
        assert_eq!(
            check_decision(&owls, Some(&offer), 11_000),
            Err(WagerRejection::Expired)
        );
        assert_eq!(
            check_decision(&TeamKey::normalize("bats"), Some(&offer), 2_000),
            Err(WagerRejection::NoOffer)
        );
        assert_eq!(check_decision(&owls, None, 0), Err(WagerRejection::NoOffer));
    }
}
