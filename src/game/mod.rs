//! Pure game rules. Nothing in here touches the store or the clock directly.

pub mod boon;
pub mod clock;
pub mod effects;
pub mod gauntlet;
pub mod inventory;
pub mod race;
pub mod view;
pub mod vote;
pub mod wager;
