//! Inventory ledger rules: a team's held, unspent boons.

use crate::game::boon::BoonId;

/// Whether the inventory holds at least one copy of `boon`.
pub fn holds(inventory: &[BoonId], boon: BoonId) -> bool {
    inventory.contains(&boon)
}

/// Add a freshly won boon at the end of the inventory.
pub fn grant(inventory: &mut Vec<BoonId>, boon: BoonId) {
    inventory.push(boon);
}

/// Spend one copy of `boon`, keeping the order of the others.
///
/// Returns `false` when the boon was not held.
pub fn spend(inventory: &mut Vec<BoonId>, boon: BoonId) -> bool {
    match inventory.iter().position(|held| *held == boon) {
        Some(index) => {
            inventory.remove(index);
            true
        }
        None => false,
    }
}
