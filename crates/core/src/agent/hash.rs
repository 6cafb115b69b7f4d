//! Stable snapshot hashing for deterministic verification.
//! This module exists to keep hashing concerns separate from the decision cascade.
//! It does not own replay execution or journal persistence.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::*;

impl Agent {
    /// Hash of everything that can influence future decisions.
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.tick);
        hasher.write_i32(self.state.pos.y);
        hasher.write_i32(self.state.pos.x);
        hasher.write_u8(self.state.heading as u8);

        let inventory = self.state.inventory;
        hasher.write_u8(u8::from(inventory.has_axe));
        hasher.write_u8(u8::from(inventory.has_goal_item));
        hasher.write_u8(u8::from(inventory.on_boat));
        hasher.write_u32(inventory.charge_count);

        hasher.write_u8(u8::from(self.policy.detonate_trees));
        hasher.write_u8(u8::from(self.policy.spend_charges_on_return));

        let bounds = self.map.observed_bounds();
        for corner in [bounds.min, bounds.max] {
            hasher.write_i32(corner.y);
            hasher.write_i32(corner.x);
        }
        for pos in bounds.positions() {
            hasher.write_u8(self.map.tile_at(pos).symbol());
        }

        if let Some(intent) = self.intent {
            hasher.write_i32(intent.target.y);
            hasher.write_i32(intent.target.x);
            hasher.write_u8(intent.reason as u8);
            hasher.write_u32(intent.allowed_charges);
        }
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::test_support::*;

    #[test]
    fn identical_histories_hash_identically() {
        let window = SensorWindow::from_cells([[Tile::Empty; 5]; 5]);
        let mut first = Agent::new(Policy::default());
        let mut second = Agent::new(Policy::default());
        first.step(&window);
        second.step(&window);
        assert_eq!(first.snapshot_hash(), second.snapshot_hash());
    }

    #[test]
    fn inventory_changes_the_hash() {
        let rows = ["  ", "^ "];
        let plain = fixture_agent(&rows, Inventory::default(), Policy::default());
        let armed = fixture_agent(&rows, charges(1), Policy::default());
        assert_ne!(plain.snapshot_hash(), armed.snapshot_hash());
    }
}
