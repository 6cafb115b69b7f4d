//! Accessibility labels: the fewest clearing charges needed to walk to each known tile.
//! Labels are always rebuilt from scratch; terrain edits move costs non-locally.

use std::collections::BTreeSet;

use super::*;
use crate::state::Bounds;

#[derive(Clone, Debug)]
pub struct AccessLabels {
    origin: Pos,
    has_axe: bool,
    revision: u64,
    bounds: Bounds,
    labels: Vec<Option<u32>>,
}

impl AccessLabels {
    /// Minimum charges to reach `pos`, or `None` when it cannot be reached at all.
    pub fn label(&self, pos: Pos) -> Option<u32> {
        self.bounds.index(pos).and_then(|idx| self.labels[idx])
    }

    pub fn origin(&self) -> Pos {
        self.origin
    }

    pub fn has_axe(&self) -> bool {
        self.has_axe
    }

    /// Map revision the labels were computed against.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn labeled(&self) -> impl Iterator<Item = (Pos, u32)> + '_ {
        self.bounds.positions().filter_map(|pos| self.label(pos).map(|label| (pos, label)))
    }
}

impl PartialEq for AccessLabels {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin
            && self.has_axe == other.has_axe
            && self.bounds == other.bounds
            && self.labels == other.labels
    }
}

/// Charges spent stepping from `from` onto `onto`; `None` when the step is impossible.
pub fn step_cost(from: Tile, onto: Tile, has_axe: bool) -> Option<u32> {
    match onto {
        Tile::Unknown => None,
        Tile::Empty | Tile::Axe | Tile::Charge | Tile::Boat | Tile::GoalItem => Some(0),
        // Water only continues a boat trip.
        Tile::Water => from.is_boatable().then_some(0),
        Tile::Tree if has_axe => Some(0),
        Tile::Tree | Tile::Boulder => Some(1),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenLabel {
    cost: u32,
    y: i32,
    x: i32,
}

pub fn relabel(map: &GridMap, start: Pos, has_axe: bool) -> AccessLabels {
    let bounds = map.observed_bounds();
    let mut labels = vec![None; bounds.width() * bounds.height()];
    let mut open = BTreeSet::new();

    if let Some(idx) = bounds.index(start) {
        labels[idx] = Some(0);
        open.insert(OpenLabel { cost: 0, y: start.y, x: start.x });
    }

    while let Some(current) = open.pop_first() {
        let pos = Pos { y: current.y, x: current.x };
        let Some(idx) = bounds.index(pos) else {
            continue;
        };
        // Superseded by a cheaper entry.
        if labels[idx] != Some(current.cost) {
            continue;
        }
        let from = map.tile_at(pos);
        for next in neighbors(pos) {
            let Some(next_idx) = bounds.index(next) else {
                continue;
            };
            let Some(step) = step_cost(from, map.tile_at(next), has_axe) else {
                continue;
            };
            let cost = current.cost + step;
            if labels[next_idx].is_none_or(|known| cost < known) {
                labels[next_idx] = Some(cost);
                open.insert(OpenLabel { cost, y: next.y, x: next.x });
            }
        }
    }

    AccessLabels { origin: start, has_axe, revision: map.revision(), bounds, labels }
}
