//! Frontier selection: the nearest free tile whose sensor neighborhood is still partly unknown.

use std::collections::{BTreeSet, VecDeque};

use super::*;

/// Breadth-first over zero-charge tiles from `start` in N, E, S, W order.
pub fn next_exploration_target(map: &GridMap, labels: &AccessLabels, start: Pos) -> Option<Pos> {
    if labels.label(start) != Some(0) {
        return None;
    }

    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if current != start && is_frontier(map, labels, current) {
            return Some(current);
        }
        for neighbor in neighbors(current) {
            if labels.label(neighbor) == Some(0) && visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }
    None
}

pub(super) fn is_frontier(map: &GridMap, labels: &AccessLabels, pos: Pos) -> bool {
    labels.label(pos) == Some(0) && !map.is_fully_observed(pos)
}
