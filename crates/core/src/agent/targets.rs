//! Detonation target scoring.
//! This module exists to rank single-charge obstacles by what clearing them would open up.
//! It does not own routing to the chosen obstacle or the decision to spend the charge.

use std::collections::{BTreeSet, VecDeque};

use tracing::debug;

use super::*;

/// Value unlocked by clearing one obstacle; compares goal first, then tools, then area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnlockScore {
    pub goal: bool,
    pub tools: u32,
    pub tiles: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetonationTarget {
    pub pos: Pos,
    pub score: UnlockScore,
}

/// The one-charge obstacle worth clearing most, in scan order on ties.
pub fn best_detonation_target(
    map: &GridMap,
    labels: &AccessLabels,
    has_axe: bool,
    policy: &Policy,
) -> Option<DetonationTarget> {
    let mut best: Option<DetonationTarget> = None;
    for (pos, label) in labels.labeled() {
        if label != 1 || !is_candidate(map.tile_at(pos), has_axe, policy) {
            continue;
        }
        let score = unlock_score(map, labels, pos, has_axe);
        let target = DetonationTarget { pos, score };
        if score.goal {
            debug!(?pos, "obstacle hides the goal item");
            return Some(target);
        }
        if best.is_none_or(|current| score > current.score) {
            best = Some(target);
        }
    }
    if let Some(target) = best {
        debug!(
            pos = ?target.pos,
            tools = target.score.tools,
            tiles = target.score.tiles,
            "detonation target"
        );
    }
    best
}

fn is_candidate(tile: Tile, has_axe: bool, policy: &Policy) -> bool {
    match tile {
        Tile::Boulder => true,
        Tile::Tree => !has_axe && policy.detonate_trees,
        _ => false,
    }
}

/// Flood outward from a cleared `obstacle` over tiles not already free to reach.
pub(super) fn unlock_score(
    map: &GridMap,
    labels: &AccessLabels,
    obstacle: Pos,
    has_axe: bool,
) -> UnlockScore {
    let mut score = UnlockScore { tiles: 1, ..UnlockScore::default() };
    let mut axe_found = has_axe;
    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::new();
    visited.insert(obstacle);
    queue.push_back(obstacle);

    while let Some(current) = queue.pop_front() {
        let from = if current == obstacle { Tile::Empty } else { map.tile_at(current) };
        for next in neighbors(current) {
            if labels.label(next) == Some(0) || visited.contains(&next) {
                continue;
            }
            let tile = map.tile_at(next);
            let passable = match tile {
                Tile::Unknown | Tile::Boulder => false,
                Tile::Tree => axe_found,
                Tile::Water => from.is_boatable(),
                _ => true,
            };
            if !passable {
                continue;
            }
            visited.insert(next);
            queue.push_back(next);
            score.tiles += 1;
            match tile {
                Tile::GoalItem => {
                    score.goal = true;
                    return score;
                }
                Tile::Charge => score.tools += 1,
                Tile::Axe if !axe_found => {
                    score.tools += 1;
                    axe_found = true;
                    // Every known tree is now a free step away.
                    for tree in map.positions_of(Tile::Tree) {
                        if labels.label(tree) != Some(0) && visited.insert(tree) {
                            queue.push_back(tree);
                            score.tiles += 1;
                        }
                    }
                }
                _ => {}
            }
        }
    }
    score
}
