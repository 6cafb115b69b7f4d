//! The per-tick decision cascade.
//! This module exists to order the navigation tiers and turn the first applicable one into an action.
//! It does not own route search, frontier search or obstacle scoring.

use tracing::{debug, warn};

use super::frontier::is_frontier;
use super::*;

impl Agent {
    /// Re-evaluate every tier in order; the first that yields a move wins.
    pub fn decide(&mut self) -> Decision {
        self.refresh_labels();

        let action = self
            .return_home()
            .or_else(|| self.collect_known_item())
            .or_else(|| self.explore_frontier())
            .or_else(|| self.detonate_best_obstacle());
        if let Some(action) = action {
            return Decision::Act(action);
        }

        debug!(tick = self.tick, pos = ?self.state.pos, "no tier applies");
        self.intent = None;
        self.planner.invalidate();
        self.log.push(LogEvent::Stalled { tick: self.tick });
        Decision::Stalled
    }

    fn return_home(&mut self) -> Option<Action> {
        let inventory = self.state.inventory;
        if !inventory.has_goal_item {
            return None;
        }
        let label = self.labels.label(Pos::ORIGIN)?;
        let allowed = if label == 0 {
            0
        } else if self.policy.spend_charges_on_return && label <= inventory.charge_count {
            label
        } else {
            return None;
        };
        let intent = Intent {
            target: Pos::ORIGIN,
            reason: AutoReason::ReturnHome,
            allowed_charges: allowed,
        };
        self.pursue(intent)
    }

    fn collect_known_item(&mut self) -> Option<Action> {
        let target = self.nearest_known_item()?;
        self.pursue(Intent { target, reason: AutoReason::Collect, allowed_charges: 0 })
    }

    /// Closest zero-charge item by Manhattan distance, then scan order.
    pub(super) fn nearest_known_item(&self) -> Option<Pos> {
        let inventory = self.state.inventory;
        let pos = self.state.pos;
        self.labels
            .labeled()
            .filter(|&(candidate, label)| {
                label == 0 && candidate != pos && is_wanted(self.map.tile_at(candidate), inventory)
            })
            .map(|(candidate, _)| candidate)
            .min_by_key(|&candidate| (manhattan(pos, candidate), candidate))
    }

    fn explore_frontier(&mut self) -> Option<Action> {
        let pos = self.state.pos;
        let target = match self.intent {
            Some(intent)
                if intent.reason == AutoReason::Frontier
                    && intent.target != pos
                    && is_frontier(&self.map, &self.labels, intent.target) =>
            {
                intent.target
            }
            _ => next_exploration_target(&self.map, &self.labels, pos)?,
        };
        self.pursue(Intent { target, reason: AutoReason::Frontier, allowed_charges: 0 })
    }

    fn detonate_best_obstacle(&mut self) -> Option<Action> {
        if self.state.inventory.charge_count == 0 {
            return None;
        }
        let has_axe = self.state.inventory.has_axe;
        let target = best_detonation_target(&self.map, &self.labels, has_axe, &self.policy)?;
        let intent =
            Intent { target: target.pos, reason: AutoReason::Detonation, allowed_charges: 1 };
        self.pursue(intent)
    }

    /// Ask the planner for the next move toward `intent.target` and adopt the intent on success.
    pub(super) fn pursue(&mut self, intent: Intent) -> Option<Action> {
        if intent.target == self.state.pos {
            return None;
        }
        let next = self.planner.next_move(
            &self.map,
            &self.labels,
            &self.state,
            intent.target,
            intent.allowed_charges,
        );
        match next {
            Some(action) => {
                self.set_intent(intent);
                Some(action)
            }
            None => {
                self.report_disagreement(intent);
                None
            }
        }
    }

    fn report_disagreement(&mut self, intent: Intent) {
        if let Some(label) = self.labels.label(intent.target)
            && label <= intent.allowed_charges.min(self.state.inventory.charge_count)
        {
            warn!(
                tick = self.tick,
                target = ?intent.target,
                label,
                allowed_charges = intent.allowed_charges,
                "planner found no route to a target the labels call reachable"
            );
            self.log.push(LogEvent::PlannerDisagreement {
                target: intent.target,
                label,
                allowed_charges: intent.allowed_charges,
            });
        }
    }
}

fn is_wanted(tile: Tile, inventory: Inventory) -> bool {
    match tile {
        Tile::GoalItem | Tile::Charge => true,
        Tile::Axe => !inventory.has_axe,
        _ => false,
    }
}
