//! The per-episode decision core: owns the map, inventory, derived labels and path cache.
//! Each tick merges one sensor window, refreshes derived data, and emits one decision.

use tracing::{debug, info, trace};

use crate::state::{ActionEffect, AgentState, GridMap};
use crate::types::*;
use crate::window::SensorWindow;

mod access;
mod frontier;
mod hash;
mod pathfinding;
mod policy;
mod targets;

pub use access::{AccessLabels, relabel, step_cost};
pub use frontier::next_exploration_target;
pub use pathfinding::{PathPlanner, PlannedStep, manhattan, neighbors, plan_route};
pub use targets::{DetonationTarget, UnlockScore, best_detonation_target};

#[cfg(test)]
mod test_support;

pub struct Agent {
    state: AgentState,
    map: GridMap,
    labels: AccessLabels,
    planner: PathPlanner,
    policy: Policy,
    intent: Option<Intent>,
    tick: u64,
    log: Vec<LogEvent>,
}

impl Agent {
    /// A fresh episode: the start position is the coordinate origin, facing north.
    pub fn new(policy: Policy) -> Self {
        let state = AgentState::default();
        let map = GridMap::new(state.pos);
        let labels = relabel(&map, state.pos, state.inventory.has_axe);
        Self {
            state,
            map,
            labels,
            planner: PathPlanner::default(),
            policy,
            intent: None,
            tick: 0,
            log: Vec::new(),
        }
    }

    /// One full tick: observe, decide, and account for the chosen action.
    pub fn step(&mut self, window: &SensorWindow) -> Decision {
        self.observe(window);
        let decision = self.decide();
        if let Decision::Act(action) = decision {
            self.commit(action);
        }
        self.tick += 1;
        decision
    }

    /// Merge a window taken at the current position and heading.
    pub fn observe(&mut self, window: &SensorWindow) -> bool {
        let changed = self.map.merge(window, self.state.pos, self.state.heading);
        if changed {
            trace!(tick = self.tick, revision = self.map.revision(), "map changed");
        }
        self.refresh_labels();
        changed
    }

    /// Record the effect of an action the agent is about to send.
    pub fn commit(&mut self, action: Action) -> ActionEffect {
        let ahead = self.state.ahead();
        let effect = self.state.apply(action, &mut self.map);
        match effect {
            ActionEffect::Collected(item) => {
                if item == Tile::GoalItem {
                    info!(tick = self.tick, "goal item collected, heading home");
                } else {
                    debug!(tick = self.tick, ?item, "item collected");
                }
                self.log.push(LogEvent::ItemCollected { item, at: self.state.pos });
            }
            ActionEffect::Cleared(obstacle) => {
                debug!(tick = self.tick, ?obstacle, ?action, "obstacle cleared");
                self.log.push(LogEvent::Cleared { obstacle, at: ahead, action });
            }
            ActionEffect::Blocked => {
                debug!(tick = self.tick, ?action, pos = ?self.state.pos, "action had no effect");
            }
            ActionEffect::Turned | ActionEffect::Moved => {}
        }
        effect
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn labels(&self) -> &AccessLabels {
        &self.labels
    }

    pub fn intent(&self) -> Option<Intent> {
        self.intent
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn log(&self) -> &[LogEvent] {
        &self.log
    }

    /// Recompute labels when the map, the axe, or the zero-cost region of the agent changed.
    /// Any relabel drops the cached path.
    fn refresh_labels(&mut self) {
        let pos = self.state.pos;
        let has_axe = self.state.inventory.has_axe;
        let stale = self.labels.revision() != self.map.revision()
            || self.labels.has_axe() != has_axe
            || (self.labels.origin() != pos && self.labels.label(pos) != Some(0));
        if !stale {
            return;
        }
        self.labels = relabel(&self.map, pos, has_axe);
        self.planner.invalidate();
        trace!(tick = self.tick, origin = ?pos, has_axe, "labels recomputed");
    }

    fn set_intent(&mut self, intent: Intent) {
        let reason_changed = self.intent.map(|current| current.reason) != Some(intent.reason);
        if reason_changed {
            self.log.push(LogEvent::ReasonChanged { reason: intent.reason, target: intent.target });
        }
        if self.intent != Some(intent) {
            debug!(
                tick = self.tick,
                reason = ?intent.reason,
                target = ?intent.target,
                allowed_charges = intent.allowed_charges,
                "intent updated"
            );
        }
        self.intent = Some(intent);
    }
}
