//! Headless episode loop: sense, decide, execute, journal.

use tracing::{debug, info};

use super::*;
use crate::agent::Agent;
use crate::journal::EpisodeJournal;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpisodeStopReason {
    Won,
    /// The agent had no valid action left.
    Stalled,
    Drowned,
    BudgetExhausted,
    /// The world refused an action the agent believed was legal.
    Rejected { tick: u64, action: Action },
}

#[derive(Clone, Debug)]
pub struct EpisodeResult {
    pub stop_reason: EpisodeStopReason,
    pub ticks: u64,
    pub final_snapshot_hash: u64,
    pub journal: EpisodeJournal,
    pub log: Vec<LogEvent>,
}

/// Drive a fresh agent through `world` for at most `max_ticks` decisions.
pub fn run_episode(world: &mut World, policy: Policy, max_ticks: u64) -> EpisodeResult {
    run_episode_observed(world, policy, max_ticks, |_, _| {})
}

/// As [`run_episode`], calling `observe` after every executed action.
pub fn run_episode_observed(
    world: &mut World,
    policy: Policy,
    max_ticks: u64,
    mut observe: impl FnMut(&Agent, &World),
) -> EpisodeResult {
    let mut agent = Agent::new(policy);
    let mut journal = EpisodeJournal::new(policy);
    info!(spawn = ?world.spawn(), max_ticks, "episode started");

    let stop_reason = loop {
        if agent.current_tick() >= max_ticks {
            break EpisodeStopReason::BudgetExhausted;
        }
        let tick = agent.current_tick();
        let window = world.sensor_window();
        let decision = agent.step(&window);
        journal.record(tick, &window, decision);

        let Decision::Act(action) = decision else {
            break EpisodeStopReason::Stalled;
        };
        let outcome = world.execute(action);
        debug!(tick, ?action, ?outcome, "action executed");
        observe(&agent, world);
        match outcome {
            StepOutcome::Won => break EpisodeStopReason::Won,
            StepOutcome::Drowned => break EpisodeStopReason::Drowned,
            StepOutcome::Blocked => break EpisodeStopReason::Rejected { tick, action },
            StepOutcome::Turned
            | StepOutcome::Moved
            | StepOutcome::Collected(_)
            | StepOutcome::Cleared(_) => {}
        }
    };

    let ticks = agent.current_tick();
    let final_snapshot_hash = agent.snapshot_hash();
    info!(?stop_reason, ticks, final_snapshot_hash, "episode finished");
    EpisodeResult { stop_reason, ticks, final_snapshot_hash, journal, log: agent.log().to_vec() }
}
