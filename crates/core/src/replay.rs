//! Journal replay: re-run the agent over recorded windows and check every decision.
//! This module exists so an episode can be verified without the world that produced it.
//! It does not own journal persistence; see `journal_file` for that.

use thiserror::Error;

use crate::agent::Agent;
use crate::journal::EpisodeJournal;
use crate::types::Decision;
use crate::window::{SensorError, SensorWindow};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("window recorded at tick {tick} does not decode: {source}")]
    BadWindow { tick: u64, source: SensorError },
    #[error("decision diverged at tick {tick}: recorded {recorded:?}, replayed {replayed:?}")]
    Diverged { tick: u64, recorded: Decision, replayed: Decision },
    #[error("expected a record for tick {expected}, found tick {found}")]
    OutOfOrder { expected: u64, found: u64 },
}

#[derive(Debug, PartialEq)]
pub struct ReplayResult {
    pub final_snapshot_hash: u64,
    pub final_tick: u64,
}

pub fn replay_journal(journal: &EpisodeJournal) -> Result<ReplayResult, ReplayError> {
    let mut agent = Agent::new(journal.policy);

    for record in &journal.records {
        let expected = agent.current_tick();
        if record.tick != expected {
            return Err(ReplayError::OutOfOrder { expected, found: record.tick });
        }
        let window = SensorWindow::from_bytes(record.window.as_bytes())
            .map_err(|source| ReplayError::BadWindow { tick: record.tick, source })?;
        let replayed = agent.step(&window);
        if replayed != record.decision {
            return Err(ReplayError::Diverged {
                tick: record.tick,
                recorded: record.decision,
                replayed,
            });
        }
    }

    Ok(ReplayResult { final_snapshot_hash: agent.snapshot_hash(), final_tick: agent.current_tick() })
}
