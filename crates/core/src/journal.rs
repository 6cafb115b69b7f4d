use serde::{Deserialize, Serialize};

use crate::types::{Decision, Policy};
use crate::window::SensorWindow;

pub const JOURNAL_FORMAT_VERSION: u16 = 1;

/// Everything needed to re-run an episode: the policy and every window the agent saw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeJournal {
    pub format_version: u16,
    pub build_id: String,
    pub policy: Policy,
    pub records: Vec<TickRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRecord {
    pub tick: u64,
    /// Wire symbols of the window, center omitted.
    pub window: String,
    pub decision: Decision,
}

impl EpisodeJournal {
    pub fn new(policy: Policy) -> Self {
        Self {
            format_version: JOURNAL_FORMAT_VERSION,
            build_id: "dev".to_string(),
            policy,
            records: Vec::new(),
        }
    }

    pub fn record(&mut self, tick: u64, window: &SensorWindow, decision: Decision) -> &TickRecord {
        self.records.push(TickRecord { tick, window: window.to_symbols(), decision });
        &self.records[self.records.len() - 1]
    }
}
