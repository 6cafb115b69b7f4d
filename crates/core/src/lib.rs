pub mod agent;
pub mod journal;
pub mod journal_file;
pub mod replay;
pub mod sim;
pub mod state;
pub mod types;
pub mod window;

pub use agent::Agent;
pub use journal::{EpisodeJournal, JOURNAL_FORMAT_VERSION, TickRecord};
pub use journal_file::{JournalLoadError, JournalWriter, load_journal_from_file};
pub use replay::{ReplayError, ReplayResult, replay_journal};
pub use state::{ActionEffect, AgentState, Bounds, GridMap};
pub use types::*;
pub use window::{SensorError, SensorWindow};
