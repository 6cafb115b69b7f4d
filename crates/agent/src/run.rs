//! The live read-decide-write loop.
//! This module exists to connect a `Session` to an `Agent` and an optional journal file.
//! It does not own the transport or the process lifecycle; `main` does.

use std::io::{Read, Write};

use scout_core::{Agent, Decision, JournalWriter, TickRecord};
use tracing::{debug, info, warn};

use crate::session::{Session, SessionError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// The server closed the stream; usually the episode is over.
    StreamClosed,
    /// The agent had nothing left to do.
    Stalled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    pub end: SessionEnd,
    pub ticks: u64,
    pub final_snapshot_hash: u64,
}

pub fn run_session<R: Read, W: Write>(
    session: &mut Session<R, W>,
    agent: &mut Agent,
    mut journal: Option<&mut JournalWriter>,
) -> Result<SessionSummary, SessionError> {
    let end = loop {
        let window = match session.receive_window() {
            Ok(window) => window,
            Err(SessionError::StreamClosed) => break SessionEnd::StreamClosed,
            Err(err) => return Err(err),
        };
        let tick = agent.current_tick();
        let decision = agent.step(&window);
        if let Some(writer) = journal.as_deref_mut() {
            writer.append(&TickRecord { tick, window: window.to_symbols(), decision })?;
        }
        match decision {
            Decision::Act(action) => {
                debug!(tick, ?action, "sending action");
                session.send_action(action)?;
            }
            Decision::Stalled => {
                warn!(tick, "no reachable target left, ending session");
                break SessionEnd::Stalled;
            }
        }
    };

    let summary = SessionSummary {
        end,
        ticks: agent.current_tick(),
        final_snapshot_hash: agent.snapshot_hash(),
    };
    info!(
        end = ?summary.end,
        ticks = summary.ticks,
        hash = summary.final_snapshot_hash,
        "session finished"
    );
    Ok(summary)
}
