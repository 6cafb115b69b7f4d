//! On-disk episode journal: one JSON header line, then one hash-chained line per tick.
//! This module exists so a live session leaves behind a tamper-evident record that
//! `replay_journal` can verify later. It does not own replay or the in-memory journal type.
//!
//! Every tick line carries the SHA-256 of its own entry plus the previous line's digest, so
//! editing, dropping or reordering a line breaks the chain at that line.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::mem;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::journal::{EpisodeJournal, JOURNAL_FORMAT_VERSION, TickRecord};
use crate::types::{Decision, Policy};

/// Digest that precedes the first tick line.
const GENESIS_DIGEST: &str = "0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Serialize, Deserialize)]
struct Header {
    format_version: u16,
    build_id: String,
    policy: Policy,
}

/// The hashed part of a tick line.
#[derive(Serialize, Deserialize)]
struct Entry {
    seq: u64,
    tick: u64,
    window: String,
    decision: Decision,
}

#[derive(Serialize, Deserialize)]
struct ChainedLine {
    #[serde(flatten)]
    entry: Entry,
    prev_digest: String,
    digest: String,
}

/// Running state of the hash chain, shared by the writer and the loader.
struct Chain {
    head: String,
    next_seq: u64,
}

impl Chain {
    fn start() -> Self {
        Self { head: GENESIS_DIGEST.to_string(), next_seq: 0 }
    }

    fn digest(entry: &Entry, prev_digest: &str) -> serde_json::Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_string(entry)?.as_bytes());
        hasher.update(prev_digest.as_bytes());
        Ok(format!("{:064x}", hasher.finalize()))
    }

    fn link(&mut self, record: &TickRecord) -> serde_json::Result<ChainedLine> {
        let entry = Entry {
            seq: self.next_seq,
            tick: record.tick,
            window: record.window.clone(),
            decision: record.decision,
        };
        let digest = Self::digest(&entry, &self.head)?;
        let prev_digest = mem::replace(&mut self.head, digest.clone());
        self.next_seq += 1;
        Ok(ChainedLine { entry, prev_digest, digest })
    }

    fn accept(&mut self, line: ChainedLine, number: usize) -> Result<TickRecord, JournalLoadError> {
        if line.entry.seq != self.next_seq {
            return Err(JournalLoadError::InvalidRecord {
                line: number,
                message: format!("expected seq {}, found {}", self.next_seq, line.entry.seq),
            });
        }
        let recomputed = Self::digest(&line.entry, &self.head).map_err(|e| {
            JournalLoadError::InvalidRecord { line: number, message: e.to_string() }
        })?;
        if line.prev_digest != self.head || line.digest != recomputed {
            return Err(JournalLoadError::HashChainBroken { line: number });
        }
        self.head = line.digest;
        self.next_seq += 1;
        let Entry { tick, window, decision, .. } = line.entry;
        Ok(TickRecord { tick, window, decision })
    }
}

/// Appends decided ticks to a journal file, flushing after every line.
pub struct JournalWriter {
    out: BufWriter<File>,
    chain: Chain,
}

impl JournalWriter {
    /// Create (or truncate) `path` and write the header line.
    pub fn create(path: &Path, build_id: &str, policy: Policy) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = Self { out: BufWriter::new(File::create(path)?), chain: Chain::start() };
        let header =
            Header { format_version: JOURNAL_FORMAT_VERSION, build_id: build_id.to_string(), policy };
        writer.write_line(&header)?;
        Ok(writer)
    }

    pub fn append(&mut self, record: &TickRecord) -> io::Result<()> {
        let line = self.chain.link(record).map_err(io::Error::other)?;
        self.write_line(&line)
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        let json = serde_json::to_string(value).map_err(io::Error::other)?;
        writeln!(self.out, "{json}")?;
        self.out.flush()
    }
}

#[derive(Debug, Error)]
pub enum JournalLoadError {
    #[error("journal I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("journal file is empty")]
    EmptyFile,
    #[error("invalid journal header at line {line}: {message}")]
    InvalidHeader { line: usize, message: String },
    #[error("invalid journal record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },
    /// The file ends without a newline, usually because the writer was killed mid-line.
    #[error("incomplete journal line at line {line}")]
    IncompleteLine { line: usize },
    #[error("SHA-256 hash chain broken at line {line}")]
    HashChainBroken { line: usize },
}

/// Read and verify a whole journal file. Fails at the first line that does not check out.
pub fn load_journal_from_file(path: &Path) -> Result<EpisodeJournal, JournalLoadError> {
    let content = fs::read_to_string(path)?;
    let mut lines = content.lines();
    let Some(first) = lines.next() else {
        return Err(JournalLoadError::EmptyFile);
    };
    if !content.ends_with('\n') {
        return Err(JournalLoadError::IncompleteLine { line: content.lines().count() });
    }

    let header: Header = serde_json::from_str(first)
        .map_err(|e| JournalLoadError::InvalidHeader { line: 1, message: e.to_string() })?;
    if header.format_version != JOURNAL_FORMAT_VERSION {
        return Err(JournalLoadError::InvalidHeader {
            line: 1,
            message: format!("unsupported format version {}", header.format_version),
        });
    }

    let mut journal = EpisodeJournal {
        format_version: header.format_version,
        build_id: header.build_id,
        policy: header.policy,
        records: Vec::new(),
    };
    let mut chain = Chain::start();
    // Line 1 is the header.
    for (number, text) in (2..).zip(lines) {
        let line: ChainedLine = serde_json::from_str(text).map_err(|e| {
            JournalLoadError::InvalidRecord { line: number, message: e.to_string() }
        })?;
        journal.records.push(chain.accept(line, number)?);
    }
    Ok(journal)
}

#[cfg(test)]
mod tests;
