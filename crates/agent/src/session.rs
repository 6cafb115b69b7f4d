//! Byte-level conversation with the game server.
//! This module exists to turn a raw duplex stream into windows in and actions out.
//! It does not own any decision making or journaling.

use std::io::{self, Read, Write};

use scout_core::window::WINDOW_BYTES;
use scout_core::{Action, SensorError, SensorWindow};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The server hung up, either between windows or part way through one.
    #[error("sensor stream closed")]
    StreamClosed,
    #[error("session I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed sensor window: {0}")]
    Sensor(#[from] SensorError),
}

pub struct Session<R, W> {
    reader: R,
    writer: W,
    buffer: [u8; WINDOW_BYTES],
}

impl<R: Read, W: Write> Session<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer, buffer: [0; WINDOW_BYTES] }
    }

    /// Block until one full window has arrived.
    pub fn receive_window(&mut self) -> Result<SensorWindow, SessionError> {
        match self.reader.read_exact(&mut self.buffer) {
            Ok(()) => Ok(SensorWindow::from_bytes(&self.buffer)?),
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                Err(SessionError::StreamClosed)
            }
            Err(err) => Err(SessionError::Io(err)),
        }
    }

    pub fn send_action(&mut self, action: Action) -> Result<(), SessionError> {
        self.writer.write_all(&[action.symbol()])?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}
