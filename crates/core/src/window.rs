//! The 5×5 sensor window: wire decoding and rotation into world orientation.
//! The sensor always reports "forward" as the top row, so every window must be
//! rotated by the agent's heading before it can be written into the map.

use thiserror::Error;

use crate::types::{Heading, Tile};

pub const WINDOW_SIZE: usize = 5;
pub const WINDOW_RADIUS: i32 = 2;
/// Cells on the wire: the center (the agent itself) is never sent.
pub const WINDOW_BYTES: usize = WINDOW_SIZE * WINDOW_SIZE - 1;

const CENTER: usize = 2;

pub type Cells = [[Tile; WINDOW_SIZE]; WINDOW_SIZE];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("sensor window needs {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("unknown tile symbol {byte:#04x} at window index {index}")]
    UnknownSymbol { index: usize, byte: u8 },
}

/// One observation in sensor frame (row 0 is ahead of the agent).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorWindow {
    cells: Cells,
}

impl SensorWindow {
    pub fn from_cells(mut cells: Cells) -> Self {
        cells[CENTER][CENTER] = Tile::Unknown;
        Self { cells }
    }

    /// Decode the 24 row-major wire bytes (center omitted).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SensorError> {
        if bytes.len() != WINDOW_BYTES {
            return Err(SensorError::WrongLength { expected: WINDOW_BYTES, actual: bytes.len() });
        }
        let mut cells = [[Tile::Unknown; WINDOW_SIZE]; WINDOW_SIZE];
        let center_index = CENTER * WINDOW_SIZE + CENTER;
        for (index, &byte) in bytes.iter().enumerate() {
            let cell_index = if index < center_index { index } else { index + 1 };
            let tile = Tile::from_symbol(byte).ok_or(SensorError::UnknownSymbol { index, byte })?;
            cells[cell_index / WINDOW_SIZE][cell_index % WINDOW_SIZE] = tile;
        }
        Ok(Self { cells })
    }

    /// The wire form as a 24-character string.
    pub fn to_symbols(&self) -> String {
        let mut out = String::with_capacity(WINDOW_BYTES);
        for (row, line) in self.cells.iter().enumerate() {
            for (col, cell) in line.iter().enumerate() {
                if row == CENTER && col == CENTER {
                    continue;
                }
                out.push(char::from(cell.symbol()));
            }
        }
        out
    }

    pub fn cell(&self, row: usize, col: usize) -> Tile {
        self.cells[row][col]
    }

    /// Rotate so that row 0 is north and column 0 is west.
    pub fn world_oriented(&self, heading: Heading) -> Cells {
        match heading {
            Heading::North => self.cells,
            Heading::East => rotate_clockwise(&self.cells),
            Heading::South => rotate_half(&self.cells),
            Heading::West => rotate_counter_clockwise(&self.cells),
        }
    }
}

fn rotate_clockwise(cells: &Cells) -> Cells {
    let mut out = *cells;
    for (i, line) in out.iter_mut().enumerate() {
        for (j, cell) in line.iter_mut().enumerate() {
            *cell = cells[WINDOW_SIZE - 1 - j][i];
        }
    }
    out
}

fn rotate_counter_clockwise(cells: &Cells) -> Cells {
    let mut out = *cells;
    for (i, line) in out.iter_mut().enumerate() {
        for (j, cell) in line.iter_mut().enumerate() {
            *cell = cells[j][WINDOW_SIZE - 1 - i];
        }
    }
    out
}

fn rotate_half(cells: &Cells) -> Cells {
    let mut out = *cells;
    for (i, line) in out.iter_mut().enumerate() {
        for (j, cell) in line.iter_mut().enumerate() {
            *cell = cells[WINDOW_SIZE - 1 - i][WINDOW_SIZE - 1 - j];
        }
    }
    out
}
