//! The ground-truth world: parsing, sensing, and action execution.

use thiserror::Error;

use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldParseError {
    #[error("world has no rows")]
    Empty,
    #[error("world has no agent marker (one of ^ > v <)")]
    MissingAgent,
    #[error("second agent marker at row {row}, column {col}")]
    DuplicateAgent { row: usize, col: usize },
    #[error("unknown world symbol {symbol:?} at row {row}, column {col}")]
    UnknownSymbol { row: usize, col: usize, symbol: char },
}

/// What one executed action did in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Turned,
    Moved,
    Collected(Tile),
    Cleared(Tile),
    /// The action had no effect.
    Blocked,
    /// Stepped into water without a boat; the episode is over.
    Drowned,
    /// Arrived at the spawn point carrying the goal item.
    Won,
}

/// What lies beyond the parsed or generated cells: solid rock, so every world is finite.
const OUTSIDE: Tile = Tile::Boulder;

#[derive(Clone, Debug)]
pub struct World {
    terrain: GridMap,
    bounds: Bounds,
    spawn: Pos,
    spawn_heading: Heading,
    agent: AgentState,
    drowned: bool,
}

impl World {
    /// Parse a world from wire-symbol rows with exactly one agent marker.
    pub fn from_rows(rows: &[&str]) -> Result<Self, WorldParseError> {
        if rows.is_empty() {
            return Err(WorldParseError::Empty);
        }
        let mut spawn = None;
        let mut cells = Vec::new();
        for (row, line) in rows.iter().enumerate() {
            for (col, symbol) in line.chars().enumerate() {
                let pos = Pos { y: row as i32, x: col as i32 };
                let heading = match symbol {
                    '^' => Some(Heading::North),
                    '>' => Some(Heading::East),
                    'v' => Some(Heading::South),
                    '<' => Some(Heading::West),
                    _ => None,
                };
                if let Some(heading) = heading {
                    if spawn.is_some() {
                        return Err(WorldParseError::DuplicateAgent { row, col });
                    }
                    spawn = Some((pos, heading));
                    continue;
                }
                let tile = u8::try_from(symbol)
                    .ok()
                    .and_then(Tile::from_symbol)
                    .filter(|tile| *tile != Tile::Unknown)
                    .ok_or(WorldParseError::UnknownSymbol { row, col, symbol })?;
                cells.push((pos, tile));
            }
        }
        let (spawn, heading) = spawn.ok_or(WorldParseError::MissingAgent)?;
        Ok(Self::from_cells(cells, spawn, heading))
    }

    pub(super) fn from_cells(cells: Vec<(Pos, Tile)>, spawn: Pos, heading: Heading) -> Self {
        let mut terrain = GridMap::new(spawn);
        let mut bounds = Bounds::single(spawn);
        for (pos, tile) in cells {
            terrain.set_tile(pos, tile);
            bounds.include(pos);
        }
        let agent = AgentState { pos: spawn, heading, inventory: Inventory::default() };
        Self { terrain, bounds, spawn, spawn_heading: heading, agent, drowned: false }
    }

    /// True terrain at `pos`; everything outside the world is rock.
    pub fn tile_at(&self, pos: Pos) -> Tile {
        match self.terrain.tile_at(pos) {
            Tile::Unknown => OUTSIDE,
            tile => tile,
        }
    }

    pub fn agent(&self) -> &AgentState {
        &self.agent
    }

    pub fn spawn(&self) -> Pos {
        self.spawn
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn is_won(&self) -> bool {
        self.agent.pos == self.spawn && self.agent.inventory.has_goal_item
    }

    pub fn is_drowned(&self) -> bool {
        self.drowned
    }

    /// The 5×5 view in sensor frame: row 0 lies ahead of the agent.
    pub fn sensor_window(&self) -> SensorWindow {
        let forward = self.agent.heading.delta();
        let right = self.agent.heading.turn_right().delta();
        let mut cells = [[Tile::Unknown; WINDOW_SIZE]; WINDOW_SIZE];
        for (row, line) in cells.iter_mut().enumerate() {
            for (col, cell) in line.iter_mut().enumerate() {
                let ahead = WINDOW_RADIUS - row as i32;
                let side = col as i32 - WINDOW_RADIUS;
                let pos = self.agent.pos.offset(
                    ahead * forward.0 + side * right.0,
                    ahead * forward.1 + side * right.1,
                );
                *cell = self.tile_at(pos);
            }
        }
        SensorWindow::from_cells(cells)
    }

    /// Where the agent believes it is: coordinates relative to the spawn point and heading.
    pub fn agent_frame_pose(&self) -> (Pos, Heading) {
        let forward = self.spawn_heading.delta();
        let right = self.spawn_heading.turn_right().delta();
        let dy = self.agent.pos.y - self.spawn.y;
        let dx = self.agent.pos.x - self.spawn.x;
        let pos = Pos { y: -(dy * forward.0 + dx * forward.1), x: dy * right.0 + dx * right.1 };
        let turns = (self.agent.heading as usize + 4 - self.spawn_heading as usize) % 4;
        (pos, Heading::ALL[turns])
    }

    pub fn execute(&mut self, action: Action) -> StepOutcome {
        if self.drowned {
            return StepOutcome::Drowned;
        }
        let ahead = self.agent.ahead();
        if !self.terrain.is_known(ahead) {
            // Rock beyond the edge can still be blasted, so it has to exist in the terrain.
            self.terrain.set_tile(ahead, OUTSIDE);
        }
        if action == Action::Forward
            && self.terrain.tile_at(ahead) == Tile::Water
            && !self.agent.inventory.on_boat
        {
            self.drowned = true;
            return StepOutcome::Drowned;
        }
        let effect = self.agent.apply(action, &mut self.terrain);
        if self.is_won() {
            return StepOutcome::Won;
        }
        match effect {
            ActionEffect::Turned => StepOutcome::Turned,
            ActionEffect::Moved => StepOutcome::Moved,
            ActionEffect::Collected(item) => StepOutcome::Collected(item),
            ActionEffect::Cleared(obstacle) => StepOutcome::Cleared(obstacle),
            ActionEffect::Blocked => StepOutcome::Blocked,
        }
    }
}
