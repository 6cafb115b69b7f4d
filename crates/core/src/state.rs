use crate::types::*;
use crate::window::{SensorWindow, WINDOW_RADIUS};

/// Slack added around a coordinate whenever the arena has to grow.
const GROWTH_MARGIN: i32 = 16;

/// Inclusive rectangle of coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub min: Pos,
    pub max: Pos,
}

impl Bounds {
    pub fn single(pos: Pos) -> Self {
        Self { min: pos, max: pos }
    }

    pub fn include(&mut self, pos: Pos) {
        self.min = Pos { y: self.min.y.min(pos.y), x: self.min.x.min(pos.x) };
        self.max = Pos { y: self.max.y.max(pos.y), x: self.max.x.max(pos.x) };
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.y >= self.min.y && pos.y <= self.max.y && pos.x >= self.min.x && pos.x <= self.max.x
    }

    pub fn width(&self) -> usize {
        (self.max.x - self.min.x + 1) as usize
    }

    pub fn height(&self) -> usize {
        (self.max.y - self.min.y + 1) as usize
    }

    /// Row-major index of `pos`, if inside.
    pub fn index(&self, pos: Pos) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        Some(((pos.y - self.min.y) as usize) * self.width() + (pos.x - self.min.x) as usize)
    }

    /// Every coordinate in scan order (north to south, west to east).
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let Bounds { min, max } = *self;
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| Pos { y, x }))
    }
}

/// Observed terrain in an unbounded coordinate space, backed by a growable arena.
#[derive(Clone, Debug)]
pub struct GridMap {
    arena: Bounds,
    tiles: Vec<Tile>,
    observed: Bounds,
    revision: u64,
}

impl GridMap {
    /// A map whose only known tile is the agent's own footprint at `origin`.
    pub fn new(origin: Pos) -> Self {
        let arena = Bounds {
            min: origin.offset(-GROWTH_MARGIN, -GROWTH_MARGIN),
            max: origin.offset(GROWTH_MARGIN, GROWTH_MARGIN),
        };
        let mut map = Self {
            tiles: vec![Tile::Unknown; arena.width() * arena.height()],
            arena,
            observed: Bounds::single(origin),
            revision: 0,
        };
        map.set_tile(origin, Tile::Empty);
        map
    }

    pub fn tile_at(&self, pos: Pos) -> Tile {
        self.arena.index(pos).map_or(Tile::Unknown, |idx| self.tiles[idx])
    }

    pub fn is_known(&self, pos: Pos) -> bool {
        self.tile_at(pos) != Tile::Unknown
    }

    /// Record `tile` at `pos`; returns whether the stored value changed.
    /// Writing `Unknown` is ignored so knowledge never regresses.
    pub fn set_tile(&mut self, pos: Pos, tile: Tile) -> bool {
        if tile == Tile::Unknown {
            return false;
        }
        if !self.arena.contains(pos) {
            self.grow_to_include(pos);
        }
        self.observed.include(pos);
        let Some(idx) = self.arena.index(pos) else {
            return false;
        };
        if self.tiles[idx] == tile {
            return false;
        }
        self.tiles[idx] = tile;
        self.revision += 1;
        true
    }

    /// Write one sensor window around `agent_pos`; returns whether any tile changed.
    pub fn merge(&mut self, window: &SensorWindow, agent_pos: Pos, heading: Heading) -> bool {
        let cells = window.world_oriented(heading);
        let mut changed = false;
        for (row, line) in cells.iter().enumerate() {
            for (col, &tile) in line.iter().enumerate() {
                let dy = row as i32 - WINDOW_RADIUS;
                let dx = col as i32 - WINDOW_RADIUS;
                if dy == 0 && dx == 0 {
                    continue;
                }
                changed |= self.set_tile(agent_pos.offset(dy, dx), tile);
            }
        }
        changed
    }

    /// No Unknown tile anywhere in the 5×5 neighborhood of `pos`.
    pub fn is_fully_observed(&self, pos: Pos) -> bool {
        (-WINDOW_RADIUS..=WINDOW_RADIUS).all(|dy| {
            (-WINDOW_RADIUS..=WINDOW_RADIUS).all(|dx| self.is_known(pos.offset(dy, dx)))
        })
    }

    /// Bounding box of every coordinate ever written.
    pub fn observed_bounds(&self) -> Bounds {
        self.observed
    }

    /// Bumped on every real tile change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn positions_of(&self, tile: Tile) -> impl Iterator<Item = Pos> + '_ {
        self.observed.positions().filter(move |pos| self.tile_at(*pos) == tile)
    }

    fn grow_to_include(&mut self, pos: Pos) {
        let mut arena = self.arena;
        arena.include(pos.offset(-GROWTH_MARGIN, -GROWTH_MARGIN));
        arena.include(pos.offset(GROWTH_MARGIN, GROWTH_MARGIN));
        let mut tiles = vec![Tile::Unknown; arena.width() * arena.height()];
        for old in self.arena.positions() {
            if let (Some(from), Some(to)) = (self.arena.index(old), arena.index(old)) {
                tiles[to] = self.tiles[from];
            }
        }
        self.arena = arena;
        self.tiles = tiles;
    }
}

/// What an executed action did to the agent and its map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionEffect {
    Turned,
    Moved,
    Collected(Tile),
    Cleared(Tile),
    Blocked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentState {
    pub pos: Pos,
    pub heading: Heading,
    pub inventory: Inventory,
}

impl Default for AgentState {
    fn default() -> Self {
        Self { pos: Pos::ORIGIN, heading: Heading::North, inventory: Inventory::default() }
    }
}

impl AgentState {
    pub fn ahead(&self) -> Pos {
        self.pos.step(self.heading)
    }

    /// Apply the engine rules for `action` to this state and to `map`.
    pub fn apply(&mut self, action: Action, map: &mut GridMap) -> ActionEffect {
        match action {
            Action::TurnLeft => {
                self.heading = self.heading.turn_left();
                ActionEffect::Turned
            }
            Action::TurnRight => {
                self.heading = self.heading.turn_right();
                ActionEffect::Turned
            }
            Action::Forward => self.step_forward(map),
            Action::Chop => {
                let ahead = self.ahead();
                if self.inventory.has_axe && map.tile_at(ahead) == Tile::Tree {
                    map.set_tile(ahead, Tile::Empty);
                    ActionEffect::Cleared(Tile::Tree)
                } else {
                    ActionEffect::Blocked
                }
            }
            Action::Detonate => {
                let ahead = self.ahead();
                let tile = map.tile_at(ahead);
                if self.inventory.charge_count > 0 && tile.is_obstacle() {
                    self.inventory.charge_count -= 1;
                    map.set_tile(ahead, Tile::Empty);
                    ActionEffect::Cleared(tile)
                } else {
                    ActionEffect::Blocked
                }
            }
        }
    }

    fn step_forward(&mut self, map: &mut GridMap) -> ActionEffect {
        let from = self.pos;
        let to = self.ahead();
        let here = map.tile_at(from);
        let there = map.tile_at(to);
        match there {
            Tile::Unknown | Tile::Tree | Tile::Boulder => return ActionEffect::Blocked,
            Tile::Water if !self.inventory.on_boat => return ActionEffect::Blocked,
            _ => {}
        }

        if self.inventory.on_boat {
            match (here, there) {
                // The boat travels with the agent.
                (Tile::Boat, Tile::Water) => {
                    map.set_tile(from, Tile::Water);
                }
                // Stepping ashore leaves the boat on the last water tile.
                (Tile::Water, t) if t != Tile::Water => {
                    map.set_tile(from, Tile::Boat);
                }
                _ => {}
            }
        }

        self.pos = to;
        self.inventory.on_boat = there.is_boatable();
        match there {
            Tile::Axe => self.inventory.has_axe = true,
            Tile::Charge => self.inventory.charge_count += 1,
            Tile::GoalItem => self.inventory.has_goal_item = true,
            _ => return ActionEffect::Moved,
        }
        map.set_tile(to, Tile::Empty);
        ActionEffect::Collected(there)
    }
}
