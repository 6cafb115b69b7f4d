use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const ORIGIN: Pos = Pos { y: 0, x: 0 };

    pub fn step(self, heading: Heading) -> Pos {
        let (dy, dx) = heading.delta();
        Pos { y: self.y + dy, x: self.x + dx }
    }

    pub fn offset(self, dy: i32, dx: i32) -> Pos {
        Pos { y: self.y + dy, x: self.x + dx }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Heading {
    North,
    East,
    South,
    West,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

    /// `(dy, dx)` of one forward step; `y` grows southward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Heading::North => (-1, 0),
            Heading::East => (0, 1),
            Heading::South => (1, 0),
            Heading::West => (0, -1),
        }
    }

    pub fn turn_left(self) -> Heading {
        match self {
            Heading::North => Heading::West,
            Heading::West => Heading::South,
            Heading::South => Heading::East,
            Heading::East => Heading::North,
        }
    }

    pub fn turn_right(self) -> Heading {
        match self {
            Heading::North => Heading::East,
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
        }
    }

    /// Whether one step this way reduces the distance from `from` to `to`.
    pub fn points_toward(self, from: Pos, to: Pos) -> bool {
        match self {
            Heading::North => to.y < from.y,
            Heading::East => to.x > from.x,
            Heading::South => to.y > from.y,
            Heading::West => to.x < from.x,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Unknown,
    Empty,
    Tree,
    Boulder,
    Water,
    Boat,
    Axe,
    Charge,
    GoalItem,
}

impl Tile {
    pub fn from_symbol(byte: u8) -> Option<Tile> {
        Some(match byte {
            b'?' => Tile::Unknown,
            b' ' => Tile::Empty,
            b'T' => Tile::Tree,
            b'*' => Tile::Boulder,
            b'~' => Tile::Water,
            b'B' => Tile::Boat,
            b'a' => Tile::Axe,
            b'd' => Tile::Charge,
            b'g' => Tile::GoalItem,
            _ => return None,
        })
    }

    pub fn symbol(self) -> u8 {
        match self {
            Tile::Unknown => b'?',
            Tile::Empty => b' ',
            Tile::Tree => b'T',
            Tile::Boulder => b'*',
            Tile::Water => b'~',
            Tile::Boat => b'B',
            Tile::Axe => b'a',
            Tile::Charge => b'd',
            Tile::GoalItem => b'g',
        }
    }

    pub fn is_obstacle(self) -> bool {
        matches!(self, Tile::Tree | Tile::Boulder)
    }

    pub fn is_item(self) -> bool {
        matches!(self, Tile::Axe | Tile::Charge | Tile::GoalItem)
    }

    /// Land that can be walked onto without clearing or a boat.
    pub fn is_open_ground(self) -> bool {
        matches!(self, Tile::Empty | Tile::Axe | Tile::Charge | Tile::GoalItem | Tile::Boat)
    }

    pub fn is_boatable(self) -> bool {
        matches!(self, Tile::Water | Tile::Boat)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Action {
    Forward,
    TurnLeft,
    TurnRight,
    Chop,
    Detonate,
}

impl Action {
    pub fn symbol(self) -> u8 {
        match self {
            Action::Forward => b'f',
            Action::TurnLeft => b'l',
            Action::TurnRight => b'r',
            Action::Chop => b'c',
            Action::Detonate => b'b',
        }
    }

    pub fn from_symbol(byte: u8) -> Option<Action> {
        Some(match byte.to_ascii_lowercase() {
            b'f' => Action::Forward,
            b'l' => Action::TurnLeft,
            b'r' => Action::TurnRight,
            b'c' => Action::Chop,
            b'b' => Action::Detonate,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Inventory {
    pub has_axe: bool,
    pub has_goal_item: bool,
    pub charge_count: u32,
    pub on_boat: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Allow spending a charge on a tree while no axe is held.
    pub detonate_trees: bool,
    /// Allow clearing obstacles on the way home when no free route exists.
    pub spend_charges_on_return: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self { detonate_trees: true, spend_charges_on_return: true }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AutoReason {
    ReturnHome,
    Collect,
    Frontier,
    Detonation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub target: Pos,
    pub reason: AutoReason,
    pub allowed_charges: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Act(Action),
    /// Nothing left to reach; the cascade has no valid action.
    Stalled,
}

impl Decision {
    pub fn action(self) -> Option<Action> {
        match self {
            Decision::Act(action) => Some(action),
            Decision::Stalled => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogEvent {
    ReasonChanged { reason: AutoReason, target: Pos },
    PlannerDisagreement { target: Pos, label: u32, allowed_charges: u32 },
    ItemCollected { item: Tile, at: Pos },
    Cleared { obstacle: Tile, at: Pos, action: Action },
    Stalled { tick: u64 },
}
