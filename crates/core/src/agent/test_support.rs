//! Shared fixtures for the agent test suites.
//! Maps are written as ASCII rows in wire symbols; row index is `y`, column index is `x`.
//! `^ > v <` marks the agent (standing on Empty) and `?` leaves a cell unobserved.

use super::*;

pub(crate) fn fixture(rows: &[&str]) -> (GridMap, AgentState) {
    let mut agent = None;
    let mut cells = Vec::new();
    for (y, line) in rows.iter().enumerate() {
        for (x, byte) in line.bytes().enumerate() {
            let pos = Pos { y: y as i32, x: x as i32 };
            let heading = match byte {
                b'^' => Some(Heading::North),
                b'>' => Some(Heading::East),
                b'v' => Some(Heading::South),
                b'<' => Some(Heading::West),
                _ => None,
            };
            if let Some(heading) = heading {
                agent = Some(AgentState { pos, heading, inventory: Inventory::default() });
                continue;
            }
            let tile = Tile::from_symbol(byte).expect("fixture rows use wire symbols");
            cells.push((pos, tile));
        }
    }
    let agent = agent.expect("fixture needs an agent marker");
    let mut map = GridMap::new(agent.pos);
    for (pos, tile) in cells {
        map.set_tile(pos, tile);
    }
    (map, agent)
}

/// An agent placed into a fixture map mid-episode, labels already computed.
pub(crate) fn fixture_agent(rows: &[&str], inventory: Inventory, policy: Policy) -> Agent {
    let (map, mut state) = fixture(rows);
    state.inventory = inventory;
    let labels = relabel(&map, state.pos, inventory.has_axe);
    Agent {
        state,
        map,
        labels,
        planner: PathPlanner::default(),
        policy,
        intent: None,
        tick: 0,
        log: Vec::new(),
    }
}

pub(crate) fn charges(count: u32) -> Inventory {
    Inventory { charge_count: count, ..Inventory::default() }
}

