//! Heading-aware route search and the single-destination path cache.
//! This module exists so every policy tier turns a destination into one concrete action the same way.
//! It does not own target selection or the charge budget each tier is willing to spend.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::trace;

use super::*;

/// One action of a planned route, with the pose it must be issued from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedStep {
    pub from: Pos,
    pub facing: Heading,
    pub action: Action,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SearchKey {
    pos: Pos,
    heading: Heading,
    spent: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    seq: u64,
    key: SearchKey,
}

#[derive(Clone, Copy, Debug)]
struct Edge {
    parent: SearchKey,
    clearing: Option<Action>,
    action: Action,
}

impl Edge {
    fn cost(&self) -> u32 {
        1 + u32::from(self.clearing.is_some())
    }
}

/// Full action sequence from the agent's pose to `destination`, spending at most
/// `allowed` charges (never more than the agent carries).
///
/// Returns `Some(vec![])` when the agent already stands on `destination`.
pub fn plan_route(
    map: &GridMap,
    labels: &AccessLabels,
    agent: &AgentState,
    destination: Pos,
    allowed: u32,
) -> Option<Vec<PlannedStep>> {
    let budget = allowed.min(agent.inventory.charge_count);
    if labels.label(destination).is_none_or(|label| label > budget) {
        return None;
    }
    if agent.pos == destination {
        return Some(Vec::new());
    }

    let has_axe = agent.inventory.has_axe;
    let start = SearchKey { pos: agent.pos, heading: agent.heading, spent: 0 };
    let mut open_set = BTreeSet::new();
    let mut g_score = BTreeMap::new();
    let mut came_from = BTreeMap::new();
    let mut closed = BTreeSet::new();
    let mut seq = 0u64;

    g_score.insert(start, 0u32);
    open_set.insert(OpenNode { f: heuristic(start, destination), seq, key: start });

    while let Some(current) = open_set.pop_first() {
        let key = current.key;
        if !closed.insert(key) {
            continue;
        }
        if key.pos == destination {
            trace!(?destination, expanded = closed.len(), "route found");
            return Some(reconstruct_route(&came_from, start, key));
        }
        let Some(&g) = g_score.get(&key) else {
            continue;
        };
        for edge in successors(map, labels, key, has_axe, budget) {
            let next = edge_target(edge);
            if closed.contains(&next) {
                continue;
            }
            let tentative = g + edge.cost();
            if g_score.get(&next).is_none_or(|&known| tentative < known) {
                g_score.insert(next, tentative);
                came_from.insert(next, edge);
                seq += 1;
                open_set.insert(OpenNode {
                    f: tentative + heuristic(next, destination),
                    seq,
                    key: next,
                });
            }
        }
    }

    trace!(?destination, expanded = closed.len(), "open set exhausted");
    None
}

/// Manhattan distance plus one turn unless the heading already closes the gap.
fn heuristic(key: SearchKey, destination: Pos) -> u32 {
    let distance = manhattan(key.pos, destination);
    if distance == 0 || key.heading.points_toward(key.pos, destination) {
        distance
    } else {
        distance + 1
    }
}

fn successors(
    map: &GridMap,
    labels: &AccessLabels,
    key: SearchKey,
    has_axe: bool,
    budget: u32,
) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(3);
    if let Some(clearing) = forward_clearing(map, labels, key, has_axe, budget) {
        edges.push(Edge { parent: key, clearing, action: Action::Forward });
    }
    edges.push(Edge { parent: key, clearing: None, action: Action::TurnLeft });
    edges.push(Edge { parent: key, clearing: None, action: Action::TurnRight });
    edges
}

/// `Some(clearing)` when Forward is possible from `key`, with the action that must precede it.
fn forward_clearing(
    map: &GridMap,
    labels: &AccessLabels,
    key: SearchKey,
    has_axe: bool,
    budget: u32,
) -> Option<Option<Action>> {
    let ahead = key.pos.step(key.heading);
    if labels.label(ahead).is_none_or(|label| label > budget) {
        return None;
    }
    let clearing = match map.tile_at(ahead) {
        Tile::Unknown => return None,
        Tile::Water if !map.tile_at(key.pos).is_boatable() => return None,
        Tile::Tree if has_axe => Some(Action::Chop),
        Tile::Tree | Tile::Boulder => Some(Action::Detonate),
        _ => None,
    };
    if clearing == Some(Action::Detonate) && key.spent >= budget {
        return None;
    }
    Some(clearing)
}

fn edge_target(edge: Edge) -> SearchKey {
    let parent = edge.parent;
    match edge.action {
        Action::TurnLeft => SearchKey { heading: parent.heading.turn_left(), ..parent },
        Action::TurnRight => SearchKey { heading: parent.heading.turn_right(), ..parent },
        _ => SearchKey {
            pos: parent.pos.step(parent.heading),
            heading: parent.heading,
            spent: parent.spent + u32::from(edge.clearing == Some(Action::Detonate)),
        },
    }
}

fn reconstruct_route(
    came_from: &BTreeMap<SearchKey, Edge>,
    start: SearchKey,
    goal: SearchKey,
) -> Vec<PlannedStep> {
    let mut steps = Vec::new();
    let mut key = goal;
    while key != start {
        let Some(edge) = came_from.get(&key) else {
            break;
        };
        let (from, facing) = (edge.parent.pos, edge.parent.heading);
        steps.push(PlannedStep { from, facing, action: edge.action });
        if let Some(clearing) = edge.clearing {
            steps.push(PlannedStep { from, facing, action: clearing });
        }
        key = edge.parent;
    }
    steps.reverse();
    steps
}

pub fn neighbors(p: Pos) -> [Pos; 4] {
    [
        Pos { y: p.y - 1, x: p.x },
        Pos { y: p.y, x: p.x + 1 },
        Pos { y: p.y + 1, x: p.x },
        Pos { y: p.y, x: p.x - 1 },
    ]
}

pub fn manhattan(a: Pos, b: Pos) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

#[derive(Clone, Debug)]
struct PathCache {
    destination: Pos,
    allowed: u32,
    revision: u64,
    steps: VecDeque<PlannedStep>,
}

/// Hands out one action per call, replaying the tail of the last route while it stays valid.
#[derive(Clone, Debug, Default)]
pub struct PathPlanner {
    cache: Option<PathCache>,
}

impl PathPlanner {
    pub fn next_move(
        &mut self,
        map: &GridMap,
        labels: &AccessLabels,
        agent: &AgentState,
        destination: Pos,
        allowed: u32,
    ) -> Option<Action> {
        if let Some(action) = self.take_cached(map.revision(), agent, destination, allowed) {
            return Some(action);
        }
        self.cache = None;

        let mut steps = VecDeque::from(plan_route(map, labels, agent, destination, allowed)?);
        let first = steps.pop_front()?;
        trace!(?destination, allowed, remaining = steps.len(), "route cached");
        self.cache = Some(PathCache { destination, allowed, revision: map.revision(), steps });
        Some(first.action)
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    pub fn cached_destination(&self) -> Option<Pos> {
        self.cache.as_ref().map(|cache| cache.destination)
    }

    /// Actions still queued for the cached destination.
    pub fn cached_len(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.steps.len())
    }

    fn take_cached(
        &mut self,
        revision: u64,
        agent: &AgentState,
        destination: Pos,
        allowed: u32,
    ) -> Option<Action> {
        let cache = self.cache.as_mut()?;
        if cache.destination != destination || cache.allowed != allowed || cache.revision != revision
        {
            return None;
        }
        let front = cache.steps.front()?;
        if front.from != agent.pos || front.facing != agent.heading {
            return None;
        }
        cache.steps.pop_front().map(|step| step.action)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, VecDeque, btree_map::Entry};

    use proptest::prelude::*;

    use super::*;
    use crate::agent::test_support::*;

    fn actions(route: &[PlannedStep]) -> Vec<Action> {
        route.iter().map(|step| step.action).collect()
    }

    #[test]
    fn open_room_turns_once_then_walks_east() {
        let (map, agent) = fixture(&[
            "     ", //
            "     ",
            "  ^  ",
            "     ",
            "     ",
        ]);
        let labels = relabel(&map, agent.pos, false);
        let goal = Pos { y: 2, x: 4 };

        let route = plan_route(&map, &labels, &agent, goal, 0).expect("open room is reachable");
        assert_eq!(actions(&route), vec![Action::TurnRight, Action::Forward, Action::Forward]);

        let mut planner = PathPlanner::default();
        assert_eq!(planner.next_move(&map, &labels, &agent, goal, 0), Some(Action::TurnRight));
        assert_eq!(planner.cached_destination(), Some(goal));
        assert_eq!(planner.cached_len(), 2);
    }

    #[test]
    fn water_enclosure_without_boat_is_unreachable() {
        let (map, agent) = fixture(&[
            "     ", //
            " ~~~ ",
            " ~g~ ",
            " ~~~ ",
            "^    ",
        ]);
        let labels = relabel(&map, agent.pos, false);
        let goal = Pos { y: 2, x: 2 };
        assert_eq!(labels.label(goal), None);
        assert_eq!(plan_route(&map, &labels, &agent, goal, 5), None);

        let mut planner = PathPlanner::default();
        assert_eq!(planner.next_move(&map, &labels, &agent, goal, 5), None);
        assert_eq!(planner.cached_destination(), None);
    }

    #[test]
    fn detonates_through_boulder_only_when_budget_allows() {
        let (map, mut agent) = fixture(&[
            " g ", //
            " * ",
            " ^ ",
        ]);
        agent.inventory = charges(1);
        let labels = relabel(&map, agent.pos, false);
        let goal = Pos { y: 0, x: 1 };

        let direct = plan_route(&map, &labels, &agent, goal, 1).expect("one charge opens the way");
        assert_eq!(actions(&direct), vec![Action::Detonate, Action::Forward, Action::Forward]);

        let around = plan_route(&map, &labels, &agent, goal, 0).expect("detour exists");
        assert_eq!(around.len(), 7);
        assert!(!actions(&around).contains(&Action::Detonate));
    }

    #[test]
    fn budget_is_capped_by_charges_carried() {
        let (map, agent) = fixture(&[
            "*g*", //
            "***",
            "*^*",
        ]);
        let labels = relabel(&map, agent.pos, false);
        let goal = Pos { y: 0, x: 1 };
        assert_eq!(labels.label(goal), Some(1));
        assert_eq!(plan_route(&map, &labels, &agent, goal, 3), None);
    }

    #[test]
    fn axe_chops_tree_before_stepping_forward() {
        let (map, mut agent) = fixture(&[
            "TgT", //
            "TTT",
            "T^T",
        ]);
        agent.inventory.has_axe = true;
        let labels = relabel(&map, agent.pos, true);
        let goal = Pos { y: 0, x: 1 };
        let route = plan_route(&map, &labels, &agent, goal, 0).expect("axe clears trees");
        assert_eq!(actions(&route), vec![Action::Chop, Action::Forward, Action::Forward]);
    }

    #[test]
    fn boat_route_crosses_water_from_the_boat_tile() {
        let (map, agent) = fixture(&[
            "  g", //
            "~~~",
            "B~~",
            "^  ",
        ]);
        let labels = relabel(&map, agent.pos, false);
        let goal = Pos { y: 0, x: 2 };
        let route = plan_route(&map, &labels, &agent, goal, 0).expect("boat reaches far shore");
        assert_eq!(
            route[0],
            PlannedStep { from: agent.pos, facing: Heading::North, action: Action::Forward }
        );
        assert!(route.iter().all(|step| step.action != Action::Detonate));
    }

    #[test]
    fn cached_route_replays_a_fresh_search() {
        let (mut map, mut agent) = fixture(&[
            "       ", //
            " ** *  ",
            "  *  * ",
            " *^ ** ",
            "   *   ",
            " *   * ",
            "       ",
        ]);
        let labels = relabel(&map, agent.pos, false);
        let goal = Pos { y: 6, x: 6 };
        let fresh = plan_route(&map, &labels, &agent, goal, 0).expect("goal reachable");

        let mut planner = PathPlanner::default();
        let mut replayed = Vec::new();
        while agent.pos != goal {
            let action = planner
                .next_move(&map, &labels, &agent, goal, 0)
                .expect("cached route should keep producing moves");
            replayed.push(action);
            agent.apply(action, &mut map);
            assert!(replayed.len() <= fresh.len());
        }
        assert_eq!(replayed, actions(&fresh));
    }

    #[test]
    fn cache_is_dropped_when_the_agent_leaves_the_route() {
        let (mut map, mut agent) = fixture(&[
            "     ", //
            "     ",
            "  ^  ",
            "     ",
            "     ",
        ]);
        let labels = relabel(&map, agent.pos, false);
        let goal = Pos { y: 0, x: 2 };
        let mut planner = PathPlanner::default();
        assert_eq!(planner.next_move(&map, &labels, &agent, goal, 0), Some(Action::Forward));

        agent.apply(Action::TurnLeft, &mut map);
        let expected = plan_route(&map, &labels, &agent, goal, 0).expect("still reachable");
        assert_eq!(planner.next_move(&map, &labels, &agent, goal, 0), Some(expected[0].action));
        assert_eq!(planner.cached_len(), expected.len() - 1);
    }

    #[test]
    fn cache_is_dropped_when_the_map_changes() {
        let (mut map, agent) = fixture(&[
            "   ", //
            "   ",
            " ^ ",
        ]);
        let labels = relabel(&map, agent.pos, false);
        let goal = Pos { y: 0, x: 1 };
        let mut planner = PathPlanner::default();
        planner.next_move(&map, &labels, &agent, goal, 0);
        assert_eq!(planner.cached_len(), 1);

        map.set_tile(Pos { y: 0, x: 0 }, Tile::Boulder);
        assert_eq!(planner.next_move(&map, &labels, &agent, goal, 0), Some(Action::Forward));
        assert_eq!(planner.cached_len(), 1);
    }

    const SIDE: usize = 7;

    fn tile_from_code(code: u8) -> Tile {
        match code {
            0 => Tile::Empty,
            1 => Tile::Boulder,
            2 => Tile::Water,
            3 => Tile::Charge,
            _ => Tile::Tree,
        }
    }

    fn grid_map(codes: &[u8], height: usize, width: usize, start: Pos) -> GridMap {
        let mut map = GridMap::new(start);
        for y in 0..height {
            for x in 0..width {
                let pos = Pos { y: y as i32, x: x as i32 };
                if pos != start {
                    map.set_tile(pos, tile_from_code(codes[y * SIDE + x]));
                }
            }
        }
        map
    }

    /// Fewest actions over (pos, heading) using only zero-cost open ground.
    fn exhaustive_action_count(map: &GridMap, agent: &AgentState, goal: Pos) -> Option<usize> {
        let mut dist = BTreeMap::new();
        let mut queue = VecDeque::new();
        dist.insert((agent.pos, agent.heading), 0usize);
        queue.push_back((agent.pos, agent.heading));
        while let Some((pos, heading)) = queue.pop_front() {
            let d = dist[&(pos, heading)];
            if pos == goal {
                return Some(d);
            }
            let ahead = pos.step(heading);
            let mut next = vec![(pos, heading.turn_left()), (pos, heading.turn_right())];
            if map.tile_at(ahead).is_open_ground() {
                next.push((ahead, heading));
            }
            for state in next {
                if let Entry::Vacant(entry) = dist.entry(state) {
                    entry.insert(d + 1);
                    queue.push_back(state);
                }
            }
        }
        None
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]
        #[test]
        fn zero_charge_routes_match_exhaustive_search(
            codes in prop::collection::vec(0_u8..4, SIDE * SIDE),
            height in 1_usize..=SIDE,
            width in 1_usize..=SIDE,
            start_cell in (0_usize..SIDE, 0_usize..SIDE),
            goal_cell in (0_usize..SIDE, 0_usize..SIDE),
            heading in 0_usize..4,
        ) {
            let start = Pos { y: (start_cell.0 % height) as i32, x: (start_cell.1 % width) as i32 };
            let goal = Pos { y: (goal_cell.0 % height) as i32, x: (goal_cell.1 % width) as i32 };
            let map = grid_map(&codes, height, width, start);
            let agent = AgentState { pos: start, heading: Heading::ALL[heading], inventory: Inventory::default() };
            let labels = relabel(&map, start, false);

            let route = plan_route(&map, &labels, &agent, goal, 0);
            let exhaustive = exhaustive_action_count(&map, &agent, goal);
            if labels.label(goal) == Some(0) {
                prop_assert_eq!(route.map(|steps| steps.len()), exhaustive);
            } else {
                prop_assert!(route.is_none());
                prop_assert!(exhaustive.is_none());
            }
        }

        #[test]
        fn routes_never_spend_more_than_the_budget(
            codes in prop::collection::vec(0_u8..5, SIDE * SIDE),
            start_cell in (0_usize..SIDE, 0_usize..SIDE),
            goal_cell in (0_usize..SIDE, 0_usize..SIDE),
            carried in 0_u32..3,
            allowed in 0_u32..3,
        ) {
            let start = Pos { y: start_cell.0 as i32, x: start_cell.1 as i32 };
            let goal = Pos { y: goal_cell.0 as i32, x: goal_cell.1 as i32 };
            let map = grid_map(&codes, SIDE, SIDE, start);
            let agent = AgentState { pos: start, heading: Heading::North, inventory: charges(carried) };
            let labels = relabel(&map, start, false);

            match plan_route(&map, &labels, &agent, goal, allowed) {
                Some(route) => {
                    let spent = route.iter().filter(|step| step.action == Action::Detonate).count();
                    prop_assert!(spent as u32 <= allowed.min(carried));
                    prop_assert!(labels.label(goal).is_some_and(|label| label <= allowed.min(carried)));
                }
                None => {
                    prop_assert!(labels.label(goal).is_none_or(|label| label > allowed.min(carried)));
                }
            }
        }
    }
}
