//! Tests for tier ordering: return home, collect, explore, detonate, stall.

use super::support::*;

fn carrying_goal(charge_count: u32) -> Inventory {
    Inventory { has_goal_item: true, charge_count, ..Inventory::default() }
}

#[test]
fn return_home_outranks_a_nearby_charge() {
    let mut agent = fixture_agent(
        &[
            "  <", //
            "  d",
        ],
        carrying_goal(0),
        Policy::default(),
    );
    assert_eq!(agent.decide(), Decision::Act(Action::Forward));
    assert_eq!(
        agent.intent(),
        Some(Intent { target: Pos::ORIGIN, reason: AutoReason::ReturnHome, allowed_charges: 0 })
    );
    assert_eq!(
        agent.log(),
        &[LogEvent::ReasonChanged { reason: AutoReason::ReturnHome, target: Pos::ORIGIN }]
    );
}

#[test]
fn return_home_spends_charges_only_when_policy_allows() {
    let rows = [
        " *<", //
        "***",
    ];
    let mut agent = fixture_agent(&rows, carrying_goal(1), Policy::default());
    assert_eq!(agent.decide(), Decision::Act(Action::Detonate));
    assert_eq!(agent.intent().map(|intent| intent.reason), Some(AutoReason::ReturnHome));
    assert_eq!(agent.intent().map(|intent| intent.allowed_charges), Some(1));

    let frugal = Policy { spend_charges_on_return: false, ..Policy::default() };
    let mut agent = fixture_agent(&rows, carrying_goal(1), frugal);
    assert_eq!(agent.decide(), Decision::Act(Action::Detonate));
    assert_eq!(
        agent.intent(),
        Some(Intent {
            target: Pos { y: 0, x: 1 },
            reason: AutoReason::Detonation,
            allowed_charges: 1
        })
    );
}

#[test]
fn collect_picks_nearest_item_then_scan_order() {
    let rows = [
        "  a  ", //
        "     ",
        "  ^ d",
        "     ",
        "     ",
    ];
    let mut agent = fixture_agent(&rows, Inventory::default(), Policy::default());
    assert_eq!(agent.decide(), Decision::Act(Action::Forward));
    assert_eq!(agent.intent().map(|intent| intent.target), Some(Pos { y: 0, x: 2 }));
    assert_eq!(agent.intent().map(|intent| intent.reason), Some(AutoReason::Collect));

    let holding_axe = Inventory { has_axe: true, ..Inventory::default() };
    let mut agent = fixture_agent(&rows, holding_axe, Policy::default());
    assert_eq!(agent.decide(), Decision::Act(Action::TurnRight));
    assert_eq!(agent.intent().map(|intent| intent.target), Some(Pos { y: 2, x: 4 }));
}

#[test]
fn fresh_agent_explores_the_nearest_frontier() {
    let mut agent = Agent::new(Policy::default());
    let decision = agent.step(&SensorWindow::from_cells([[Tile::Empty; 5]; 5]));
    assert_eq!(decision, Decision::Act(Action::Forward));
    assert_eq!(agent.state().pos, Pos { y: -1, x: 0 });
    assert_eq!(agent.current_tick(), 1);
    assert_eq!(
        agent.log().first(),
        Some(&LogEvent::ReasonChanged { reason: AutoReason::Frontier, target: Pos { y: -1, x: 0 } })
    );
}

const SEALED_ROOM: [&str; 9] = [
    "********?",
    "********?",
    "********?",
    "***   **?",
    "*** ^ **?",
    "***   **?",
    "********?",
    "********?",
    "********?",
];

#[test]
fn sealed_room_spends_a_charge_on_the_first_best_obstacle() {
    let mut agent = fixture_agent(&SEALED_ROOM, charges(1), Policy::default());
    let decision = agent.decide();
    assert!(matches!(decision, Decision::Act(_)));
    assert_eq!(
        agent.intent(),
        Some(Intent {
            target: Pos { y: 2, x: 3 },
            reason: AutoReason::Detonation,
            allowed_charges: 1
        })
    );
}

#[test]
fn sealed_room_without_charges_stalls() {
    let mut agent = fixture_agent(&SEALED_ROOM, Inventory::default(), Policy::default());
    assert_eq!(agent.decide(), Decision::Stalled);
    assert_eq!(agent.intent(), None);
    assert_eq!(agent.log().last(), Some(&LogEvent::Stalled { tick: 0 }));

    let decision = agent.step(&SensorWindow::from_cells([[Tile::Unknown; 5]; 5]));
    assert_eq!(decision, Decision::Stalled);
    assert_eq!(agent.current_tick(), 1);
}
