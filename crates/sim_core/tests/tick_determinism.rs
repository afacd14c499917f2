//! Exercises the tick scheduler from outside the crate: the fixed subsystem
//! order, the day-boundary gate on colony/research/maintenance/diplomacy,
//! and that advancing a fresh save by the same number of hours always lands
//! on the same state.

use sim_core::content::{GameContent, InstallationDef, ShipDesign, ShipRole};
use sim_core::state::{Body, BodyType, Colony, GameState, Ship, StarSystem};
use sim_core::{Id, Simulation};
use std::collections::HashMap;

fn scout_design() -> ShipDesign {
    ShipDesign {
        mass_tons: 500.0,
        speed_km_s: 10.0,
        fuel_capacity_tons: 200.0,
        fuel_use_per_mkm: 0.01,
        cargo_capacity_tons: 50.0,
        sensor_range_mkm: 20.0,
        signature_multiplier: 1.0,
        power_generation_kw: 100.0,
        power_use_kw: 50.0,
        max_hp: 100.0,
        max_shields: 20.0,
        weapons: vec![],
        missile: None,
        point_defense: None,
        colony_capacity_millions: 0.0,
        troop_capacity: 0.0,
        role: ShipRole::Scout,
        component_ids: vec![],
        build_rate_tons_per_day: 50.0,
        cost_per_ton: HashMap::new(),
    }
}

fn content_with_mine() -> GameContent {
    let mut designs = HashMap::new();
    designs.insert("scout".to_string(), scout_design());
    let mut content = GameContent {
        designs,
        ..GameContent::default()
    };
    content.installations.insert(
        "mine".to_string(),
        InstallationDef {
            production_per_day: HashMap::from([("Duranium".to_string(), 10.0)]),
            mining: true,
            ..Default::default()
        },
    );
    content
}

fn body(id: Id, system_id: Id, orbit_radius_mkm: f64, orbit_period_days: f64) -> Body {
    Body {
        id,
        system_id,
        parent_body_id: None,
        body_type: BodyType::Planet,
        orbit_radius_mkm,
        orbit_period_days,
        orbit_phase_days: 0.0,
        arg_periapsis_rad: 0.0,
        eccentricity: 0.0,
        temperature_k: 280.0,
        atmosphere: None,
        mineral_deposits: HashMap::from([("Duranium".to_string(), 1_000.0)]),
        position_mkm: (orbit_radius_mkm, 0.0),
    }
}

fn ship(id: Id, system_id: Id) -> Ship {
    Ship {
        id,
        faction_id: Id(1),
        system_id,
        position_mkm: (0.0, 0.0),
        velocity_mkm_per_day: (0.0, 0.0),
        design_id: "scout".to_string(),
        name: "Scout 1".to_string(),
        hp: 100.0,
        max_hp: 100.0,
        shields: 20.0,
        max_shields: 20.0,
        integrity: sim_core::state::SubsystemIntegrity::default(),
        fuel_tons: 200.0,
        cargo: HashMap::new(),
        troops: 0.0,
        colonists_millions: 0.0,
        maintenance_condition: 1.0,
        sensor_mode: sim_core::state::SensorMode::Normal,
        combat_doctrine: sim_core::state::CombatDoctrine::default(),
        automation: sim_core::state::AutomationFlags::default(),
        missile_ammo: 0,
        missile_reload_progress_days: 0.0,
    }
}

fn setup() -> (Simulation, Id, Id, Id) {
    let content = content_with_mine();
    let mut state = GameState::new(7);
    let system_id = Id(1);
    state.systems.insert(
        system_id,
        StarSystem {
            id: system_id,
            name: "Sol".to_string(),
            galaxy_position: (0.0, 0.0),
            body_ids: vec![],
            ship_ids: vec![],
            jump_point_ids: vec![],
            nebula_density: 0.0,
            region_id: Id(1),
        },
    );

    let body_id = state.allocate_id();
    state.bodies.insert(body_id, body(body_id, system_id, 100.0, 365.0));

    let colony_id = state.allocate_id();
    state.colonies.insert(
        colony_id,
        Colony {
            id: colony_id,
            faction_id: Id(1),
            body_id,
            name: "Home".to_string(),
            population_millions: 1.0,
            installations: HashMap::from([("mine".to_string(), 1)]),
            installation_targets: HashMap::new(),
            minerals: HashMap::new(),
            mineral_reserves: HashMap::new(),
            shipyard_queue: vec![],
            construction_queue: vec![],
        },
    );

    let ship_id = state.allocate_id();
    state.ships.insert(ship_id, ship(ship_id, system_id));

    let sim = Simulation { state, content };
    (sim, ship_id, colony_id, body_id)
}

#[test]
fn colony_economy_only_runs_on_a_day_boundary() {
    let (mut sim, _ship_id, colony_id, _body_id) = setup();
    sim.advance_hours(23);
    assert_eq!(sim.state().colonies[&colony_id].mineral_tons("Duranium"), 0.0);

    sim.advance_hours(1);
    assert_eq!(sim.state().colonies[&colony_id].mineral_tons("Duranium"), 10.0);
}

#[test]
fn orbits_advance_every_sub_step_not_just_on_day_boundaries() {
    let (mut sim, _ship_id, _colony_id, body_id) = setup();
    let start = sim.state().bodies[&body_id].position_mkm;
    sim.advance_hours(1);
    let after_one_hour = sim.state().bodies[&body_id].position_mkm;
    assert_ne!(start, after_one_hour);
}

#[test]
fn advancing_five_days_from_identical_setups_is_deterministic() {
    let (mut a, _, colony_a, _) = setup();
    let (mut b, _, colony_b, _) = setup();

    a.advance_days(5);
    b.advance_days(5);

    assert_eq!(a.state().date, b.state().date);
    assert_eq!(a.state().hour_of_day, b.state().hour_of_day);
    assert_eq!(a.state().rng_word_pos, b.state().rng_word_pos);
    assert_eq!(
        a.state().colonies[&colony_a].mineral_tons("Duranium"),
        b.state().colonies[&colony_b].mineral_tons("Duranium")
    );
    assert_eq!(a.state().events.len(), b.state().events.len());
}

#[test]
fn issuing_a_move_order_advances_the_ship_across_hourly_sub_steps() {
    let (mut sim, ship_id, _colony_id, _body_id) = setup();
    sim.issue_move_to_point(ship_id, (500.0, 0.0));
    sim.advance_hours(1);
    let moved = sim.state().ships[&ship_id].position_mkm;
    assert!(moved.0 > 0.0);
}

#[test]
fn twenty_four_hourly_sub_steps_equal_one_advance_days_call() {
    let (mut hourly, _, colony_hourly, _) = setup();
    let (mut daily, _, colony_daily, _) = setup();

    hourly.advance_hours(24 * 5);
    daily.advance_days(5);

    assert_eq!(hourly.state().date, daily.state().date);
    assert_eq!(
        hourly.state().colonies[&colony_hourly].mineral_tons("Duranium"),
        daily.state().colonies[&colony_daily].mineral_tons("Duranium")
    );
}
