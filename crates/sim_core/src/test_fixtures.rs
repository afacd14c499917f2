//! Shared test fixtures for `sim_core` and downstream crates.

use crate::content::{GameContent, ShipDesign, ShipRole};
use crate::id::Id;
use crate::state::{
    AutomationFlags, Body, BodyType, CombatDoctrine, GameState, SensorMode, Ship, StarSystem,
    SubsystemIntegrity,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// A minimal scout-class design plus the default config, enough to drive
/// order-execution and combat tests without a content file.
pub fn base_content() -> GameContent {
    let mut designs = HashMap::new();
    designs.insert(
        "scout".to_string(),
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
        },
    );
    GameContent {
        designs,
        ..GameContent::default()
    }
}

/// A single star system with no bodies, used by tests that only need the
/// order-execution / sensor / jump-routing machinery.
pub fn base_state() -> GameState {
    let mut state = GameState::new(42);
    state.systems.insert(
        Id(1),
        StarSystem {
            id: Id(1),
            name: "Sol".to_string(),
            galaxy_position: (0.0, 0.0),
            body_ids: vec![],
            ship_ids: vec![],
            jump_point_ids: vec![],
            nebula_density: 0.0,
            region_id: Id(1),
        },
    );
    state
}

/// `base_state()` plus a single scout-class ship at the system origin.
pub fn base_state_with_ship() -> GameState {
    let mut state = base_state();
    let ship_id = state.allocate_id();
    state.ships.insert(
        ship_id,
        Ship {
            id: ship_id,
            faction_id: Id(1),
            system_id: Id(1),
            position_mkm: (0.0, 0.0),
            velocity_mkm_per_day: (0.0, 0.0),
            design_id: "scout".to_string(),
            name: "Scout 1".to_string(),
            hp: 100.0,
            max_hp: 100.0,
            shields: 20.0,
            max_shields: 20.0,
            integrity: SubsystemIntegrity::default(),
            fuel_tons: 200.0,
            cargo: HashMap::new(),
            troops: 0.0,
            colonists_millions: 0.0,
            maintenance_condition: 1.0,
            sensor_mode: SensorMode::Normal,
            combat_doctrine: CombatDoctrine::default(),
            automation: AutomationFlags::default(),
            missile_ammo: 0,
            missile_reload_progress_days: 0.0,
        },
    );
    state
}

pub fn stub_body(id: Id, system_id: Id, position_mkm: (f64, f64)) -> Body {
    Body {
        id,
        system_id,
        parent_body_id: None,
        body_type: BodyType::Planet,
        orbit_radius_mkm: 0.0,
        orbit_period_days: 0.0,
        orbit_phase_days: 0.0,
        arg_periapsis_rad: 0.0,
        eccentricity: 0.0,
        temperature_k: 280.0,
        atmosphere: None,
        mineral_deposits: HashMap::new(),
        position_mkm,
    }
}

/// Deterministic RNG seeded for reproducible test runs.
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
