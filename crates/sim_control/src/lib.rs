//! Drives idle, automation-flagged ships by consulting the planner family
//! and handing their output back as plain orders — the host applies them and
//! advances the simulation, the same two-step shape as generating then
//! executing a batch of commands.

use sim_core::planners::freight_planner::{self, FreightPlannerOptions};
use sim_core::planners::fuel_planner::{self, FuelPlannerOptions};
use sim_core::{Id, Order, Simulation};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

pub trait CommandSource {
    fn generate_orders(&mut self, sim: &Simulation) -> Vec<(Id, Order)>;
}

/// Routes idle automation-flagged ships: freighters against the freight
/// planner's logistics matches first, then tankers against the fuel
/// planner's starved-target matches. A ship with a non-empty order queue, or
/// without the matching automation flag, is left untouched.
pub struct AutopilotController {
    pub freight_options: FreightPlannerOptions,
    pub fuel_options: FuelPlannerOptions,
}

impl Default for AutopilotController {
    fn default() -> Self {
        AutopilotController {
            freight_options: FreightPlannerOptions::default(),
            fuel_options: FuelPlannerOptions::default(),
        }
    }
}

impl CommandSource for AutopilotController {
    fn generate_orders(&mut self, sim: &Simulation) -> Vec<(Id, Order)> {
        let state = sim.state();
        let content = &sim.content;

        let mut idle_freighters_by_faction: HashMap<Id, Vec<Id>> = HashMap::new();
        let mut idle_tankers: Vec<Id> = Vec::new();
        let mut refuel_targets: Vec<Id> = Vec::new();

        let mut ship_ids: Vec<Id> = state.ships.keys().copied().collect();
        ship_ids.sort_unstable();

        for ship_id in ship_ids {
            let ship = &state.ships[&ship_id];
            let idle = state.ship_orders.get(&ship_id).map_or(true, |o| o.is_idle());
            if !idle {
                continue;
            }
            if ship.automation.auto_freight {
                idle_freighters_by_faction.entry(ship.faction_id).or_default().push(ship_id);
            }
            if ship.automation.auto_tanker {
                idle_tankers.push(ship_id);
            }
            if ship.automation.auto_refuel {
                refuel_targets.push(ship_id);
            }
        }

        let mut orders = Vec::new();

        let mut faction_ids: Vec<Id> = idle_freighters_by_faction.keys().copied().collect();
        faction_ids.sort_unstable();
        for faction_id in faction_ids {
            let ships = &idle_freighters_by_faction[&faction_id];
            let result = freight_planner::plan(state, content, faction_id, ships, &self.freight_options);
            if result.status.stalled {
                debug!(faction = faction_id.0, reason = ?result.status.stall_reason, "freight planner stalled");
            }
            for assignment in result.assignments {
                orders.push((
                    assignment.ship_id,
                    Order::LoadMineral {
                        colony_id: assignment.source_colony_id,
                        mineral: assignment.mineral.clone(),
                        tons: assignment.tons,
                    },
                ));
                orders.push((
                    assignment.ship_id,
                    Order::UnloadMineral {
                        colony_id: assignment.dest_colony_id,
                        mineral: assignment.mineral,
                        tons: assignment.tons,
                    },
                ));
            }
        }

        if !idle_tankers.is_empty() && !refuel_targets.is_empty() {
            idle_tankers.sort_unstable();
            refuel_targets.sort_unstable();
            let result = fuel_planner::plan(state, content, &idle_tankers, &refuel_targets, &self.fuel_options);
            if result.status.stalled {
                debug!(reason = ?result.status.stall_reason, "fuel planner stalled");
            }
            for assignment in result.assignments {
                orders.push((
                    assignment.tanker_ship_id,
                    Order::TransferFuelToShip {
                        target_ship_id: assignment.target_ship_id,
                        tons: assignment.tons,
                    },
                ));
            }
        }

        orders
    }
}

/// Replays a fixed per-day order schedule, useful for deterministic
/// integration tests that need a specific order issued on a specific day.
pub struct ScenarioSource {
    schedule: BTreeMap<i64, Vec<(Id, Order)>>,
}

impl ScenarioSource {
    pub fn new(schedule: BTreeMap<i64, Vec<(Id, Order)>>) -> Self {
        ScenarioSource { schedule }
    }
}

impl CommandSource for ScenarioSource {
    fn generate_orders(&mut self, sim: &Simulation) -> Vec<(Id, Order)> {
        let day = sim.state().date.days_since_epoch();
        self.schedule.remove(&day).unwrap_or_default()
    }
}

/// Pulls orders from `source`, enqueues them, then advances the simulation.
pub fn drive_hours(sim: &mut Simulation, source: &mut dyn CommandSource, hours: u32) {
    let orders = source.generate_orders(sim);
    for (ship_id, order) in orders {
        if let Some(ship_orders) = sim.state_mut().ship_orders.get_mut(&ship_id) {
            ship_orders.queue.push_back(order);
        }
    }
    sim.advance_hours(hours);
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::content::{InstallationDef, ShipDesign, ShipRole};
    use sim_core::state::{
        AutomationFlags, Body, BodyType, CombatDoctrine, Colony, Ship, StarSystem, SubsystemIntegrity,
    };
    use std::collections::HashMap as Map;

    fn design() -> ShipDesign {
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
            role: ShipRole::Freighter,
            component_ids: vec![],
            build_rate_tons_per_day: 50.0,
            cost_per_ton: Map::new(),
        }
    }

    fn ship(id: Id) -> Ship {
        Ship {
            id,
            faction_id: Id(1),
            system_id: Id(1),
            position_mkm: (0.0, 0.0),
            velocity_mkm_per_day: (0.0, 0.0),
            design_id: "freighter".to_string(),
            name: "Freighter 1".to_string(),
            hp: 100.0,
            max_hp: 100.0,
            shields: 0.0,
            max_shields: 0.0,
            integrity: SubsystemIntegrity::default(),
            fuel_tons: 200.0,
            cargo: Map::new(),
            troops: 0.0,
            colonists_millions: 0.0,
            maintenance_condition: 1.0,
            sensor_mode: sim_core::state::SensorMode::Normal,
            combat_doctrine: CombatDoctrine::default(),
            automation: AutomationFlags::default(),
            missile_ammo: 0,
            missile_reload_progress_days: 0.0,
        }
    }

    fn body(id: Id, position_mkm: (f64, f64)) -> Body {
        Body {
            id,
            system_id: Id(1),
            parent_body_id: None,
            body_type: BodyType::Planet,
            orbit_radius_mkm: 0.0,
            orbit_period_days: 0.0,
            orbit_phase_days: 0.0,
            arg_periapsis_rad: 0.0,
            eccentricity: 0.0,
            temperature_k: 280.0,
            atmosphere: None,
            mineral_deposits: Map::new(),
            position_mkm,
        }
    }

    fn setup() -> (Simulation, Id, Id, Id) {
        let mut designs = Map::new();
        designs.insert("freighter".to_string(), design());
        let mut content = sim_core::content::GameContent {
            designs,
            ..Default::default()
        };
        content.installations.insert(
            "refinery".to_string(),
            InstallationDef {
                consumption_per_day: Map::from([("Duranium".to_string(), 10.0)]),
                ..Default::default()
            },
        );

        let mut state = sim_core::state::GameState::new(42);
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
        let freighter_id = state.allocate_id();
        let mut freighter = ship(freighter_id);
        freighter.automation.auto_freight = true;
        state.ships.insert(freighter_id, freighter);

        let body_a = state.allocate_id();
        state.bodies.insert(body_a, body(body_a, (0.0, 0.0)));
        let body_b = state.allocate_id();
        state.bodies.insert(body_b, body(body_b, (100.0, 0.0)));

        let short_id = state.allocate_id();
        state.colonies.insert(
            short_id,
            Colony {
                id: short_id,
                faction_id: Id(1),
                body_id: body_a,
                name: "Short".to_string(),
                population_millions: 1.0,
                installations: Map::from([("refinery".to_string(), 1)]),
                installation_targets: Map::new(),
                minerals: Map::new(),
                mineral_reserves: Map::new(),
                shipyard_queue: vec![],
                construction_queue: vec![],
            },
        );
        let surplus_id = state.allocate_id();
        state.colonies.insert(
            surplus_id,
            Colony {
                id: surplus_id,
                faction_id: Id(1),
                body_id: body_b,
                name: "Surplus".to_string(),
                population_millions: 1.0,
                installations: Map::new(),
                installation_targets: Map::new(),
                minerals: Map::from([("Duranium".to_string(), 500.0)]),
                mineral_reserves: Map::new(),
                shipyard_queue: vec![],
                construction_queue: vec![],
            },
        );

        (Simulation { state, content }, freighter_id, short_id, surplus_id)
    }

    #[test]
    fn autopilot_routes_an_idle_freighter_to_a_shortage() {
        let (sim, freighter_id, short_id, surplus_id) = setup();
        let mut autopilot = AutopilotController::default();
        let orders = autopilot.generate_orders(&sim);
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].0, freighter_id);
        assert!(matches!(&orders[0].1, Order::LoadMineral { colony_id, .. } if *colony_id == surplus_id));
        assert!(matches!(&orders[1].1, Order::UnloadMineral { colony_id, .. } if *colony_id == short_id));
    }

    #[test]
    fn autopilot_leaves_ships_without_the_automation_flag_alone() {
        let (mut sim, freighter_id, _short_id, _surplus_id) = setup();
        sim.state.ships.get_mut(&freighter_id).unwrap().automation.auto_freight = false;
        let mut autopilot = AutopilotController::default();
        assert!(autopilot.generate_orders(&sim).is_empty());
    }

    #[test]
    fn autopilot_skips_ships_with_a_non_empty_queue() {
        let (mut sim, freighter_id, _short_id, _surplus_id) = setup();
        sim.issue_wait_days(freighter_id, 1.0);
        let mut autopilot = AutopilotController::default();
        assert!(autopilot.generate_orders(&sim).is_empty());
    }

    #[test]
    fn scenario_source_replays_orders_on_their_scheduled_day() {
        let (mut sim, freighter_id, _short_id, _surplus_id) = setup();
        let mut schedule = BTreeMap::new();
        schedule.insert(0, vec![(freighter_id, Order::WaitDays { days_remaining: 1.0 })]);
        let mut source = ScenarioSource::new(schedule);
        drive_hours(&mut sim, &mut source, 1);
        // One hour of a one-day wait order leaves it queued, partially consumed.
        assert_eq!(sim.state().ship_orders[&freighter_id].queue.len(), 1);
        assert!(matches!(
            sim.state().ship_orders[&freighter_id].queue.front(),
            Some(Order::WaitDays { days_remaining }) if *days_remaining < 1.0
        ));
    }
}
