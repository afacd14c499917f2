//! Finds a maintenance-resupply colony for each ship whose condition has
//! dropped below a threshold, preferring the ship's own faction's colonies
//! and shipyards when the ship is critical.

use crate::content::GameContent;
use crate::id::Id;
use crate::planners::PlannerStatus;
use crate::state::GameState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenancePlannerOptions {
    pub condition_threshold: f64,
    pub critical_threshold: f64,
    pub max_items: usize,
}

impl Default for MaintenancePlannerOptions {
    fn default() -> Self {
        MaintenancePlannerOptions {
            condition_threshold: 0.8,
            critical_threshold: 0.3,
            max_items: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceAssignment {
    pub ship_id: Id,
    pub colony_id: Id,
    pub travel_days: f64,
    pub supply_tons_reserved: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenancePlannerResult {
    pub status: PlannerStatus,
    pub assignments: Vec<MaintenanceAssignment>,
    pub unplanned_ship_ids: Vec<Id>,
}

fn distance_mkm(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn supply_needed(state: &GameState, content: &GameContent, ship_id: Id) -> f64 {
    let Some(ship) = state.ships.get(&ship_id) else {
        return 0.0;
    };
    let Some(design) = content.designs.get(&ship.design_id) else {
        return 0.0;
    };
    content.config.ship_maintenance_tons_per_day_per_mass_ton * design.mass_tons
}

fn is_maintenance_colony(content: &GameContent, state: &GameState, colony_id: Id) -> bool {
    let Some(colony) = state.colonies.get(&colony_id) else {
        return false;
    };
    colony
        .installations
        .keys()
        .any(|id| content.installations.get(id).map(|def| def.maintenance_supply_per_day > 0.0).unwrap_or(false))
}

fn has_shipyard(content: &GameContent, state: &GameState, colony_id: Id) -> bool {
    let Some(colony) = state.colonies.get(&colony_id) else {
        return false;
    };
    colony
        .installations
        .keys()
        .any(|id| content.installations.get(id).map(|def| def.shipyard_build_rate_tons_per_day > 0.0).unwrap_or(false))
}

fn mineral_stock(state: &GameState, colony_id: Id, mineral: &str) -> f64 {
    state.colonies.get(&colony_id).and_then(|c| c.minerals.get(mineral)).copied().unwrap_or(0.0)
}

/// Scores candidate colonies lexicographically: travel ETA first, with a
/// soft penalty on non-shipyard colonies for ships below `critical_threshold`,
/// and a tie-break preference for the ship's own faction.
pub fn plan(
    state: &GameState,
    content: &GameContent,
    ship_ids: &[Id],
    candidate_colony_ids: &[Id],
    options: &MaintenancePlannerOptions,
) -> MaintenancePlannerResult {
    let mut status = PlannerStatus::ok();
    let mut assignments = Vec::new();
    let mut unplanned_ship_ids = Vec::new();
    let resource = content.config.ship_maintenance_resource_id.clone();
    let mut reserved: HashMap<Id, f64> = HashMap::new();

    let mut needy: Vec<Id> = ship_ids
        .iter()
        .copied()
        .filter(|&id| state.ships.get(&id).map(|s| s.maintenance_condition < options.condition_threshold).unwrap_or(false))
        .collect();
    needy.sort_by_key(|&id| {
        let condition = state.ships.get(&id).map(|s| s.maintenance_condition).unwrap_or(1.0);
        (condition * 1e9) as i64
    });

    for ship_id in needy {
        if assignments.len() + unplanned_ship_ids.len() >= options.max_items {
            status.mark_truncated("max_items reached");
            break;
        }
        let Some(ship) = state.ships.get(&ship_id) else {
            continue;
        };
        let critical = ship.maintenance_condition < options.critical_threshold;
        let needed = supply_needed(state, content, ship_id);

        let mut best: Option<(Id, f64)> = None; // (colony_id, score)
        for &colony_id in candidate_colony_ids {
            if !is_maintenance_colony(content, state, colony_id) {
                continue;
            }
            let available = mineral_stock(state, colony_id, &resource) - reserved.get(&colony_id).copied().unwrap_or(0.0);
            if available < needed {
                continue;
            }
            let Some(colony) = state.colonies.get(&colony_id) else {
                continue;
            };
            let Some(body) = state.bodies.get(&colony.body_id) else {
                continue;
            };
            let speed = content
                .designs
                .get(&ship.design_id)
                .map(|d| d.speed_km_s * content.config.seconds_per_day / 1e6)
                .unwrap_or(0.0);
            let travel_days = if speed > 0.0 { distance_mkm(ship.position_mkm, body.position_mkm) / speed } else { 0.0 };
            let shipyard_bias = if critical && !has_shipyard(content, state, colony_id) { 2.0 } else { 0.0 };
            let own_faction_bias = if colony.faction_id == ship.faction_id { 0.0 } else { 1.0 };
            let score = travel_days + shipyard_bias + own_faction_bias;

            if best.as_ref().map(|(_, s)| score < *s).unwrap_or(true) {
                best = Some((colony_id, score));
            }
        }

        match best {
            Some((colony_id, _)) => {
                *reserved.entry(colony_id).or_insert(0.0) += needed;
                let body_pos = state
                    .colonies
                    .get(&colony_id)
                    .and_then(|c| state.bodies.get(&c.body_id))
                    .map(|b| b.position_mkm)
                    .unwrap_or(ship.position_mkm);
                let speed = content
                    .designs
                    .get(&ship.design_id)
                    .map(|d| d.speed_km_s * content.config.seconds_per_day / 1e6)
                    .unwrap_or(0.0);
                let travel_days = if speed > 0.0 { distance_mkm(ship.position_mkm, body_pos) / speed } else { 0.0 };
                assignments.push(MaintenanceAssignment {
                    ship_id,
                    colony_id,
                    travel_days,
                    supply_tons_reserved: needed,
                });
            }
            None => unplanned_ship_ids.push(ship_id),
        }
    }

    MaintenancePlannerResult {
        status,
        assignments,
        unplanned_ship_ids,
    }
}
