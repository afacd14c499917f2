//! Assigns damaged ships to repair-capable colonies, modeling each colony's
//! shipyards as a single-server queue so a busy, high-throughput yard isn't
//! always preferred over an idle, slower one.

use crate::content::GameContent;
use crate::id::Id;
use crate::maintenance::blockade_output_multiplier_for_colony;
use crate::planners::PlannerStatus;
use crate::state::GameState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairPlannerOptions {
    pub max_items: usize,
}

impl Default for RepairPlannerOptions {
    fn default() -> Self {
        RepairPlannerOptions { max_items: 64 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairAssignment {
    pub ship_id: Id,
    pub colony_id: Id,
    pub travel_days: f64,
    pub queue_wait_days: f64,
    pub repair_days: f64,
    pub finish_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairPlannerResult {
    pub status: PlannerStatus,
    pub assignments: Vec<RepairAssignment>,
    pub backlog_days: f64,
    pub makespan_days: f64,
}

fn distance_mkm(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn hp_deficit(state: &GameState, ship_id: Id) -> f64 {
    state.ships.get(&ship_id).map(|s| (s.max_hp - s.hp).max(0.0)).unwrap_or(0.0)
}

fn shipyard_capacity(state: &GameState, content: &GameContent, colony_id: Id) -> f64 {
    let Some(colony) = state.colonies.get(&colony_id) else {
        return 0.0;
    };
    let shipyards: u32 = colony
        .installations
        .iter()
        .filter_map(|(id, count)| content.installations.get(id).filter(|def| def.shipyard_build_rate_tons_per_day > 0.0).map(|_| *count))
        .sum();
    if shipyards == 0 {
        return 0.0;
    }
    let blockade_mult = blockade_output_multiplier_for_colony(state, content, colony_id);
    content.config.repair_hp_per_day_per_shipyard * f64::from(shipyards) * blockade_mult
}

fn colony_position(state: &GameState, colony_id: Id) -> Option<(Id, (f64, f64))> {
    let colony = state.colonies.get(&colony_id)?;
    let body = state.bodies.get(&colony.body_id)?;
    Some((body.system_id, body.position_mkm))
}

/// Assigns each damaged ship in `ship_ids` to the repair colony minimizing
/// its finish time, treating each colony as a queue whose `busy_until_day`
/// advances as assignments land on it. Ties favor the ship's own faction's
/// colonies, then shorter travel, then higher capacity, then colony id.
pub fn plan(
    state: &GameState,
    content: &GameContent,
    faction_id: Id,
    ship_ids: &[Id],
    repair_colony_ids: &[Id],
    options: &RepairPlannerOptions,
) -> RepairPlannerResult {
    let mut status = PlannerStatus::ok();
    let mut assignments = Vec::new();
    let mut busy_until: HashMap<Id, f64> = repair_colony_ids.iter().map(|&id| (id, 0.0)).collect();

    let mut damaged: Vec<(Id, f64)> = ship_ids.iter().map(|&id| (id, hp_deficit(state, id))).filter(|(_, d)| *d > 0.0).collect();
    damaged.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));

    for (ship_id, deficit) in damaged {
        if assignments.len() >= options.max_items {
            status.mark_truncated("max_items reached");
            break;
        }
        let Some(ship) = state.ships.get(&ship_id) else {
            continue;
        };

        let mut best: Option<(Id, f64, f64, f64, f64)> = None; // (colony, finish_day, travel, wait, repair_days)
        for &colony_id in repair_colony_ids {
            let capacity = shipyard_capacity(state, content, colony_id);
            if capacity <= 0.0 {
                continue;
            }
            let Some((_, colony_pos)) = colony_position(state, colony_id) else {
                continue;
            };
            let speed = content
                .designs
                .get(&ship.design_id)
                .map(|d| d.speed_km_s * content.config.seconds_per_day / 1e6)
                .unwrap_or(0.0);
            let travel_days = if speed > 0.0 { distance_mkm(ship.position_mkm, colony_pos) / speed } else { 0.0 };
            let arrival_day = travel_days;
            let queue_free_at = busy_until.get(&colony_id).copied().unwrap_or(0.0);
            let wait_days = (queue_free_at - arrival_day).max(0.0);
            let repair_days = deficit / capacity;
            let finish_day = arrival_day + wait_days + repair_days;

            let owned = state.colonies.get(&colony_id).map(|c| c.faction_id == faction_id).unwrap_or(false);
            let is_better = match &best {
                None => true,
                Some((_, best_finish, _, _, _)) => {
                    (finish_day < best_finish - 1e-9)
                        || ((finish_day - best_finish).abs() <= 1e-9 && owned)
                        || ((finish_day - best_finish).abs() <= 1e-9 && travel_days < best.as_ref().unwrap().2)
                }
            };
            if is_better {
                best = Some((colony_id, finish_day, travel_days, wait_days, repair_days));
            }
        }

        let Some((colony_id, finish_day, travel_days, wait_days, repair_days)) = best else {
            continue;
        };
        *busy_until.get_mut(&colony_id).unwrap() = finish_day;
        assignments.push(RepairAssignment {
            ship_id,
            colony_id,
            travel_days,
            queue_wait_days: wait_days,
            repair_days,
            finish_day,
        });
    }

    let makespan_days = busy_until.values().copied().fold(0.0, f64::max);
    let backlog_days: f64 = assignments.iter().map(|a| a.queue_wait_days).sum();

    RepairPlannerResult {
        status,
        assignments,
        backlog_days,
        makespan_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::InstallationDef;
    use crate::state::Colony;
    use crate::test_fixtures::{base_content, base_state_with_ship, stub_body};
    use std::collections::HashMap as Map;

    #[test]
    fn damaged_ship_is_routed_to_the_only_repair_colony() {
        let mut content = base_content();
        content.installations.insert(
            "yard".to_string(),
            InstallationDef {
                shipyard_build_rate_tons_per_day: 10.0,
                ..Default::default()
            },
        );
        let mut state = base_state_with_ship();
        let ship_id = *state.ships.keys().next().unwrap();
        state.ships.get_mut(&ship_id).unwrap().hp = 50.0;
        state.ships.get_mut(&ship_id).unwrap().max_hp = 100.0;

        let body_id = state.allocate_id();
        state.bodies.insert(body_id, stub_body(body_id, Id(1), (0.0, 0.0)));
        let colony_id = state.allocate_id();
        state.colonies.insert(
            colony_id,
            Colony {
                id: colony_id,
                faction_id: Id(1),
                body_id,
                name: "Yard".to_string(),
                population_millions: 1.0,
                installations: Map::from([("yard".to_string(), 1)]),
                installation_targets: Map::new(),
                minerals: Map::new(),
                mineral_reserves: Map::new(),
                shipyard_queue: vec![],
                construction_queue: vec![],
            },
        );

        let result = plan(&state, &content, Id(1), &[ship_id], &[colony_id], &RepairPlannerOptions::default());
        assert_eq!(result.assignments.len(), 1);
        assert_eq!(result.assignments[0].colony_id, colony_id);
        assert!(result.assignments[0].repair_days > 0.0);
    }
}
