//! Matches tankers carrying a surplus above their reserve fraction to ships
//! running low on fuel, proposing `TransferFuelToShip` orders.

use crate::content::GameContent;
use crate::id::Id;
use crate::orders::Order;
use crate::planners::PlannerStatus;
use crate::state::GameState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelPlannerOptions {
    pub max_legs_per_tanker: u32,
    pub max_items: usize,
}

impl Default for FuelPlannerOptions {
    fn default() -> Self {
        FuelPlannerOptions {
            max_legs_per_tanker: 4,
            max_items: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelAssignment {
    pub tanker_ship_id: Id,
    pub target_ship_id: Id,
    pub tons: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelPlannerResult {
    pub status: PlannerStatus,
    pub assignments: Vec<FuelAssignment>,
}

/// Fuel a tanker can give away while keeping its own reserve (the same
/// threshold fraction that triggers a refuel request on any other ship).
fn fuel_available(state: &GameState, content: &GameContent, ship_id: Id) -> f64 {
    let Some(ship) = state.ships.get(&ship_id) else {
        return 0.0;
    };
    let Some(design) = content.designs.get(&ship.design_id) else {
        return 0.0;
    };
    let reserve = design.fuel_capacity_tons * content.config.auto_tanker_request_threshold_fraction;
    (ship.fuel_tons - reserve).max(0.0)
}

fn fuel_needed(state: &GameState, content: &GameContent, ship_id: Id) -> f64 {
    let Some(ship) = state.ships.get(&ship_id) else {
        return 0.0;
    };
    let Some(design) = content.designs.get(&ship.design_id) else {
        return 0.0;
    };
    let threshold = design.fuel_capacity_tons * content.config.auto_tanker_request_threshold_fraction;
    if ship.fuel_tons >= threshold {
        return 0.0;
    }
    (design.fuel_capacity_tons * content.config.auto_tanker_fill_target_fraction - ship.fuel_tons).max(0.0)
}

/// Greedily routes `tanker_ids` to the most fuel-starved ship in
/// `target_ids` first, up to `max_legs_per_tanker` transfers per tanker.
pub fn plan(state: &GameState, content: &GameContent, tanker_ids: &[Id], target_ids: &[Id], options: &FuelPlannerOptions) -> FuelPlannerResult {
    let mut status = PlannerStatus::ok();
    let mut assignments = Vec::new();

    let mut targets: Vec<(Id, f64)> = target_ids
        .iter()
        .map(|&id| (id, fuel_needed(state, content, id)))
        .filter(|(_, need)| *need > 0.0)
        .collect();
    targets.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));

    if targets.is_empty() {
        return FuelPlannerResult { status, assignments };
    }

    let mut tanker_legs: Vec<u32> = vec![0; tanker_ids.len()];
    let mut tanker_supply: Vec<f64> = tanker_ids.iter().map(|&id| fuel_available(state, content, id)).collect();

    for (target_id, mut need) in targets {
        while need > 1e-9 {
            if assignments.len() >= options.max_items {
                status.mark_truncated("max_items reached");
                return FuelPlannerResult { status, assignments };
            }
            let Some(tanker_idx) = tanker_supply
                .iter()
                .zip(tanker_legs.iter())
                .enumerate()
                .filter(|(_, (supply, legs))| **supply > 1e-9 && **legs < options.max_legs_per_tanker)
                .max_by(|a, b| a.1 .0.partial_cmp(b.1 .0).unwrap())
                .map(|(idx, _)| idx)
            else {
                status.mark_truncated("no tanker capacity remaining for some targets");
                break;
            };

            let tons = need.min(tanker_supply[tanker_idx]);
            if tons < content.config.auto_tanker_min_transfer_tons {
                tanker_legs[tanker_idx] = options.max_legs_per_tanker;
                continue;
            }

            assignments.push(FuelAssignment {
                tanker_ship_id: tanker_ids[tanker_idx],
                target_ship_id: target_id,
                tons,
            });
            tanker_supply[tanker_idx] -= tons;
            tanker_legs[tanker_idx] += 1;
            need -= tons;
        }
    }

    FuelPlannerResult { status, assignments }
}

pub fn apply(state: &mut GameState, assignments: &[FuelAssignment]) {
    for assignment in assignments {
        if let Some(orders) = state.ship_orders.get_mut(&assignment.tanker_ship_id) {
            orders.queue.push_back(Order::TransferFuelToShip {
                target_ship_id: assignment.target_ship_id,
                tons: assignment.tons,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, base_state_with_ship};

    #[test]
    fn routes_tanker_to_the_most_starved_target_first() {
        let content = base_content();
        let mut state = base_state_with_ship();
        let tanker_id = *state.ships.keys().next().unwrap();
        state.ships.get_mut(&tanker_id).unwrap().fuel_tons = 1000.0;

        let low_id = state.allocate_id();
        let mut low = state.ships[&tanker_id].clone();
        low.id = low_id;
        low.fuel_tons = 1.0;
        state.ships.insert(low_id, low);

        let high_id = state.allocate_id();
        let mut high = state.ships[&tanker_id].clone();
        high.id = high_id;
        high.fuel_tons = 50.0;
        state.ships.insert(high_id, high);

        let result = plan(&state, &content, &[tanker_id], &[low_id, high_id], &FuelPlannerOptions::default());
        assert!(!result.assignments.is_empty());
        assert_eq!(result.assignments[0].target_ship_id, low_id);
    }
}
