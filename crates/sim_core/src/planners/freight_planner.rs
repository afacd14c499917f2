//! Matches colonies with a mineral shortfall against colonies with an
//! exportable surplus, and proposes `LoadMineral`/`UnloadMineral` order pairs
//! for idle freighters. Read-only: `apply` is the only entry point that ever
//! issues real orders, and it does so through the ordinary order queue, not
//! by mutating colony stock directly.

use crate::content::GameContent;
use crate::id::Id;
use crate::orders::Order;
use crate::planners::PlannerStatus;
use crate::state::GameState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightPlannerOptions {
    pub max_items: usize,
    /// Days of consumption held as a buffer before a colony counts as short
    /// or as having an exportable surplus.
    pub buffer_days: f64,
}

impl Default for FreightPlannerOptions {
    fn default() -> Self {
        FreightPlannerOptions {
            max_items: 64,
            buffer_days: 5.0,
        }
    }
}

/// Per-colony, per-mineral deficit (positive) and surplus (positive) tons,
/// relative to `buffer_days` of local consumption.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogisticsNeeds {
    pub missing_tons: HashMap<Id, HashMap<String, f64>>,
    pub exportable_tons: HashMap<Id, HashMap<String, f64>>,
}

fn colony_consumption_per_day(state: &GameState, content: &GameContent, colony_id: Id) -> HashMap<String, f64> {
    let mut out: HashMap<String, f64> = HashMap::new();
    let Some(colony) = state.colonies.get(&colony_id) else {
        return out;
    };
    for (installation_id, &count) in &colony.installations {
        let Some(def) = content.installations.get(installation_id) else {
            continue;
        };
        for (mineral, rate) in &def.consumption_per_day {
            *out.entry(mineral.clone()).or_insert(0.0) += rate * f64::from(count);
        }
    }
    out
}

/// Minerals a colony needs to finish what's already in its shipyard and
/// construction queues: the remaining hull cost of every ship under
/// construction, plus the unpaid build cost of the front construction order
/// (construction pays its full cost up front, not per day).
fn colony_build_needs(state: &GameState, content: &GameContent, colony_id: Id) -> HashMap<String, f64> {
    let mut out: HashMap<String, f64> = HashMap::new();
    let Some(colony) = state.colonies.get(&colony_id) else {
        return out;
    };
    for order in &colony.shipyard_queue {
        let Some(design_id) = &order.design_id else {
            continue;
        };
        let Some(design) = content.designs.get(design_id) else {
            continue;
        };
        for (mineral, cost_per_ton) in &design.cost_per_ton {
            *out.entry(mineral.clone()).or_insert(0.0) += cost_per_ton * order.tons_remaining;
        }
    }
    if let Some(order) = colony.construction_queue.first() {
        if !order.minerals_paid {
            if let Some(def) = content.installations.get(&order.installation_id) {
                for (mineral, tons) in &def.build_costs {
                    *out.entry(mineral.clone()).or_insert(0.0) += tons;
                }
            }
        }
    }
    out
}

/// Computes [`LogisticsNeeds`] across every colony owned by `faction_id`.
pub fn logistics_needs_for_faction(state: &GameState, content: &GameContent, faction_id: Id, buffer_days: f64) -> LogisticsNeeds {
    let mut needs = LogisticsNeeds::default();
    for colony_id in state.sorted_colony_ids() {
        let colony = &state.colonies[&colony_id];
        if colony.faction_id != faction_id {
            continue;
        }
        let consumption = colony_consumption_per_day(state, content, colony_id);
        let build_needs = colony_build_needs(state, content, colony_id);

        let mut required: HashMap<String, f64> = HashMap::new();
        for (mineral, rate) in &consumption {
            *required.entry(mineral.clone()).or_insert(0.0) += rate * buffer_days;
        }
        for (mineral, tons) in &build_needs {
            *required.entry(mineral.clone()).or_insert(0.0) += tons;
        }

        let mut missing = HashMap::new();
        for (mineral, required_tons) in &required {
            let stock = colony.mineral_tons(mineral);
            if stock < *required_tons {
                missing.insert(mineral.clone(), required_tons - stock);
            }
        }

        let mut exportable = HashMap::new();
        for (mineral, stock) in &colony.minerals {
            let reserve = required
                .get(mineral)
                .copied()
                .unwrap_or(0.0)
                .max(colony.mineral_reserves.get(mineral).copied().unwrap_or(0.0));
            if *stock > reserve {
                exportable.insert(mineral.clone(), *stock - reserve);
            }
        }

        if !missing.is_empty() {
            needs.missing_tons.insert(colony_id, missing);
        }
        if !exportable.is_empty() {
            needs.exportable_tons.insert(colony_id, exportable);
        }
    }
    needs
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightAssignment {
    pub ship_id: Id,
    pub source_colony_id: Id,
    pub dest_colony_id: Id,
    pub mineral: String,
    pub tons: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightPlannerResult {
    pub status: PlannerStatus,
    pub assignments: Vec<FreightAssignment>,
}

fn distance_mkm(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn colony_position(state: &GameState, colony_id: Id) -> Option<(f64, f64)> {
    let colony = state.colonies.get(&colony_id)?;
    state.bodies.get(&colony.body_id).map(|b| b.position_mkm)
}

fn ship_speed_mkm_per_day(state: &GameState, content: &GameContent, ship_id: Id) -> f64 {
    state
        .ships
        .get(&ship_id)
        .and_then(|s| content.designs.get(&s.design_id))
        .map(|d| d.speed_km_s * 86_400.0 / 1_000_000.0)
        .unwrap_or(0.0)
}

/// Matches idle freighters in `candidate_ship_ids` to a deficit colony and
/// the cheapest-to-reach surplus colony for one of its missing minerals.
/// Deterministic tie-break: efficiency (`total_tons / (eta_days + 1e-9)` for
/// the next candidate ship in line), then total tons, then destination id,
/// then source id.
pub fn plan(
    state: &GameState,
    content: &GameContent,
    faction_id: Id,
    candidate_ship_ids: &[Id],
    options: &FreightPlannerOptions,
) -> FreightPlannerResult {
    let needs = logistics_needs_for_faction(state, content, faction_id, options.buffer_days);
    let mut assignments = Vec::new();
    let mut status = PlannerStatus::ok();

    if needs.missing_tons.is_empty() {
        return FreightPlannerResult { status, assignments };
    }

    let mut remaining_exportable = needs.exportable_tons.clone();
    let mut dest_ids: Vec<Id> = needs.missing_tons.keys().copied().collect();
    dest_ids.sort_unstable();

    let mut ship_iter = candidate_ship_ids.iter().copied().peekable();

    'dest: for dest_id in dest_ids {
        let Some(dest_pos) = colony_position(state, dest_id) else {
            continue;
        };
        let mut minerals: Vec<String> = needs.missing_tons[&dest_id].keys().cloned().collect();
        minerals.sort();

        for mineral in minerals {
            if assignments.len() >= options.max_items {
                status.mark_truncated("max_items reached");
                break 'dest;
            }
            let required = needs.missing_tons[&dest_id][&mineral];

            let Some(&peek_ship_id) = ship_iter.peek() else {
                status.mark_truncated("no more idle freighters available");
                break 'dest;
            };
            let speed = ship_speed_mkm_per_day(state, content, peek_ship_id).max(1e-9);

            let mut candidates: Vec<(Id, f64, f64)> = remaining_exportable
                .iter()
                .filter_map(|(src_id, minerals)| {
                    let available = *minerals.get(&mineral)?;
                    if available <= 0.0 || *src_id == dest_id {
                        return None;
                    }
                    let src_pos = colony_position(state, *src_id)?;
                    let eta_days = distance_mkm(src_pos, dest_pos) / speed;
                    Some((*src_id, available, eta_days))
                })
                .collect();
            // efficiency = total_tons / (eta_days + 1e-9), highest first;
            // ties broken by total tons, then dest id (fixed), then source id.
            candidates.sort_by(|a, b| {
                let eff_a = a.1.min(required) / (a.2 + 1e-9);
                let eff_b = b.1.min(required) / (b.2 + 1e-9);
                eff_b
                    .partial_cmp(&eff_a)
                    .unwrap()
                    .then(b.1.partial_cmp(&a.1).unwrap())
                    .then(a.0.cmp(&b.0))
            });

            let Some((src_id, available, _)) = candidates.into_iter().next() else {
                continue;
            };
            let Some(ship_id) = ship_iter.next() else {
                status.mark_truncated("no more idle freighters available");
                break 'dest;
            };

            let tons = required.min(available).min(available * content.config.auto_freight_max_take_fraction_of_surplus);
            if tons < content.config.auto_freight_min_transfer_tons {
                continue;
            }

            if let Some(src_minerals) = remaining_exportable.get_mut(&src_id) {
                if let Some(left) = src_minerals.get_mut(&mineral) {
                    *left -= tons;
                }
            }

            assignments.push(FreightAssignment {
                ship_id,
                source_colony_id: src_id,
                dest_colony_id: dest_id,
                mineral,
                tons,
            });

            if !content.config.auto_freight_multi_mineral {
                continue 'dest;
            }
        }
    }

    FreightPlannerResult { status, assignments }
}

/// Issues the `LoadMineral`/`UnloadMineral` order pair for each assignment.
/// If the assigned ship already has some of the mineral aboard, only the
/// shortfall is queued to load; cargo already aboard goes straight to the
/// `UnloadMineral` leg.
pub fn apply(state: &mut GameState, assignments: &[FreightAssignment]) {
    for assignment in assignments {
        let aboard = state
            .ships
            .get(&assignment.ship_id)
            .map(|s| s.cargo.get(&assignment.mineral).copied().unwrap_or(0.0))
            .unwrap_or(0.0);
        let Some(orders) = state.ship_orders.get_mut(&assignment.ship_id) else {
            continue;
        };
        let to_load = (assignment.tons - aboard).max(0.0);
        if to_load > 0.0 {
            orders.queue.push_back(Order::LoadMineral {
                colony_id: assignment.source_colony_id,
                mineral: assignment.mineral.clone(),
                tons: to_load,
            });
        }
        orders.queue.push_back(Order::UnloadMineral {
            colony_id: assignment.dest_colony_id,
            mineral: assignment.mineral.clone(),
            tons: assignment.tons,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::InstallationDef;
    use crate::state::Colony;
    use crate::test_fixtures::{base_content, stub_body};
    use std::collections::HashMap as Map;

    fn setup() -> (GameState, GameContent, Id, Id) {
        let mut content = base_content();
        content.installations.insert(
            "refinery".to_string(),
            InstallationDef {
                consumption_per_day: Map::from([("Duranium".to_string(), 10.0)]),
                ..Default::default()
            },
        );
        let mut state = GameState::new(1);
        let body_a = state.allocate_id();
        state.bodies.insert(body_a, stub_body(body_a, Id(1), (0.0, 0.0)));
        let body_b = state.allocate_id();
        state.bodies.insert(body_b, stub_body(body_b, Id(1), (100.0, 0.0)));

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
        let freighter_id = state.allocate_id();
        let mut ship = crate::test_fixtures::base_state_with_ship().ships.values().next().unwrap().clone();
        ship.id = freighter_id;
        state.ships.insert(freighter_id, ship);

        (state, content, short_id, surplus_id)
    }

    #[test]
    fn matches_deficit_colony_to_surplus_colony() {
        let (state, content, short_id, surplus_id) = setup();
        let candidates: Vec<Id> = state.ships.keys().copied().collect();

        let result = plan(&state, &content, Id(1), &candidates, &FreightPlannerOptions::default());
        assert_eq!(result.assignments.len(), 1);
        let a = &result.assignments[0];
        assert_eq!(a.dest_colony_id, short_id);
        assert_eq!(a.source_colony_id, surplus_id);
        assert_eq!(a.mineral, "Duranium");
    }
}
