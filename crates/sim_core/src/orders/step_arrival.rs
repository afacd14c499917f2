//! Per-order-type completion logic, run once a ship reaches the point
//! `step.rs` resolved for its current order.

use super::Order;
use crate::content::GameContent;
use crate::events::{emit, EventBuilder, EventCategory, EventKind, EventLevel};
use crate::id::Id;
use crate::state::{Colony, GameState, Ship, Wreck};

fn clock(state: &GameState) -> (i64, u8) {
    (state.date.days_since_epoch(), state.hour_of_day)
}

#[allow(clippy::too_many_arguments)]
fn record(
    state: &mut GameState,
    level: EventLevel,
    category: EventCategory,
    message: impl Into<String>,
    ship_id: Id,
    colony_id: Option<Id>,
    kind: Option<EventKind>,
) {
    let (day, hour) = clock(state);
    let faction_id = state.ships.get(&ship_id).map(|s| s.faction_id);
    let system_id = state.ships.get(&ship_id).map(|s| s.system_id);
    let event = emit(
        &mut state.next_event_seq,
        message,
        EventBuilder {
            day,
            hour,
            level,
            category,
            faction_id,
            system_id,
            ship_id: Some(ship_id),
            colony_id,
            kind,
        },
    );
    state.events.push(event);
}

fn pop_front(state: &mut GameState, ship_id: Id) {
    if let Some(orders) = state.ship_orders.get_mut(&ship_id) {
        orders.queue.pop_front();
    }
}

pub(crate) fn handle_arrival(state: &mut GameState, content: &GameContent, ship_id: Id, order: Order, dt_days: f64) {
    match order {
        Order::MoveToPoint { .. } | Order::MoveToBody { .. } | Order::TravelToSystem { .. } => {
            pop_front(state, ship_id);
        }
        Order::OrbitBody { duration_days, .. } => handle_orbit(state, ship_id, duration_days),
        Order::TravelViaJump { jump_point_id } => handle_jump_transit(state, ship_id, jump_point_id),
        Order::SurveyJumpPoint {
            jump_point_id,
            transit_when_done,
            progress_points,
        } => handle_survey(state, ship_id, jump_point_id, transit_when_done, progress_points),
        Order::LoadMineral { colony_id, mineral, tons } => handle_load_mineral(state, content, ship_id, colony_id, &mineral, tons, dt_days),
        Order::UnloadMineral { colony_id, mineral, tons } => {
            handle_unload_mineral(state, content, ship_id, colony_id, &mineral, tons, dt_days);
        }
        Order::LoadTroops { colony_id, troops } => handle_load_troops(state, content, ship_id, colony_id, troops, dt_days),
        Order::UnloadTroops { colony_id, troops } => handle_unload_troops(state, content, ship_id, colony_id, troops, dt_days),
        Order::LoadColonists { colony_id, millions } => handle_load_colonists(state, content, ship_id, colony_id, millions, dt_days),
        Order::UnloadColonists { colony_id, millions } => handle_unload_colonists(state, content, ship_id, colony_id, millions, dt_days),
        Order::TransferCargoToShip {
            target_ship_id,
            mineral,
            tons,
        } => handle_transfer_cargo(state, ship_id, target_ship_id, &mineral, tons),
        Order::TransferFuelToShip { target_ship_id, tons } => handle_transfer_fuel(state, ship_id, target_ship_id, tons),
        Order::TransferTroopsToShip { target_ship_id, troops } => handle_transfer_troops(state, ship_id, target_ship_id, troops),
        // Combat/escort orders are terminal or open-ended by the combat module's own logic, not here.
        Order::AttackShip { .. } | Order::EscortShip { .. } => {}
        Order::BombardColony { colony_id, duration_days } => handle_bombard(state, ship_id, colony_id, duration_days),
        Order::InvadeColony { colony_id } => handle_invade(state, ship_id, colony_id),
        Order::SalvageWreck { wreck_id, mineral, tons } => handle_salvage(state, content, ship_id, wreck_id, &mineral, tons),
        Order::InvestigateAnomaly {
            anomaly_id,
            duration_days,
            progress_days,
        } => handle_investigate(state, ship_id, anomaly_id, duration_days, progress_days),
        Order::ColonizeBody { body_id } => handle_colonize(state, content, ship_id, body_id),
        Order::ScrapShip { colony_id } => handle_scrap(state, ship_id, colony_id),
        Order::WaitDays { .. } => {}
    }
}

fn handle_orbit(state: &mut GameState, ship_id: Id, duration_days: f64) {
    if duration_days < 0.0 {
        return; // orbit indefinitely: order never self-completes
    }
    pop_front(state, ship_id);
}

fn handle_jump_transit(state: &mut GameState, ship_id: Id, jump_point_id: Id) {
    let Some(linked_id) = state.jump_points.get(&jump_point_id).and_then(|jp| jp.linked_jump_id) else {
        drop_with_reason(state, ship_id, "jump point has no linked exit");
        return;
    };
    let Some(linked) = state.jump_points.get(&linked_id).cloned() else {
        drop_with_reason(state, ship_id, "linked jump point missing");
        return;
    };
    if let Some(ship) = state.ships.get_mut(&ship_id) {
        ship.system_id = linked.system_id;
        ship.position_mkm = linked.position_mkm;
        ship.velocity_mkm_per_day = (0.0, 0.0);
    }
    pop_front(state, ship_id);
}

fn drop_with_reason(state: &mut GameState, ship_id: Id, reason: &str) {
    pop_front(state, ship_id);
    record(
        state,
        EventLevel::Warn,
        EventCategory::Movement,
        format!("order dropped: {reason}"),
        ship_id,
        None,
        Some(EventKind::OrderDropped {
            ship_id,
            reason: reason.to_string(),
        }),
    );
}

fn handle_survey(state: &mut GameState, ship_id: Id, jump_point_id: Id, transit_when_done: bool, progress_points: f64) {
    let already_surveyed = state.jump_points.get(&jump_point_id).map(|jp| jp.surveyed).unwrap_or(true);
    if already_surveyed {
        if let Some(jp) = state.jump_points.get_mut(&jump_point_id) {
            jp.surveyed = true;
        }
        if transit_when_done {
            handle_jump_transit(state, ship_id, jump_point_id);
        } else {
            pop_front(state, ship_id);
        }
        return;
    }
    let new_progress = progress_points + 1.0;
    const SURVEY_POINTS_REQUIRED: f64 = 10.0;
    if new_progress >= SURVEY_POINTS_REQUIRED {
        if let Some(jp) = state.jump_points.get_mut(&jump_point_id) {
            jp.surveyed = true;
        }
        if transit_when_done {
            handle_jump_transit(state, ship_id, jump_point_id);
        } else {
            pop_front(state, ship_id);
        }
    } else if let Some(orders) = state.ship_orders.get_mut(&ship_id) {
        if let Some(front) = orders.queue.front_mut() {
            *front = Order::SurveyJumpPoint {
                jump_point_id,
                transit_when_done,
                progress_points: new_progress,
            };
        }
    }
}

fn colony_mut<'a>(state: &'a mut GameState, colony_id: Id) -> Option<&'a mut Colony> {
    state.colonies.get_mut(&colony_id)
}

/// One-day throughput rate for a bulk mineral transfer: a ship can move its
/// own hold capacity in a single day.
fn mineral_transfer_rate(content: &GameContent, design_id: &str) -> f64 {
    content.designs.get(design_id).map(|d| d.cargo_capacity_tons).unwrap_or(0.0)
}

/// One-day throughput rate for troop loading/unloading: a ship can move its
/// own troop capacity in a single day.
fn troop_transfer_rate(content: &GameContent, design_id: &str) -> f64 {
    content.designs.get(design_id).map(|d| d.troop_capacity).unwrap_or(0.0)
}

fn colonist_transfer_rate(content: &GameContent, design_id: &str) -> f64 {
    let capacity = content.designs.get(design_id).map(|d| d.colony_capacity_millions).unwrap_or(0.0);
    let cfg = &content.config;
    (cfg.colonist_transfer_millions_per_day_per_colony_cap * capacity).max(cfg.colonist_transfer_millions_per_day_min)
}

fn handle_load_mineral(
    state: &mut GameState,
    content: &GameContent,
    ship_id: Id,
    colony_id: Id,
    mineral: &str,
    requested_tons: f64,
    dt_days: f64,
) {
    let Some(design_id) = state.ships.get(&ship_id).map(|s| s.design_id.clone()) else {
        return;
    };
    let step_cap = (mineral_transfer_rate(content, &design_id) * dt_days).max(0.0);
    let Some(colony) = colony_mut(state, colony_id) else {
        drop_with_reason(state, ship_id, "colony no longer exists");
        return;
    };
    let requested = requested_tons.max(0.0);
    let available = colony.mineral_tons(mineral);
    let moved = available.min(requested).min(step_cap);
    if moved > 0.0 {
        *colony.minerals.entry(mineral.to_string()).or_insert(0.0) -= moved;
    }
    let source_exhausted = available - moved <= 1e-9;
    if moved > 0.0 {
        if let Some(ship) = state.ships.get_mut(&ship_id) {
            *ship.cargo.entry(mineral.to_string()).or_insert(0.0) += moved;
        }
    }
    let remaining = requested - moved;
    if remaining <= 1e-9 || source_exhausted {
        pop_front(state, ship_id);
    } else if let Some(orders) = state.ship_orders.get_mut(&ship_id) {
        if let Some(front) = orders.queue.front_mut() {
            *front = Order::LoadMineral {
                colony_id,
                mineral: mineral.to_string(),
                tons: remaining,
            };
        }
    }
}

fn handle_unload_mineral(
    state: &mut GameState,
    content: &GameContent,
    ship_id: Id,
    colony_id: Id,
    mineral: &str,
    requested_tons: f64,
    dt_days: f64,
) {
    let Some(design_id) = state.ships.get(&ship_id).map(|s| s.design_id.clone()) else {
        return;
    };
    let step_cap = (mineral_transfer_rate(content, &design_id) * dt_days).max(0.0);
    let aboard = state.ships.get(&ship_id).map(|s| s.cargo.get(mineral).copied().unwrap_or(0.0)).unwrap_or(0.0);
    let requested = requested_tons.max(0.0);
    let moved = aboard.min(requested).min(step_cap);
    if moved > 0.0 {
        if let Some(ship) = state.ships.get_mut(&ship_id) {
            *ship.cargo.entry(mineral.to_string()).or_insert(0.0) -= moved;
        }
        if let Some(colony) = colony_mut(state, colony_id) {
            *colony.minerals.entry(mineral.to_string()).or_insert(0.0) += moved;
        }
    }
    let remaining = requested - moved;
    let source_exhausted = aboard - moved <= 1e-9;
    if remaining <= 1e-9 || source_exhausted {
        pop_front(state, ship_id);
    } else if let Some(orders) = state.ship_orders.get_mut(&ship_id) {
        if let Some(front) = orders.queue.front_mut() {
            *front = Order::UnloadMineral {
                colony_id,
                mineral: mineral.to_string(),
                tons: remaining,
            };
        }
    }
}

fn handle_load_troops(state: &mut GameState, content: &GameContent, ship_id: Id, colony_id: Id, requested: f64, dt_days: f64) {
    // Colonies don't yet track a garrison pool separate from population;
    // troops board from the colony's population directly.
    let Some(design_id) = state.ships.get(&ship_id).map(|s| s.design_id.clone()) else {
        return;
    };
    let step_cap = (troop_transfer_rate(content, &design_id) * dt_days).max(0.0);
    let Some(colony) = colony_mut(state, colony_id) else {
        drop_with_reason(state, ship_id, "colony no longer exists");
        return;
    };
    let requested = requested.max(0.0);
    let available = colony.population_millions;
    let moved = available.min(requested).min(step_cap);
    colony.population_millions -= moved;
    let source_exhausted = colony.population_millions <= 1e-9;
    if moved > 0.0 {
        if let Some(ship) = state.ships.get_mut(&ship_id) {
            ship.troops += moved;
        }
    }
    let remaining = requested - moved;
    if remaining <= 1e-9 || source_exhausted {
        pop_front(state, ship_id);
    } else if let Some(orders) = state.ship_orders.get_mut(&ship_id) {
        if let Some(front) = orders.queue.front_mut() {
            *front = Order::LoadTroops { colony_id, troops: remaining };
        }
    }
}

fn handle_unload_troops(state: &mut GameState, content: &GameContent, ship_id: Id, colony_id: Id, requested: f64, dt_days: f64) {
    let Some(design_id) = state.ships.get(&ship_id).map(|s| s.design_id.clone()) else {
        return;
    };
    let step_cap = (troop_transfer_rate(content, &design_id) * dt_days).max(0.0);
    let aboard = state.ships.get(&ship_id).map(|s| s.troops).unwrap_or(0.0);
    let requested = requested.max(0.0);
    let moved = aboard.min(requested).min(step_cap);
    if moved > 0.0 {
        if let Some(ship) = state.ships.get_mut(&ship_id) {
            ship.troops -= moved;
        }
        if let Some(colony) = colony_mut(state, colony_id) {
            colony.population_millions += moved;
        }
    }
    let remaining = requested - moved;
    let source_exhausted = aboard - moved <= 1e-9;
    if remaining <= 1e-9 || source_exhausted {
        pop_front(state, ship_id);
    } else if let Some(orders) = state.ship_orders.get_mut(&ship_id) {
        if let Some(front) = orders.queue.front_mut() {
            *front = Order::UnloadTroops { colony_id, troops: remaining };
        }
    }
}

fn handle_load_colonists(
    state: &mut GameState,
    content: &GameContent,
    ship_id: Id,
    colony_id: Id,
    requested_millions: f64,
    dt_days: f64,
) {
    let Some(design_id) = state.ships.get(&ship_id).map(|s| s.design_id.clone()) else {
        return;
    };
    let step_cap = (colonist_transfer_rate(content, &design_id) * dt_days).max(0.0);
    let Some(colony) = colony_mut(state, colony_id) else {
        drop_with_reason(state, ship_id, "colony no longer exists");
        return;
    };
    let requested = requested_millions.max(0.0);
    let available = colony.population_millions;
    let moved = available.min(requested).min(step_cap);
    colony.population_millions -= moved;
    let source_exhausted = colony.population_millions <= 1e-9;
    if moved > 0.0 {
        if let Some(ship) = state.ships.get_mut(&ship_id) {
            ship.colonists_millions += moved;
        }
    }
    let remaining = requested - moved;
    if remaining <= 1e-9 || source_exhausted {
        pop_front(state, ship_id);
    } else if let Some(orders) = state.ship_orders.get_mut(&ship_id) {
        if let Some(front) = orders.queue.front_mut() {
            *front = Order::LoadColonists { colony_id, millions: remaining };
        }
    }
}

fn handle_unload_colonists(
    state: &mut GameState,
    content: &GameContent,
    ship_id: Id,
    colony_id: Id,
    requested_millions: f64,
    dt_days: f64,
) {
    let Some(design_id) = state.ships.get(&ship_id).map(|s| s.design_id.clone()) else {
        return;
    };
    let step_cap = (colonist_transfer_rate(content, &design_id) * dt_days).max(0.0);
    let aboard = state.ships.get(&ship_id).map(|s| s.colonists_millions).unwrap_or(0.0);
    let requested = requested_millions.max(0.0);
    let moved = aboard.min(requested).min(step_cap);
    if moved > 0.0 {
        if let Some(ship) = state.ships.get_mut(&ship_id) {
            ship.colonists_millions -= moved;
        }
        if let Some(colony) = colony_mut(state, colony_id) {
            // Over-capacity colonists are not forcibly jettisoned (preserved on purpose).
            colony.population_millions += moved;
        }
    }
    let remaining = requested - moved;
    let source_exhausted = aboard - moved <= 1e-9;
    if remaining <= 1e-9 || source_exhausted {
        pop_front(state, ship_id);
    } else if let Some(orders) = state.ship_orders.get_mut(&ship_id) {
        if let Some(front) = orders.queue.front_mut() {
            *front = Order::UnloadColonists { colony_id, millions: remaining };
        }
    }
}

fn handle_transfer_cargo(state: &mut GameState, ship_id: Id, target_ship_id: Id, mineral: &str, requested: f64) {
    let aboard = state.ships.get(&ship_id).map(|s| s.cargo.get(mineral).copied().unwrap_or(0.0)).unwrap_or(0.0);
    let moved = aboard.min(requested.max(0.0));
    if moved > 0.0 {
        if let Some(ship) = state.ships.get_mut(&ship_id) {
            *ship.cargo.entry(mineral.to_string()).or_insert(0.0) -= moved;
        }
        if let Some(target) = state.ships.get_mut(&target_ship_id) {
            *target.cargo.entry(mineral.to_string()).or_insert(0.0) += moved;
        }
    }
    pop_front(state, ship_id);
}

fn handle_transfer_fuel(state: &mut GameState, ship_id: Id, target_ship_id: Id, requested: f64) {
    let available = state.ships.get(&ship_id).map(|s| s.fuel_tons).unwrap_or(0.0);
    let moved = available.min(requested.max(0.0));
    if moved > 0.0 {
        if let Some(ship) = state.ships.get_mut(&ship_id) {
            ship.fuel_tons -= moved;
        }
        if let Some(target) = state.ships.get_mut(&target_ship_id) {
            target.fuel_tons += moved;
        }
    }
    pop_front(state, ship_id);
}

fn handle_transfer_troops(state: &mut GameState, ship_id: Id, target_ship_id: Id, requested: f64) {
    let aboard = state.ships.get(&ship_id).map(|s| s.troops).unwrap_or(0.0);
    let moved = aboard.min(requested.max(0.0));
    if moved > 0.0 {
        if let Some(ship) = state.ships.get_mut(&ship_id) {
            ship.troops -= moved;
        }
        if let Some(target) = state.ships.get_mut(&target_ship_id) {
            target.troops += moved;
        }
    }
    pop_front(state, ship_id);
}

fn handle_bombard(state: &mut GameState, ship_id: Id, colony_id: Id, duration_days: f64) {
    // Actual output suppression is resolved each tick by `crate::maintenance`'s
    // blockade pass once a hostile ship holds position; this order just
    // persists it in range and counts down an optional duration.
    if duration_days <= 0.0 {
        return;
    }
    if let Some(orders) = state.ship_orders.get_mut(&ship_id) {
        if let Some(front) = orders.queue.front_mut() {
            *front = Order::BombardColony {
                colony_id,
                duration_days: duration_days - 1.0,
            };
            if duration_days - 1.0 <= 0.0 {
                orders.queue.pop_front();
            }
        }
    }
}

fn handle_invade(state: &mut GameState, ship_id: Id, _colony_id: Id) {
    // Ground combat attrition is resolved by `crate::combat::resolve_ground_battles`
    // once the invading troops are aboard a docked ship at the target colony;
    // this just confirms the ship is present. The order is popped there.
    let Some(ship) = state.ships.get(&ship_id) else {
        drop_with_reason(state, ship_id, "invader ship no longer exists");
        return;
    };
    if ship.troops <= 0.0 {
        drop_with_reason(state, ship_id, "no troops aboard to invade with");
    }
}

fn handle_salvage(state: &mut GameState, content: &GameContent, ship_id: Id, wreck_id: Id, mineral: &str, requested_tons: f64) {
    let Some(wreck) = state.wrecks.get(&wreck_id) else {
        drop_with_reason(state, ship_id, "wreck already salvaged");
        return;
    };
    let available = wreck.minerals.get(mineral).copied().unwrap_or(0.0);

    let design_id = state.ships.get(&ship_id).map(|s| s.design_id.clone());
    let capacity = design_id
        .as_deref()
        .and_then(|id| content.designs.get(id))
        .map(|d| d.cargo_capacity_tons)
        .unwrap_or(0.0);
    let aboard = state.ships.get(&ship_id).map(Ship::cargo_total_tons).unwrap_or(0.0);
    let space_left = (capacity - aboard).max(0.0);

    let moved = available.min(requested_tons.max(0.0)).min(space_left);
    if moved > 0.0 {
        if let Some(wreck) = state.wrecks.get_mut(&wreck_id) {
            *wreck.minerals.entry(mineral.to_string()).or_insert(0.0) -= moved;
        }
        if let Some(ship) = state.ships.get_mut(&ship_id) {
            *ship.cargo.entry(mineral.to_string()).or_insert(0.0) += moved;
        }
    }

    let depleted = state.wrecks.get(&wreck_id).map(Wreck::is_depleted).unwrap_or(true);
    if depleted {
        state.wrecks.remove(&wreck_id);
    }
    pop_front(state, ship_id);
}

fn handle_investigate(state: &mut GameState, ship_id: Id, anomaly_id: Id, duration_days: f64, progress_days: f64) {
    // `duration_days == 0` falls back to the anomaly's own `investigation_days` (preserved on purpose).
    let effective_duration = if duration_days > 0.0 {
        duration_days
    } else {
        state.anomalies.get(&anomaly_id).map(|a| a.investigation_days).unwrap_or(0.0)
    };

    let new_progress = progress_days + 1.0;
    if new_progress >= effective_duration {
        record(
            state,
            EventLevel::Info,
            EventCategory::General,
            "anomaly investigation complete",
            ship_id,
            None,
            None,
        );
        pop_front(state, ship_id);
        return;
    }
    if let Some(orders) = state.ship_orders.get_mut(&ship_id) {
        if let Some(front) = orders.queue.front_mut() {
            *front = Order::InvestigateAnomaly {
                anomaly_id,
                duration_days,
                progress_days: new_progress,
            };
        }
    }
}

fn handle_colonize(state: &mut GameState, content: &GameContent, ship_id: Id, body_id: Id) {
    let Some(ship) = state.ships.get(&ship_id) else {
        return;
    };
    if ship.colonists_millions <= 0.0 {
        drop_with_reason(state, ship_id, "no colonists aboard");
        return;
    }
    let faction_id = ship.faction_id;
    let design_capacity = content.designs.get(&ship.design_id).map(|d| d.colony_capacity_millions).unwrap_or(0.0);
    let population = ship.colonists_millions + design_capacity;

    let colony_id = state.allocate_id();
    state.colonies.insert(
        colony_id,
        Colony {
            id: colony_id,
            faction_id,
            body_id,
            name: format!("Colony {}", colony_id.0),
            population_millions: population,
            installations: std::collections::HashMap::new(),
            installation_targets: std::collections::HashMap::new(),
            minerals: std::collections::HashMap::new(),
            mineral_reserves: std::collections::HashMap::new(),
            shipyard_queue: Vec::new(),
            construction_queue: Vec::new(),
        },
    );

    record(
        state,
        EventLevel::Info,
        EventCategory::General,
        "colony founded",
        ship_id,
        Some(colony_id),
        Some(EventKind::ColonizeComplete { colony_id, body_id }),
    );

    // The colonizing ship is consumed (preserved on purpose).
    state.ships.remove(&ship_id);
    state.ship_orders.remove(&ship_id);
}

fn handle_scrap(state: &mut GameState, ship_id: Id, colony_id: Id) {
    let Some(ship) = state.ships.remove(&ship_id) else {
        return;
    };
    if let Some(colony) = colony_mut(state, colony_id) {
        for (mineral, tons) in ship.cargo {
            *colony.minerals.entry(mineral).or_insert(0.0) += tons * 0.5;
        }
    }
    state.ship_orders.remove(&ship_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Colony;
    use crate::test_fixtures::{base_content, base_state_with_ship, stub_body};
    use std::collections::HashMap;

    fn colonizer_content() -> GameContent {
        let mut content = base_content();
        let mut design = content.designs["scout"].clone();
        design.colony_capacity_millions = 50.0;
        design.troop_capacity = 10.0;
        content.designs.insert("colonizer".to_string(), design);
        content
    }

    fn colony_with_population(state: &mut GameState, population_millions: f64) -> Id {
        let body_id = state.allocate_id();
        state.bodies.insert(body_id, stub_body(body_id, Id(1), (0.0, 0.0)));
        let colony_id = state.allocate_id();
        state.colonies.insert(
            colony_id,
            Colony {
                id: colony_id,
                faction_id: Id(1),
                body_id,
                name: "Home".to_string(),
                population_millions,
                installations: HashMap::new(),
                installation_targets: HashMap::new(),
                minerals: HashMap::new(),
                mineral_reserves: HashMap::new(),
                shipyard_queue: vec![],
                construction_queue: vec![],
            },
        );
        colony_id
    }

    #[test]
    fn load_colonists_is_capped_by_the_per_day_rate_and_spans_multiple_substeps() {
        let content = colonizer_content();
        let mut state = base_state_with_ship();
        let ship_id = *state.ships.keys().next().unwrap();
        state.ships.get_mut(&ship_id).unwrap().design_id = "colonizer".to_string();
        let colony_id = colony_with_population(&mut state, 10.0);

        // rate = max(0.01 * 50, 0.001) = 0.5 millions/day
        handle_load_colonists(&mut state, &content, ship_id, colony_id, 2.0, 1.0);
        assert_eq!(state.ships[&ship_id].colonists_millions, 0.5);
        assert_eq!(state.colonies[&colony_id].population_millions, 9.5);

        handle_load_colonists(&mut state, &content, ship_id, colony_id, 1.5, 1.0);
        assert_eq!(state.ships[&ship_id].colonists_millions, 1.0);
        assert_eq!(state.colonies[&colony_id].population_millions, 9.0);
    }

    #[test]
    fn colonize_seeds_population_from_ship_colonists_plus_design_capacity() {
        let content = colonizer_content();
        let mut state = base_state_with_ship();
        let ship_id = *state.ships.keys().next().unwrap();
        {
            let ship = state.ships.get_mut(&ship_id).unwrap();
            ship.design_id = "colonizer".to_string();
            ship.colonists_millions = 3.0;
        }
        let body_id = state.allocate_id();
        state.bodies.insert(body_id, stub_body(body_id, Id(1), (0.0, 0.0)));

        handle_colonize(&mut state, &content, ship_id, body_id);

        let colony = state.colonies.values().next().expect("colony founded");
        assert_eq!(colony.population_millions, 53.0);
        assert!(!state.ships.contains_key(&ship_id));
    }
}
