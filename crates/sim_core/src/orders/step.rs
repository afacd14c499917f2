use super::intercept::{deterministic_search_offset, lead_intercept_point};
use super::Order;
use crate::content::GameContent;
use crate::events::{emit, EventBuilder, EventCategory, EventKind, EventLevel};
use crate::id::Id;
use crate::jump_routing;
use crate::state::GameState;

fn distance_mkm(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn clock_fields(state: &GameState) -> (i64, u8) {
    (state.date.days_since_epoch(), state.hour_of_day)
}

fn record_event(
    state: &mut GameState,
    level: EventLevel,
    category: EventCategory,
    message: impl Into<String>,
    ship_id: Id,
    kind: Option<EventKind>,
) {
    let (day, hour) = clock_fields(state);
    let ship_faction = state.ships.get(&ship_id).map(|s| s.faction_id);
    let ship_system = state.ships.get(&ship_id).map(|s| s.system_id);
    let event = emit(
        &mut state.next_event_seq,
        message,
        EventBuilder {
            day,
            hour,
            level,
            category,
            faction_id: ship_faction,
            system_id: ship_system,
            ship_id: Some(ship_id),
            colony_id: None,
            kind,
        },
    );
    state.events.push(event);
}

fn drop_order(state: &mut GameState, ship_id: Id, reason: &str) {
    if let Some(orders) = state.ship_orders.get_mut(&ship_id) {
        orders.queue.pop_front();
    }
    record_event(
        state,
        EventLevel::Warn,
        EventCategory::Movement,
        format!("order dropped: {reason}"),
        ship_id,
        Some(EventKind::OrderDropped {
            ship_id,
            reason: reason.to_string(),
        }),
    );
}

/// Runs the order-execution engine for every ship, one sub-step.
pub(crate) fn tick_ships(state: &mut GameState, content: &GameContent, dt_days: f64) {
    for ship_id in state.sorted_ship_ids() {
        step_ship(state, content, ship_id, dt_days);
    }
}

fn step_ship(state: &mut GameState, content: &GameContent, ship_id: Id, dt_days: f64) {
    if let Some(orders) = state.ship_orders.get_mut(&ship_id) {
        orders.refill_from_repeat();
    }
    let Some(order) = state
        .ship_orders
        .get(&ship_id)
        .and_then(|o| o.queue.front().cloned())
    else {
        return;
    };

    if let Order::WaitDays { days_remaining } = order {
        step_wait(state, ship_id, days_remaining, dt_days);
        return;
    }

    let Some((system_id, design_id)) = state.ships.get(&ship_id).map(|s| (s.system_id, s.design_id.clone())) else {
        return;
    };
    let Some(design) = content.designs.get(&design_id) else {
        drop_order(state, ship_id, "unknown ship design");
        return;
    };
    let speed_mkm_per_day = design.speed_km_s * content.config.seconds_per_day / 1e6;

    let Some(target) = resolve_target(state, content, ship_id, system_id, speed_mkm_per_day, &order) else {
        return;
    };

    match target {
        ResolvedTarget::Unreachable => drop_order(state, ship_id, "no routable jump path"),
        ResolvedTarget::RouteInserted => {}
        ResolvedTarget::Point {
            system_id: target_system,
            position,
            arrival_range_mkm,
        } => {
            if target_system != system_id {
                drop_order(state, ship_id, "target system not reached by inserted route");
                return;
            }
            advance_to_point(state, content, ship_id, &design_id, speed_mkm_per_day, position, arrival_range_mkm, dt_days, &order);
        }
    }
}

fn step_wait(state: &mut GameState, ship_id: Id, days_remaining: f64, dt_days: f64) {
    let remaining = days_remaining - dt_days;
    let Some(orders) = state.ship_orders.get_mut(&ship_id) else {
        return;
    };
    if remaining <= 0.0 {
        orders.queue.pop_front();
    } else if let Some(front) = orders.queue.front_mut() {
        *front = Order::WaitDays { days_remaining: remaining };
    }
}

enum ResolvedTarget {
    Point {
        system_id: Id,
        position: (f64, f64),
        arrival_range_mkm: f64,
    },
    RouteInserted,
    Unreachable,
}

/// Computes where the ship should be heading this sub-step for any
/// spatially-targeted order, auto-inserting jump hops when the target lives
/// in a different system.
fn resolve_target(
    state: &mut GameState,
    content: &GameContent,
    ship_id: Id,
    current_system: Id,
    speed_mkm_per_day: f64,
    order: &Order,
) -> Option<ResolvedTarget> {
    let docking_range = content.config.docking_range_mkm;

    let (target_system, target_pos, arrival_range) = match order {
        Order::MoveToPoint { target_mkm } => (current_system, *target_mkm, content.config.arrival_epsilon_mkm),
        Order::MoveToBody { body_id } | Order::OrbitBody { body_id, .. } => {
            let body = state.bodies.get(body_id)?;
            (body.system_id, body.position_mkm, docking_range)
        }
        Order::ColonizeBody { body_id } => {
            let body = state.bodies.get(body_id)?;
            (body.system_id, body.position_mkm, docking_range)
        }
        Order::TravelViaJump { jump_point_id } => {
            let jp = state.jump_points.get(jump_point_id)?;
            (jp.system_id, jp.position_mkm, docking_range)
        }
        Order::TravelToSystem { system_id, final_pos } => (*system_id, *final_pos, content.config.arrival_epsilon_mkm),
        Order::SurveyJumpPoint { jump_point_id, .. } => {
            let jp = state.jump_points.get(jump_point_id)?;
            (jp.system_id, jp.position_mkm, docking_range)
        }
        Order::LoadMineral { colony_id, .. }
        | Order::UnloadMineral { colony_id, .. }
        | Order::LoadTroops { colony_id, .. }
        | Order::UnloadTroops { colony_id, .. }
        | Order::LoadColonists { colony_id, .. }
        | Order::UnloadColonists { colony_id, .. }
        | Order::BombardColony { colony_id, .. }
        | Order::InvadeColony { colony_id }
        | Order::ScrapShip { colony_id } => {
            let colony = state.colonies.get(colony_id)?;
            let body = state.bodies.get(&colony.body_id)?;
            (body.system_id, body.position_mkm, docking_range)
        }
        Order::SalvageWreck { wreck_id, .. } => {
            let wreck = state.wrecks.get(wreck_id)?;
            (wreck.system_id, wreck.position_mkm, docking_range)
        }
        Order::InvestigateAnomaly { anomaly_id, .. } => {
            let anomaly = state.anomalies.get(anomaly_id)?;
            (anomaly.system_id, anomaly.position_mkm, docking_range)
        }
        Order::TransferCargoToShip { target_ship_id, .. }
        | Order::TransferFuelToShip { target_ship_id, .. }
        | Order::TransferTroopsToShip { target_ship_id, .. }
        | Order::EscortShip { target_id: target_ship_id, .. } => {
            let target = state.ships.get(target_ship_id)?;
            (target.system_id, target.position_mkm, docking_range)
        }
        Order::AttackShip { target_id, last_known_pos, .. } => {
            return Some(resolve_attack_target(state, ship_id, current_system, speed_mkm_per_day, *target_id, *last_known_pos, order));
        }
        Order::WaitDays { .. } => unreachable!("handled by step_wait"),
    };

    if target_system == current_system {
        return Some(ResolvedTarget::Point {
            system_id: target_system,
            position: target_pos,
            arrival_range_mkm: arrival_range,
        });
    }

    let ship_pos = state.ships.get(&ship_id)?.position_mkm;
    let faction_id = state.ships.get(&ship_id).map(|s| s.faction_id);
    match jump_routing::plan_route(state, current_system, ship_pos, target_system, target_pos, speed_mkm_per_day, faction_id, true) {
        Some(route) if !route.hops.is_empty() => {
            insert_route_hops(state, ship_id, &route);
            Some(ResolvedTarget::RouteInserted)
        }
        Some(_) => Some(ResolvedTarget::Point {
            system_id: current_system,
            position: target_pos,
            arrival_range_mkm: arrival_range,
        }),
        None => Some(ResolvedTarget::Unreachable),
    }
}

fn insert_route_hops(state: &mut GameState, ship_id: Id, route: &jump_routing::Route) {
    let Some(orders) = state.ship_orders.get_mut(&ship_id) else {
        return;
    };
    for hop in route.hops.iter().rev() {
        orders.queue.push_front(Order::TravelViaJump {
            jump_point_id: hop.jump_point_id,
        });
    }
}

fn resolve_attack_target(
    state: &GameState,
    ship_id: Id,
    current_system: Id,
    _speed_mkm_per_day: f64,
    target_id: Id,
    last_known_pos: Option<(f64, f64)>,
    order: &Order,
) -> ResolvedTarget {
    let ship = match state.ships.get(&ship_id) {
        Some(s) => s,
        None => return ResolvedTarget::Unreachable,
    };
    let contact = state.factions.get(&ship.faction_id).and_then(|f| f.ship_contacts.get(&target_id));

    if let Some(track) = contact {
        if track.sample_count >= 2 {
            let point = lead_intercept_point(ship.position_mkm, _speed_mkm_per_day, track.position_mkm, track.velocity_estimate_mkm_per_day);
            return ResolvedTarget::Point {
                system_id: current_system,
                position: point,
                arrival_range_mkm: 0.0, // combat module governs actual engagement range
            };
        }
        return ResolvedTarget::Point {
            system_id: current_system,
            position: track.position_mkm,
            arrival_range_mkm: 0.0,
        };
    }

    if let Some(last_pos) = last_known_pos {
        if distance_mkm(ship.position_mkm, last_pos) <= content_arrival_epsilon() {
            let Order::AttackShip { search_waypoint_index, .. } = order else {
                unreachable!()
            };
            let offset = deterministic_search_offset(ship_id, *search_waypoint_index, 1.0);
            return ResolvedTarget::Point {
                system_id: current_system,
                position: (last_pos.0 + offset.0, last_pos.1 + offset.1),
                arrival_range_mkm: 0.0,
            };
        }
        return ResolvedTarget::Point {
            system_id: current_system,
            position: last_pos,
            arrival_range_mkm: 0.0,
        };
    }

    ResolvedTarget::Point {
        system_id: current_system,
        position: ship.position_mkm,
        arrival_range_mkm: 0.0,
    }
}

fn content_arrival_epsilon() -> f64 {
    1e-3
}

#[allow(clippy::too_many_arguments)]
fn advance_to_point(
    state: &mut GameState,
    content: &GameContent,
    ship_id: Id,
    design_id: &str,
    speed_mkm_per_day: f64,
    target: (f64, f64),
    arrival_range_mkm: f64,
    dt_days: f64,
    order: &Order,
) {
    let Some(ship) = state.ships.get(&ship_id) else {
        return;
    };
    let remaining = distance_mkm(ship.position_mkm, target);
    let max_travel = speed_mkm_per_day * dt_days * ship.integrity.engines;
    let cover = remaining.min(max_travel);

    let Some(design) = content.designs.get(design_id) else {
        return;
    };
    let fuel_needed = cover * design.fuel_use_per_mkm;

    if ship.fuel_tons < fuel_needed && fuel_needed > 0.0 {
        record_event(
            state,
            EventLevel::Warn,
            EventCategory::Movement,
            "stalled: out of fuel",
            ship_id,
            Some(EventKind::ShipFuelOut { ship_id }),
        );
        return;
    }

    move_ship(state, ship_id, target, remaining, cover, fuel_needed, dt_days);

    if cover >= remaining - arrival_range_mkm.max(1e-9) {
        super::step_arrival::handle_arrival(state, content, ship_id, order.clone(), dt_days);
    }
}

#[allow(clippy::too_many_arguments)]
fn move_ship(
    state: &mut GameState,
    ship_id: Id,
    target: (f64, f64),
    remaining: f64,
    cover: f64,
    fuel_burn: f64,
    dt_days: f64,
) {
    let Some(ship) = state.ships.get_mut(&ship_id) else {
        return;
    };
    if remaining > 1e-12 {
        let t = (cover / remaining).clamp(0.0, 1.0);
        let dx = target.0 - ship.position_mkm.0;
        let dy = target.1 - ship.position_mkm.1;
        let speed = cover / dt_days.max(1e-9);
        ship.velocity_mkm_per_day = (dx / remaining * speed, dy / remaining * speed);
        ship.position_mkm.0 += dx * t;
        ship.position_mkm.1 += dy * t;
    } else {
        ship.velocity_mkm_per_day = (0.0, 0.0);
    }
    ship.fuel_tons = (ship.fuel_tons - fuel_burn).max(0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, base_state_with_ship};

    #[test]
    fn wait_order_counts_down_and_pops_at_zero() {
        let mut state = base_state_with_ship();
        let ship_id = *state.ships.keys().next().unwrap();
        state.ship_orders.insert(
            ship_id,
            crate::orders::ShipOrders {
                queue: std::collections::VecDeque::from(vec![Order::WaitDays { days_remaining: 1.0 }]),
                repeat_template: None,
                repeat_count_remaining: 0,
            },
        );
        step_wait(&mut state, ship_id, 1.0, 0.5);
        assert_eq!(
            state.ship_orders[&ship_id].queue.front(),
            Some(&Order::WaitDays { days_remaining: 0.5 })
        );
        step_wait(&mut state, ship_id, 0.5, 0.5);
        assert!(state.ship_orders[&ship_id].queue.is_empty());
    }

    #[test]
    fn ship_out_of_fuel_stalls_without_popping_order() {
        let content = base_content();
        let mut state = base_state_with_ship();
        let ship_id = *state.ships.keys().next().unwrap();
        state.ships.get_mut(&ship_id).unwrap().fuel_tons = 0.0;
        state.ship_orders.insert(
            ship_id,
            crate::orders::ShipOrders {
                queue: std::collections::VecDeque::from(vec![Order::MoveToPoint { target_mkm: (100.0, 0.0) }]),
                repeat_template: None,
                repeat_count_remaining: 0,
            },
        );
        step_ship(&mut state, &content, ship_id, 1.0);
        assert_eq!(state.ship_orders[&ship_id].queue.len(), 1, "order remains at the front");
    }
}
