//! Walks a ship's order queue forward, estimating arrival time and fuel
//! consumption per step without touching the real ship or order queue.
//! Point-to-point legs reuse the same distance/speed/fuel arithmetic as
//! [`crate::orders::tick_ships`]; legs that cross a system use
//! [`crate::jump_routing::plan_route`] exactly as the live order engine does.

use crate::content::GameContent;
use crate::id::Id;
use crate::jump_routing::plan_route;
use crate::orders::Order;
use crate::planners::PlannerStatus;
use crate::state::GameState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlannerOptions {
    pub max_orders: usize,
}

impl Default for OrderPlannerOptions {
    fn default() -> Self {
        OrderPlannerOptions { max_orders: 32 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlanStep {
    pub order_index: usize,
    pub delta_days: f64,
    pub eta_days: f64,
    pub system_id: Id,
    pub position_mkm: (f64, f64),
    pub fuel_before: f64,
    pub fuel_after: f64,
    /// Set when this order has no natural completion (open-ended pursuit,
    /// indefinite orbit/bombardment) and the leg was estimated as a no-op.
    pub indefinite: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlannerResult {
    pub status: PlannerStatus,
    pub steps: Vec<OrderPlanStep>,
}

fn distance_mkm(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn is_indefinite(order: &Order) -> bool {
    matches!(
        order,
        Order::AttackShip { .. }
            | Order::EscortShip { .. }
            | Order::InvadeColony { .. }
    ) || matches!(order, Order::OrbitBody { duration_days, .. } if *duration_days < 0.0)
        || matches!(order, Order::BombardColony { duration_days, .. } if *duration_days < 0.0)
}

/// Target system/position for a spatially-targeted order, mirroring
/// `orders::step::resolve_target`'s lookup table but read-only.
fn target_for(state: &GameState, order: &Order) -> Option<(Id, (f64, f64))> {
    match order {
        Order::MoveToPoint { target_mkm } => Some((Id::INVALID, *target_mkm)),
        Order::MoveToBody { body_id } | Order::OrbitBody { body_id, .. } | Order::ColonizeBody { body_id } => {
            let body = state.bodies.get(body_id)?;
            Some((body.system_id, body.position_mkm))
        }
        Order::TravelViaJump { jump_point_id } => {
            let jp = state.jump_points.get(jump_point_id)?;
            Some((jp.system_id, jp.position_mkm))
        }
        Order::TravelToSystem { system_id, final_pos } => Some((*system_id, *final_pos)),
        Order::SurveyJumpPoint { jump_point_id, .. } => {
            let jp = state.jump_points.get(jump_point_id)?;
            Some((jp.system_id, jp.position_mkm))
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
            Some((body.system_id, body.position_mkm))
        }
        Order::SalvageWreck { wreck_id, .. } => {
            let wreck = state.wrecks.get(wreck_id)?;
            Some((wreck.system_id, wreck.position_mkm))
        }
        Order::InvestigateAnomaly { anomaly_id, .. } => {
            let anomaly = state.anomalies.get(anomaly_id)?;
            Some((anomaly.system_id, anomaly.position_mkm))
        }
        Order::TransferCargoToShip { target_ship_id, .. }
        | Order::TransferFuelToShip { target_ship_id, .. }
        | Order::TransferTroopsToShip { target_ship_id, .. }
        | Order::EscortShip { target_id: target_ship_id, .. } => {
            let target = state.ships.get(target_ship_id)?;
            Some((target.system_id, target.position_mkm))
        }
        Order::AttackShip { target_id, .. } => {
            let target = state.ships.get(target_id)?;
            Some((target.system_id, target.position_mkm))
        }
        Order::WaitDays { .. } => None,
    }
}

/// Projects the queue of `orders` (not necessarily the ship's live queue,
/// allowing "what if I issued this order" previews) forward from the ship's
/// current state.
pub fn plan(state: &GameState, content: &GameContent, ship_id: Id, orders: &[Order], options: &OrderPlannerOptions) -> OrderPlannerResult {
    let Some(ship) = state.ships.get(&ship_id) else {
        return OrderPlannerResult {
            status: PlannerStatus::failed("unknown ship"),
            steps: Vec::new(),
        };
    };
    let Some(design) = content.designs.get(&ship.design_id) else {
        return OrderPlannerResult {
            status: PlannerStatus::failed("unknown ship design"),
            steps: Vec::new(),
        };
    };
    let speed_mkm_per_day = design.speed_km_s * content.config.seconds_per_day / 1e6;

    let mut position = ship.position_mkm;
    let mut system_id = ship.system_id;
    let mut fuel = ship.fuel_tons;
    let mut eta = 0.0;
    let mut steps = Vec::new();
    let mut status = PlannerStatus::ok();

    for (index, order) in orders.iter().enumerate() {
        if index >= options.max_orders {
            status.mark_truncated("max_orders reached");
            break;
        }

        if let Order::WaitDays { days_remaining } = order {
            eta += days_remaining.max(0.0);
            steps.push(OrderPlanStep {
                order_index: index,
                delta_days: days_remaining.max(0.0),
                eta_days: eta,
                system_id,
                position_mkm: position,
                fuel_before: fuel,
                fuel_after: fuel,
                indefinite: false,
            });
            continue;
        }

        if is_indefinite(order) {
            steps.push(OrderPlanStep {
                order_index: index,
                delta_days: 0.0,
                eta_days: eta,
                system_id,
                position_mkm: position,
                fuel_before: fuel,
                fuel_after: fuel,
                indefinite: true,
            });
            continue;
        }

        let Some((target_system, target_pos)) = target_for(state, order) else {
            status = PlannerStatus::stalled("order targets a missing entity");
            break;
        };
        let target_system = if target_system == Id::INVALID { system_id } else { target_system };

        let mut leg_days = 0.0;
        if target_system != system_id {
            match plan_route(state, system_id, position, target_system, target_pos, speed_mkm_per_day, Some(ship.faction_id), true) {
                Some(route) => {
                    leg_days = route.total_eta_days;
                    system_id = target_system;
                    position = target_pos;
                }
                None => {
                    status = PlannerStatus::stalled("no routable jump path");
                    break;
                }
            }
        } else {
            let distance = distance_mkm(position, target_pos);
            leg_days = if speed_mkm_per_day > 0.0 { distance / speed_mkm_per_day } else { f64::INFINITY };
            position = target_pos;
        }

        // route-based legs fold distance into `leg_days`; recover it via speed * days.
        let fuel_needed = leg_days * speed_mkm_per_day * design.fuel_use_per_mkm;

        if fuel_needed > fuel {
            status = PlannerStatus::stalled("insufficient fuel to complete this leg");
            steps.push(OrderPlanStep {
                order_index: index,
                delta_days: leg_days,
                eta_days: eta + leg_days,
                system_id,
                position_mkm: position,
                fuel_before: fuel,
                fuel_after: 0.0,
                indefinite: false,
            });
            break;
        }

        fuel -= fuel_needed;
        eta += leg_days;
        steps.push(OrderPlanStep {
            order_index: index,
            delta_days: leg_days,
            eta_days: eta,
            system_id,
            position_mkm: position,
            fuel_before: fuel + fuel_needed,
            fuel_after: fuel,
            indefinite: false,
        });
    }

    OrderPlannerResult { status, steps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, base_state_with_ship};

    #[test]
    fn single_move_to_point_produces_one_step_without_mutating_ship() {
        let content = base_content();
        let state = base_state_with_ship();
        let ship_id = *state.ships.keys().next().unwrap();
        let before = state.ships[&ship_id].position_mkm;

        let orders = vec![Order::MoveToPoint { target_mkm: (10.0, 0.0) }];
        let result = plan(&state, &content, ship_id, &orders, &OrderPlannerOptions::default());

        assert_eq!(result.steps.len(), 1);
        assert!(result.steps[0].eta_days > 0.0);
        assert_eq!(state.ships[&ship_id].position_mkm, before);
    }

    #[test]
    fn indefinite_orbit_is_flagged_and_consumes_no_eta() {
        let content = base_content();
        let mut state = base_state_with_ship();
        let body_id = state.allocate_id();
        state.bodies.insert(body_id, crate::test_fixtures::stub_body(body_id, Id(1), (5.0, 0.0)));
        let ship_id = *state.ships.keys().next().unwrap();

        let orders = vec![Order::OrbitBody { body_id, duration_days: -1.0 }];
        let result = plan(&state, &content, ship_id, &orders, &OrderPlannerOptions::default());
        assert_eq!(result.steps.len(), 1);
        assert!(result.steps[0].indefinite);
    }
}
