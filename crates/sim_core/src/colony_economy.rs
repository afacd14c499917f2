//! Mining, industry, shipyards and construction (§4.6). Day-granular: the
//! scheduler only calls `tick_colonies` once per elapsed day.

use crate::content::GameContent;
use crate::events::{emit, EventBuilder, EventCategory, EventKind, EventLevel};
use crate::id::Id;
use crate::state::{BuildOrder, Colony, GameState, InstallationBuildOrder, Ship, SubsystemIntegrity};
use std::collections::HashMap;

fn clock(state: &GameState) -> (i64, u8) {
    (state.date.days_since_epoch(), state.hour_of_day)
}

fn record(state: &mut GameState, colony_id: Id, message: impl Into<String>, kind: Option<EventKind>) {
    let (day, hour) = clock(state);
    let faction_id = state.colonies.get(&colony_id).map(|c| c.faction_id);
    let event = emit(
        &mut state.next_event_seq,
        message,
        EventBuilder {
            day,
            hour,
            level: EventLevel::Info,
            category: EventCategory::Construction,
            faction_id,
            system_id: None,
            ship_id: None,
            colony_id: Some(colony_id),
            kind,
        },
    );
    state.events.push(event);
}

/// Runs mining, industry, shipyards and construction for every colony, in
/// that order, for one elapsed day.
pub(crate) fn tick_colonies(state: &mut GameState, content: &GameContent) {
    run_mining(state, content);
    for colony_id in state.sorted_colony_ids() {
        run_industry(state, content, colony_id);
    }
    for colony_id in state.sorted_colony_ids() {
        run_shipyard(state, content, colony_id);
        reconcile_construction_targets(state, colony_id);
        run_construction(state, content, colony_id);
    }
}

fn colony_mining_request(colony: &Colony, content: &GameContent) -> f64 {
    colony
        .installations
        .iter()
        .filter(|(id, _)| content.installations.get(*id).map(|def| def.mining).unwrap_or(false))
        .map(|(id, count)| {
            let per_unit: f64 = content.installations[id].production_per_day.values().sum();
            per_unit * f64::from(*count)
        })
        .sum()
}

/// Mines every body once per day: co-located colonies' requests are summed
/// per mineral, `min(deposit, total_request)` is served, then split back
/// across the requesting colonies proportionally to their share of the
/// total request.
fn run_mining(state: &mut GameState, content: &GameContent) {
    let mut colonies_by_body: HashMap<Id, Vec<Id>> = HashMap::new();
    for colony_id in state.sorted_colony_ids() {
        if let Some(colony) = state.colonies.get(&colony_id) {
            colonies_by_body.entry(colony.body_id).or_default().push(colony_id);
        }
    }
    let mut body_ids: Vec<Id> = colonies_by_body.keys().copied().collect();
    body_ids.sort_unstable();

    for body_id in body_ids {
        let requests: Vec<(Id, f64)> = colonies_by_body[&body_id]
            .iter()
            .filter_map(|&colony_id| state.colonies.get(&colony_id).map(|c| (colony_id, colony_mining_request(c, content))))
            .filter(|(_, request)| *request > 0.0)
            .collect();
        let total_request: f64 = requests.iter().map(|(_, request)| *request).sum();
        if total_request <= 0.0 {
            continue;
        }
        let Some(body) = state.bodies.get(&body_id) else {
            continue;
        };
        let minerals: Vec<String> = body.mineral_deposits.keys().cloned().collect();

        for mineral in &minerals {
            let available = body.mineral_deposits.get(mineral).copied().unwrap_or(0.0);
            let is_infinite = !body.mineral_deposits.contains_key(mineral) && content.config.missing_deposit_is_infinite;
            let served_total = if is_infinite { total_request } else { total_request.min(available) };
            if served_total <= 0.0 {
                continue;
            }
            for &(colony_id, request) in &requests {
                let share = served_total * (request / total_request);
                if let Some(colony) = state.colonies.get_mut(&colony_id) {
                    *colony.minerals.entry(mineral.clone()).or_insert(0.0) += share;
                }
            }
            if let Some(body) = state.bodies.get_mut(&body_id) {
                if let Some(deposit) = body.mineral_deposits.get_mut(mineral) {
                    *deposit = (*deposit - served_total).max(0.0);
                }
            }
        }
    }
}

fn run_industry(state: &mut GameState, content: &GameContent, colony_id: Id) {
    let Some(colony) = state.colonies.get(&colony_id) else {
        return;
    };
    let output_multiplier = state.factions.get(&colony.faction_id).map(|f| f.output_multiplier("industry")).unwrap_or(1.0);

    let mut total_production: HashMap<String, f64> = HashMap::new();
    let mut total_consumption: HashMap<String, f64> = HashMap::new();

    for (installation_id, &count) in &colony.installations {
        let Some(def) = content.installations.get(installation_id) else {
            continue;
        };
        if def.mining || def.consumption_per_day.is_empty() {
            continue;
        }
        let required: f64 = def.consumption_per_day.values().map(|v| v * f64::from(count)).sum();
        let supportable_fraction = if required <= 0.0 {
            1.0
        } else {
            let available: f64 = def
                .consumption_per_day
                .keys()
                .map(|mineral| colony.mineral_tons(mineral))
                .fold(f64::MAX, f64::min);
            (available / (required / f64::from(count).max(1.0))).clamp(0.0, 1.0)
        };

        for (mineral, rate) in &def.consumption_per_day {
            *total_consumption.entry(mineral.clone()).or_insert(0.0) += rate * f64::from(count) * supportable_fraction;
        }
        for (mineral, rate) in &def.production_per_day {
            *total_production.entry(mineral.clone()).or_insert(0.0) += rate * f64::from(count) * supportable_fraction * output_multiplier;
        }
    }

    if let Some(colony) = state.colonies.get_mut(&colony_id) {
        for (mineral, amount) in total_consumption {
            let entry = colony.minerals.entry(mineral).or_insert(0.0);
            *entry = (*entry - amount).max(0.0);
        }
        for (mineral, amount) in total_production {
            *colony.minerals.entry(mineral).or_insert(0.0) += amount;
        }
    }
}

fn run_shipyard(state: &mut GameState, content: &GameContent, colony_id: Id) {
    let Some(colony) = state.colonies.get(&colony_id) else {
        return;
    };
    let base_rate: f64 = colony
        .installations
        .iter()
        .filter_map(|(id, count)| content.installations.get(id).map(|def| def.shipyard_build_rate_tons_per_day * f64::from(*count)))
        .sum();
    if base_rate <= 0.0 || colony.shipyard_queue.is_empty() {
        return;
    }
    let build_rate = base_rate * crate::maintenance::blockade_output_multiplier_for_colony(state, content, colony_id);

    let Some(mut order) = state.colonies.get(&colony_id).and_then(|c| c.shipyard_queue.first().cloned()) else {
        return;
    };
    let progress = build_rate.min(order.tons_remaining);
    order.tons_remaining -= progress;

    if order.tons_remaining <= 1e-9 {
        complete_shipyard_order(state, content, colony_id, &order);
        if let Some(colony) = state.colonies.get_mut(&colony_id) {
            if !colony.shipyard_queue.is_empty() {
                colony.shipyard_queue.remove(0);
            }
        }
    } else if let Some(colony) = state.colonies.get_mut(&colony_id) {
        if let Some(front) = colony.shipyard_queue.first_mut() {
            *front = order;
        }
    }
}

fn complete_shipyard_order(state: &mut GameState, content: &GameContent, colony_id: Id, order: &BuildOrder) {
    let Some(colony) = state.colonies.get(&colony_id) else {
        return;
    };
    let faction_id = colony.faction_id;
    let body_id = colony.body_id;
    let system_id = state.bodies.get(&body_id).map(|b| b.system_id).unwrap_or_default();
    let position_mkm = state.bodies.get(&body_id).map(|b| b.position_mkm).unwrap_or_default();

    let mut new_ship_id = None;
    if let Some(refit_ship_id) = order.refit_ship_id {
        if state.ships.contains_key(&refit_ship_id) {
            new_ship_id = Some(refit_ship_id);
        }
    } else if let Some(design_id) = &order.design_id {
        if let Some(design) = content.designs.get(design_id) {
            let ship_id = state.allocate_id();
            state.ships.insert(
                ship_id,
                Ship {
                    id: ship_id,
                    faction_id,
                    system_id,
                    position_mkm,
                    velocity_mkm_per_day: (0.0, 0.0),
                    design_id: design_id.clone(),
                    name: format!("{design_id} {}", ship_id.0),
                    hp: design.max_hp,
                    max_hp: design.max_hp,
                    shields: design.max_shields,
                    max_shields: design.max_shields,
                    integrity: SubsystemIntegrity::default(),
                    fuel_tons: design.fuel_capacity_tons,
                    cargo: HashMap::new(),
                    troops: 0.0,
                    colonists_millions: 0.0,
                    maintenance_condition: 1.0,
                    sensor_mode: crate::state::SensorMode::Normal,
                    combat_doctrine: crate::state::CombatDoctrine::default(),
                    automation: crate::state::AutomationFlags::default(),
                    missile_ammo: design.missile.as_ref().map(|m| m.ammo_capacity).unwrap_or(0),
                    missile_reload_progress_days: 0.0,
                },
            );
            new_ship_id = Some(ship_id);
        }
    }

    record(
        state,
        colony_id,
        "shipyard order complete",
        Some(EventKind::ShipyardComplete {
            colony_id,
            design_id: order.design_id.clone(),
            refit_ship_id: order.refit_ship_id,
            new_ship_id,
        }),
    );
}

/// Queues auto-built installations up to `installation_targets`, and prunes
/// uncommitted auto-queued orders whose target has since been lowered.
/// Committed units (`InstallationBuildOrder::is_committed`) are never pruned.
fn reconcile_construction_targets(state: &mut GameState, colony_id: Id) {
    let Some(colony) = state.colonies.get(&colony_id) else {
        return;
    };
    let targets = colony.installation_targets.clone();

    for (installation_id, &target) in &targets {
        let built = colony.installation_count(installation_id);
        let queued_total: u32 = colony
            .construction_queue
            .iter()
            .filter(|o| &o.installation_id == installation_id)
            .count() as u32;
        let deficit = target.saturating_sub(built + queued_total);
        if deficit > 0 {
            queue_auto_construction(state, colony_id, installation_id, deficit);
        } else if target < built + queued_total {
            prune_uncommitted(state, colony_id, installation_id, built + queued_total - target);
        }
    }
}

fn queue_auto_construction(state: &mut GameState, colony_id: Id, installation_id: &str, count: u32) {
    let Some(colony) = state.colonies.get_mut(&colony_id) else {
        return;
    };
    for _ in 0..count {
        colony.construction_queue.push(InstallationBuildOrder {
            installation_id: installation_id.to_string(),
            minerals_paid: false,
            cp_remaining: 0.0,
            construction_cost_cp: 0.0,
            auto_queued: true,
        });
    }
}

fn prune_uncommitted(state: &mut GameState, colony_id: Id, installation_id: &str, mut to_remove: u32) {
    let Some(colony) = state.colonies.get_mut(&colony_id) else {
        return;
    };
    let mut i = colony.construction_queue.len();
    while to_remove > 0 && i > 0 {
        i -= 1;
        let order = &colony.construction_queue[i];
        if order.installation_id == installation_id && order.auto_queued && !order.is_committed() {
            colony.construction_queue.remove(i);
            to_remove -= 1;
        }
    }
}

fn run_construction(state: &mut GameState, content: &GameContent, colony_id: Id) {
    let Some(colony) = state.colonies.get(&colony_id) else {
        return;
    };
    let Some(mut order) = colony.construction_queue.first().cloned() else {
        return;
    };
    let Some(def) = content.installations.get(&order.installation_id) else {
        return;
    };

    if !order.minerals_paid {
        let can_afford = def.build_costs.iter().all(|(mineral, tons)| colony.mineral_tons(mineral) >= *tons);
        if !can_afford {
            return;
        }
        if let Some(colony) = state.colonies.get_mut(&colony_id) {
            for (mineral, tons) in &def.build_costs {
                *colony.minerals.entry(mineral.clone()).or_insert(0.0) -= tons;
            }
        }
        order.minerals_paid = true;
        order.construction_cost_cp = def.construction_cost_cp;
        order.cp_remaining = def.construction_cost_cp;
    }

    let progress = content.config.construction_points_per_day_per_installation.min(order.cp_remaining);
    order.cp_remaining -= progress;

    if order.cp_remaining <= 1e-9 {
        if let Some(colony) = state.colonies.get_mut(&colony_id) {
            *colony.installations.entry(order.installation_id.clone()).or_insert(0) += 1;
            if !colony.construction_queue.is_empty() {
                colony.construction_queue.remove(0);
            }
        }
        record(
            state,
            colony_id,
            "construction complete",
            Some(EventKind::ConstructionComplete {
                colony_id,
                installation_id: order.installation_id.clone(),
                auto_queued: order.auto_queued,
            }),
        );
    } else if let Some(colony) = state.colonies.get_mut(&colony_id) {
        if let Some(front) = colony.construction_queue.first_mut() {
            *front = order;
        }
    }
}
