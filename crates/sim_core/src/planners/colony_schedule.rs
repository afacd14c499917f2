//! Forecasts shipyard and construction completions for a single colony,
//! replaying the same per-day order as [`crate::colony_economy::tick_colonies`]
//! (mining, industry, shipyard, auto-target reconciliation, construction)
//! against a working copy.

use crate::content::GameContent;
use crate::id::Id;
use crate::planners::PlannerStatus;
use crate::state::{Colony, GameState, InstallationBuildOrder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonyScheduleOptions {
    pub max_days: u32,
    pub max_items: usize,
}

impl Default for ColonyScheduleOptions {
    fn default() -> Self {
        ColonyScheduleOptions {
            max_days: 365,
            max_items: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColonyScheduleKind {
    ShipyardComplete { design_id: Option<String>, refit_ship_id: Option<Id> },
    ConstructionComplete { installation_id: String, auto_queued: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonyScheduleItem {
    pub day: u32,
    pub kind: ColonyScheduleKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonyScheduleResult {
    pub status: PlannerStatus,
    pub items: Vec<ColonyScheduleItem>,
}

fn mining_rate(colony: &Colony, content: &GameContent) -> f64 {
    colony
        .installations
        .iter()
        .filter(|(id, _)| content.installations.get(*id).map(|def| def.mining).unwrap_or(false))
        .map(|(id, count)| content.installations[id].production_per_day.values().sum::<f64>() * f64::from(*count))
        .sum()
}

fn run_mining_copy(colony: &mut Colony, deposits: &mut HashMap<String, f64>, content: &GameContent) {
    let rate = mining_rate(colony, content);
    if rate <= 0.0 {
        return;
    }
    let minerals: Vec<String> = deposits.keys().cloned().collect();
    for mineral in minerals {
        let available = deposits.get(&mineral).copied().unwrap_or(0.0);
        let is_infinite = !deposits.contains_key(&mineral) && content.config.missing_deposit_is_infinite;
        let taken = if is_infinite { rate } else { rate.min(available) };
        if let Some(d) = deposits.get_mut(&mineral) {
            *d = (*d - taken).max(0.0);
        }
        *colony.minerals.entry(mineral).or_insert(0.0) += taken;
    }
}

fn run_industry_copy(colony: &mut Colony, content: &GameContent, output_multiplier: f64) {
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

    for (mineral, amount) in total_consumption {
        let entry = colony.minerals.entry(mineral).or_insert(0.0);
        *entry = (*entry - amount).max(0.0);
    }
    for (mineral, amount) in total_production {
        *colony.minerals.entry(mineral).or_insert(0.0) += amount;
    }
}

/// Projects a single colony's mining/industry/shipyard/construction forward
/// up to `max_days`, emitting a forecast item for each completion.
pub fn plan(state: &GameState, content: &GameContent, colony_id: Id, options: &ColonyScheduleOptions) -> ColonyScheduleResult {
    let Some(original) = state.colonies.get(&colony_id) else {
        return ColonyScheduleResult {
            status: PlannerStatus::failed("unknown colony"),
            items: Vec::new(),
        };
    };
    let Some(body) = state.bodies.get(&original.body_id) else {
        return ColonyScheduleResult {
            status: PlannerStatus::failed("colony has no body"),
            items: Vec::new(),
        };
    };
    let output_multiplier = state.factions.get(&original.faction_id).map(|f| f.output_multiplier("industry")).unwrap_or(1.0);
    let blockade_mult = crate::maintenance::blockade_output_multiplier_for_colony(state, content, colony_id);

    let mut colony = original.clone();
    let mut deposits = body.mineral_deposits.clone();
    let mut items = Vec::new();
    let mut status = PlannerStatus::ok();

    if colony.shipyard_queue.is_empty() && colony.construction_queue.is_empty() && colony.installation_targets.is_empty() {
        return ColonyScheduleResult { status, items };
    }

    for day in 0..options.max_days {
        if items.len() >= options.max_items {
            status.mark_truncated("max_items reached");
            break;
        }
        if colony.shipyard_queue.is_empty() && colony.construction_queue.is_empty() {
            reconcile(&mut colony);
            if colony.construction_queue.is_empty() {
                break;
            }
        }

        run_mining_copy(&mut colony, &mut deposits, content);
        run_industry_copy(&mut colony, content, output_multiplier);
        step_shipyard(&mut colony, content, blockade_mult, day, &mut items);
        reconcile(&mut colony);
        step_construction(&mut colony, content, day, &mut items);
    }

    ColonyScheduleResult { status, items }
}

fn reconcile(colony: &mut Colony) {
    let targets = colony.installation_targets.clone();
    for (installation_id, &target) in &targets {
        let built = colony.installation_count(installation_id);
        let queued_total: u32 = colony.construction_queue.iter().filter(|o| &o.installation_id == installation_id).count() as u32;
        let deficit = target.saturating_sub(built + queued_total);
        if deficit > 0 {
            for _ in 0..deficit {
                colony.construction_queue.push(InstallationBuildOrder {
                    installation_id: installation_id.clone(),
                    minerals_paid: false,
                    cp_remaining: 0.0,
                    construction_cost_cp: 0.0,
                    auto_queued: true,
                });
            }
        }
    }
}

fn step_shipyard(colony: &mut Colony, content: &GameContent, blockade_mult: f64, day: u32, items: &mut Vec<ColonyScheduleItem>) {
    let base_rate: f64 = colony
        .installations
        .iter()
        .filter_map(|(id, count)| content.installations.get(id).map(|def| def.shipyard_build_rate_tons_per_day * f64::from(*count)))
        .sum();
    if base_rate <= 0.0 || colony.shipyard_queue.is_empty() {
        return;
    }
    let build_rate = base_rate * blockade_mult;
    let Some(order) = colony.shipyard_queue.first_mut() else {
        return;
    };
    order.tons_remaining -= build_rate.min(order.tons_remaining);
    if order.tons_remaining <= 1e-9 {
        let completed = colony.shipyard_queue.remove(0);
        items.push(ColonyScheduleItem {
            day,
            kind: ColonyScheduleKind::ShipyardComplete {
                design_id: completed.design_id,
                refit_ship_id: completed.refit_ship_id,
            },
        });
    }
}

fn step_construction(colony: &mut Colony, content: &GameContent, day: u32, items: &mut Vec<ColonyScheduleItem>) {
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
        for (mineral, tons) in &def.build_costs {
            *colony.minerals.entry(mineral.clone()).or_insert(0.0) -= tons;
        }
        order.minerals_paid = true;
        order.construction_cost_cp = def.construction_cost_cp;
        order.cp_remaining = def.construction_cost_cp;
    }

    let progress = content.config.construction_points_per_day_per_installation.min(order.cp_remaining);
    order.cp_remaining -= progress;

    if order.cp_remaining <= 1e-9 {
        *colony.installations.entry(order.installation_id.clone()).or_insert(0) += 1;
        colony.construction_queue.remove(0);
        items.push(ColonyScheduleItem {
            day,
            kind: ColonyScheduleKind::ConstructionComplete {
                installation_id: order.installation_id,
                auto_queued: order.auto_queued,
            },
        });
    } else if let Some(front) = colony.construction_queue.first_mut() {
        *front = order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::InstallationDef;
    use crate::state::BuildOrder;
    use crate::test_fixtures::{base_content, stub_body};

    fn colony_with_shipyard_order() -> (GameState, GameContent, Id) {
        let mut content = base_content();
        content.installations.insert(
            "yard".to_string(),
            InstallationDef {
                shipyard_build_rate_tons_per_day: 50.0,
                ..Default::default()
            },
        );
        let mut state = GameState::new(1);
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
                population_millions: 1.0,
                installations: HashMap::from([("yard".to_string(), 1)]),
                installation_targets: HashMap::new(),
                minerals: HashMap::new(),
                mineral_reserves: HashMap::new(),
                shipyard_queue: vec![BuildOrder {
                    design_id: Some("scout".to_string()),
                    refit_ship_id: None,
                    tons_total: 100.0,
                    tons_remaining: 100.0,
                }],
                construction_queue: vec![],
            },
        );
        (state, content, colony_id)
    }

    #[test]
    fn forecasts_shipyard_completion_day_without_mutating_real_colony() {
        let (state, content, colony_id) = colony_with_shipyard_order();
        let result = plan(&state, &content, colony_id, &ColonyScheduleOptions::default());
        assert_eq!(result.items.len(), 1);
        assert!(matches!(result.items[0].kind, ColonyScheduleKind::ShipyardComplete { .. }));
        assert_eq!(result.items[0].day, 1);
        assert_eq!(state.colonies[&colony_id].shipyard_queue[0].tons_remaining, 100.0);
    }
}
