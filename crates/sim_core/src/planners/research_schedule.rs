//! Forecasts when each queued tech would complete, replaying the same
//! day-loop [`crate::research::tick_research`] drives but against a working
//! copy of the faction and without touching `GameState`.

use crate::content::GameContent;
use crate::id::Id;
use crate::planners::PlannerStatus;
use crate::state::{Faction, GameState};
use std::collections::HashSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchScheduleOptions {
    pub max_days: u32,
    pub max_items: usize,
}

impl Default for ResearchScheduleOptions {
    fn default() -> Self {
        ResearchScheduleOptions {
            max_days: 365,
            max_items: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchScheduleItem {
    pub tech_id: String,
    pub start_day: u32,
    pub end_day: u32,
    pub cost_rp: f64,
    pub progress_at_start: f64,
    pub was_active_at_start: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchScheduleResult {
    pub status: PlannerStatus,
    pub items: Vec<ResearchScheduleItem>,
}

fn prereqs_met(known: &HashSet<String>, tech: &crate::content::TechDef) -> bool {
    tech.prereqs.iter().all(|p| known.contains(p))
}

fn base_rp_per_day(state: &GameState, content: &GameContent, faction_id: Id) -> f64 {
    let mut total = 0.0;
    for colony in state.colonies.values() {
        if colony.faction_id != faction_id {
            continue;
        }
        for (installation_id, &count) in &colony.installations {
            if count == 0 {
                continue;
            }
            let Some(def) = content.installations.get(installation_id) else {
                continue;
            };
            if def.research_points_per_day > 0.0 {
                total += def.research_points_per_day * f64::from(count);
            }
        }
    }
    total
}

/// Projects the research queue forward, day by day, up to `max_days` or
/// until the queue is empty. Mirrors `tick_research`'s per-day mechanics but
/// against a cloned [`Faction`]; the real faction and its RP bank are
/// untouched.
pub fn plan(state: &GameState, content: &GameContent, faction_id: Id, options: &ResearchScheduleOptions) -> ResearchScheduleResult {
    let Some(original) = state.factions.get(&faction_id) else {
        return ResearchScheduleResult {
            status: PlannerStatus::failed("unknown faction"),
            items: Vec::new(),
        };
    };

    let rp_per_day = (base_rp_per_day(state, content, faction_id) * original.output_multiplier("research")).max(0.0);
    let mut working: Faction = original.clone();
    let mut items = Vec::new();
    let mut status = PlannerStatus::ok();

    if working.active_research_id.is_none() && working.research_queue.is_empty() {
        return ResearchScheduleResult { status, items };
    }

    for day in 0..options.max_days {
        if items.len() >= options.max_items {
            status.mark_truncated("max_items reached");
            break;
        }
        if working.active_research_id.is_none() && working.research_queue.is_empty() {
            break;
        }

        working.research_queue.retain(|id| !working.known_techs.contains(id) && content.techs.contains_key(id));

        if let Some(id) = &working.active_research_id {
            let still_valid = !working.known_techs.contains(id)
                && content.techs.get(id).is_some_and(|tech| prereqs_met(&working.known_techs, tech));
            if !still_valid {
                if !working.known_techs.contains(id) && content.techs.contains_key(id) {
                    working.research_queue.push(id.clone());
                }
                working.active_research_id = None;
            }
        }

        let was_active_at_start = working.active_research_id.is_some();
        let progress_at_start = working.rp_bank;
        let mut bank = working.rp_bank + rp_per_day;

        if working.active_research_id.is_none() {
            let pos = working
                .research_queue
                .iter()
                .position(|id| content.techs.get(id).is_some_and(|tech| prereqs_met(&working.known_techs, tech)));
            working.active_research_id = pos.map(|p| working.research_queue.remove(p));
        }

        let Some(active_id) = working.active_research_id.clone() else {
            let blocking = working.research_queue.first().cloned();
            let reason = match blocking {
                Some(id) => format!("queue blocked: missing prereqs for {id}"),
                None => "no research queued".to_string(),
            };
            status = PlannerStatus::stalled(reason);
            working.rp_bank = bank;
            break;
        };

        let Some(tech) = content.techs.get(&active_id) else {
            working.active_research_id = None;
            continue;
        };
        let cost = tech.cost_rp.max(0.0);

        if bank + 1e-9 < cost {
            working.rp_bank = bank;
            continue;
        }

        bank -= cost;
        working.known_techs.insert(active_id.clone());
        working.active_research_id = None;
        working.rp_bank = bank;

        items.push(ResearchScheduleItem {
            tech_id: active_id,
            start_day: day,
            end_day: day,
            cost_rp: cost,
            progress_at_start,
            was_active_at_start,
        });
    }

    ResearchScheduleResult { status, items }
}
