//! Research queue advancement (one day at a time). Grounded on the day-loop
//! in the original research scheduler: RP income uses multipliers from techs
//! known at the *start* of the day, an active project can complete and be
//! replaced more than once within the same day, and a queue with no
//! prereq-satisfied entry simply stalls rather than erroring.

use crate::content::{GameContent, TechEffect};
use crate::events::{emit, EventBuilder, EventCategory, EventKind, EventLevel};
use crate::id::Id;
use crate::state::GameState;
use std::collections::HashSet;

fn clock(state: &GameState) -> (i64, u8) {
    (state.date.days_since_epoch(), state.hour_of_day)
}

fn record(state: &mut GameState, faction_id: Id, message: impl Into<String>, kind: Option<EventKind>) {
    let (day, hour) = clock(state);
    let envelope = emit(
        &mut state.next_event_seq,
        message,
        EventBuilder {
            day,
            hour,
            level: EventLevel::Info,
            category: EventCategory::Research,
            faction_id: Some(faction_id),
            system_id: None,
            ship_id: None,
            colony_id: None,
            kind,
        },
    );
    state.events.push(envelope);
}

fn prereqs_met(known: &HashSet<String>, tech: &crate::content::TechDef) -> bool {
    tech.prereqs.iter().all(|p| known.contains(p))
}

/// Base RP/day from a faction's colony installations, ignoring multipliers.
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

/// Removes from `queue` anything already known or no longer present in content.
fn clean_queue(queue: &mut Vec<String>, content: &GameContent, known: &HashSet<String>) {
    queue.retain(|id| !known.contains(id) && content.techs.contains_key(id));
}

/// Pops the first queue entry whose prereqs are satisfied, if any.
fn select_next_available(queue: &mut Vec<String>, content: &GameContent, known: &HashSet<String>) -> Option<String> {
    let pos = queue
        .iter()
        .position(|id| content.techs.get(id).is_some_and(|tech| prereqs_met(known, tech)))?;
    Some(queue.remove(pos))
}

fn apply_tech_effects(state: &mut GameState, faction_id: Id, tech_id: &str, content: &GameContent) {
    let Some(tech) = content.techs.get(tech_id) else {
        return;
    };
    let Some(faction) = state.factions.get_mut(&faction_id) else {
        return;
    };
    for effect in &tech.effects {
        if let TechEffect::FactionOutputBonus { key, amount } = effect {
            *faction.research_output_bonuses.entry(key.clone()).or_insert(0.0) += amount;
        }
    }
}

/// Advances research for every faction by one day: generates RP, promotes
/// the queue, and completes as many techs as the day's bank allows.
pub(crate) fn tick_research(state: &mut GameState, content: &GameContent) {
    for faction_id in state.sorted_faction_ids() {
        tick_faction_research(state, content, faction_id);
    }
}

fn tick_faction_research(state: &mut GameState, content: &GameContent, faction_id: Id) {
    let base_rp = base_rp_per_day(state, content, faction_id);

    let Some(faction) = state.factions.get(&faction_id) else {
        return;
    };
    let rp_gain = (base_rp * faction.output_multiplier("research")).max(0.0);

    let mut known = faction.known_techs.clone();
    let mut queue = faction.research_queue.clone();
    let mut active_id = faction.active_research_id.clone();
    let mut bank = faction.rp_bank + rp_gain;

    clean_queue(&mut queue, content, &known);

    if let Some(id) = &active_id {
        let still_valid = !known.contains(id)
            && content.techs.get(id).is_some_and(|tech| prereqs_met(&known, tech));
        if !still_valid {
            if !known.contains(id) && content.techs.contains_key(id) {
                queue.push(id.clone());
            }
            active_id = None;
        }
    }

    let mut completed: Vec<String> = Vec::new();

    loop {
        if active_id.is_none() {
            active_id = select_next_available(&mut queue, content, &known);
        }
        let Some(id) = active_id.clone() else {
            break;
        };
        let Some(tech) = content.techs.get(&id) else {
            active_id = None;
            continue;
        };
        let cost = tech.cost_rp.max(0.0);
        if bank + 1e-9 < cost {
            break;
        }
        bank -= cost;
        known.insert(id.clone());
        completed.push(id);
        active_id = None;
    }

    clean_queue(&mut queue, content, &known);

    if let Some(faction) = state.factions.get_mut(&faction_id) {
        faction.rp_bank = bank;
        faction.research_queue = queue;
        faction.active_research_id = active_id;
        faction.known_techs = known;
    }

    for tech_id in completed {
        apply_tech_effects(state, faction_id, &tech_id, content);
        record(state, faction_id, format!("researched {tech_id}"), Some(EventKind::TechUnlocked { tech_id }));
    }
}
