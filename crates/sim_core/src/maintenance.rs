//! Ship maintenance decay/recovery, shipyard repair, and blockade throughput
//! multipliers (§4.8). Day-granular, called once per elapsed day.

use crate::content::GameContent;
use crate::events::{emit, EventBuilder, EventCategory, EventKind, EventLevel};
use crate::id::Id;
use crate::rng::{rng_for, save_rng_pos};
use crate::state::{DiplomacyStatus, GameState, Subsystem};
use rand::Rng;

fn clock(state: &GameState) -> (i64, u8) {
    (state.date.days_since_epoch(), state.hour_of_day)
}

fn record(state: &mut GameState, ship_id: Id, message: impl Into<String>, kind: Option<EventKind>) {
    let (day, hour) = clock(state);
    let faction_id = state.ships.get(&ship_id).map(|s| s.faction_id);
    let event = emit(
        &mut state.next_event_seq,
        message,
        EventBuilder {
            day,
            hour,
            level: EventLevel::Info,
            category: EventCategory::Maintenance,
            faction_id,
            system_id: None,
            ship_id: Some(ship_id),
            colony_id: None,
            kind,
        },
    );
    state.events.push(event);
}

/// The colony (owned by the ship's own faction) the ship is currently docked
/// at, if any: same system, within `docking_range_mkm` of the colony's body.
fn docked_colony(state: &GameState, content: &GameContent, ship_id: Id) -> Option<Id> {
    let ship = state.ships.get(&ship_id)?;
    for colony_id in state.sorted_colony_ids() {
        let colony = &state.colonies[&colony_id];
        if colony.faction_id != ship.faction_id {
            continue;
        }
        let Some(body) = state.bodies.get(&colony.body_id) else {
            continue;
        };
        if body.system_id != ship.system_id {
            continue;
        }
        let dx = body.position_mkm.0 - ship.position_mkm.0;
        let dy = body.position_mkm.1 - ship.position_mkm.1;
        if (dx * dx + dy * dy).sqrt() <= content.config.docking_range_mkm {
            return Some(colony_id);
        }
    }
    None
}

fn shipyard_count(state: &GameState, content: &GameContent, colony_id: Id) -> u32 {
    let Some(colony) = state.colonies.get(&colony_id) else {
        return 0;
    };
    colony
        .installations
        .iter()
        .filter(|(id, _)| content.installations.get(*id).is_some_and(|def| def.shipyard_build_rate_tons_per_day > 0.0))
        .map(|(_, &count)| count)
        .sum()
}

/// Output multiplier applied to shipyard build rate and repair throughput
/// when hostile ships are present within blockade range of the colony.
pub fn blockade_output_multiplier_for_colony(state: &GameState, content: &GameContent, colony_id: Id) -> f64 {
    if !content.config.enable_blockades {
        return 1.0;
    }
    let Some(colony) = state.colonies.get(&colony_id) else {
        return 1.0;
    };
    let Some(body) = state.bodies.get(&colony.body_id) else {
        return 1.0;
    };
    let is_hostile_to_owner = |other_faction: Id| -> bool {
        state
            .factions
            .get(&colony.faction_id)
            .map(|f| f.diplomacy_status(other_faction) == DiplomacyStatus::Hostile)
            .unwrap_or(false)
    };

    let hostile_count = state
        .ships
        .values()
        .filter(|ship| ship.system_id == body.system_id && is_hostile_to_owner(ship.faction_id))
        .filter(|ship| {
            let dx = ship.position_mkm.0 - body.position_mkm.0;
            let dy = ship.position_mkm.1 - body.position_mkm.1;
            (dx * dx + dy * dy).sqrt() <= content.config.blockade_range_mkm
        })
        .count() as u32;

    if hostile_count > content.config.blockade_hostile_ship_threshold {
        content.config.blockade_output_multiplier
    } else {
        1.0
    }
}

fn mineral_stock(state: &GameState, colony_id: Id, mineral: &str) -> f64 {
    state
        .colonies
        .get(&colony_id)
        .and_then(|c| c.minerals.get(mineral))
        .copied()
        .unwrap_or(0.0)
}

fn spend_mineral(state: &mut GameState, colony_id: Id, mineral: &str, amount: f64) {
    if amount <= 0.0 {
        return;
    }
    if let Some(colony) = state.colonies.get_mut(&colony_id) {
        let entry = colony.minerals.entry(mineral.to_string()).or_insert(0.0);
        *entry = (*entry - amount).max(0.0);
    }
}

fn recover_condition(state: &mut GameState, content: &GameContent, ship_id: Id, colony_id: Id) {
    let cfg = &content.config;
    let resource = cfg.ship_maintenance_resource_id.clone();
    let Some(ship) = state.ships.get(&ship_id) else {
        return;
    };
    if ship.maintenance_condition >= 1.0 {
        return;
    }
    let Some(design) = content.designs.get(&ship.design_id) else {
        return;
    };
    let needed = cfg.ship_maintenance_tons_per_day_per_mass_ton * design.mass_tons;
    if needed <= 0.0 {
        if let Some(ship) = state.ships.get_mut(&ship_id) {
            ship.maintenance_condition = (ship.maintenance_condition + cfg.ship_maintenance_recovery_per_day).min(1.0);
        }
        return;
    }

    let from_cargo = ship.cargo.get(&resource).copied().unwrap_or(0.0).min(needed);
    let from_colony = mineral_stock(state, colony_id, &resource).min(needed - from_cargo);
    let covered_fraction = ((from_cargo + from_colony) / needed).clamp(0.0, 1.0);
    if covered_fraction <= 0.0 {
        return;
    }

    if let Some(ship) = state.ships.get_mut(&ship_id) {
        if let Some(aboard) = ship.cargo.get_mut(&resource) {
            *aboard = (*aboard - from_cargo).max(0.0);
        }
        ship.maintenance_condition = (ship.maintenance_condition + cfg.ship_maintenance_recovery_per_day * covered_fraction).min(1.0);
    }
    spend_mineral(state, colony_id, &resource, from_colony);
}

fn repair_ship(state: &mut GameState, content: &GameContent, ship_id: Id, colony_id: Id) {
    let cfg = &content.config;
    let Some(ship) = state.ships.get(&ship_id) else {
        return;
    };
    let integrity_deficit = (1.0 - ship.integrity.engines).max(0.0)
        + (1.0 - ship.integrity.sensors).max(0.0)
        + (1.0 - ship.integrity.weapons).max(0.0)
        + (1.0 - ship.integrity.shields).max(0.0);
    if ship.hp >= ship.max_hp && integrity_deficit <= 1e-9 {
        return;
    }

    let shipyards = shipyard_count(state, content, colony_id);
    if shipyards == 0 {
        return;
    }
    let blockade_mult = blockade_output_multiplier_for_colony(state, content, colony_id);
    let desired_hp = cfg.repair_hp_per_day_per_shipyard * f64::from(shipyards) * blockade_mult;
    if desired_hp <= 0.0 {
        return;
    }

    let duranium_cost = desired_hp * cfg.repair_duranium_per_hp;
    let neutronium_cost = desired_hp * cfg.repair_neutronium_per_hp;
    let duranium_fraction = if duranium_cost > 0.0 {
        (mineral_stock(state, colony_id, "Duranium") / duranium_cost).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let neutronium_fraction = if neutronium_cost > 0.0 {
        (mineral_stock(state, colony_id, "Neutronium") / neutronium_cost).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let mineral_mult = duranium_fraction.min(neutronium_fraction);
    let available_hp = desired_hp * mineral_mult;
    if available_hp <= 0.0 {
        return;
    }

    spend_mineral(state, colony_id, "Duranium", available_hp * cfg.repair_duranium_per_hp);
    spend_mineral(state, colony_id, "Neutronium", available_hp * cfg.repair_neutronium_per_hp);

    let Some(ship) = state.ships.get_mut(&ship_id) else {
        return;
    };
    let mut remaining = available_hp;
    let hp_gap = ship.max_hp - ship.hp;
    let hp_spend = remaining.min(hp_gap.max(0.0));
    ship.hp += hp_spend;
    remaining -= hp_spend;

    let equiv_per_integrity = cfg.ship_subsystem_repair_hp_equiv_per_integrity * ship.max_hp;
    if equiv_per_integrity > 0.0 {
        for integrity in [
            &mut ship.integrity.engines,
            &mut ship.integrity.sensors,
            &mut ship.integrity.weapons,
            &mut ship.integrity.shields,
        ] {
            if remaining <= 0.0 {
                break;
            }
            let gap = (1.0 - *integrity).max(0.0);
            if gap <= 0.0 {
                continue;
            }
            let affordable = (remaining / equiv_per_integrity).min(gap);
            *integrity += affordable;
            remaining -= affordable * equiv_per_integrity;
        }
    }
}

fn roll_breakdown(state: &mut GameState, content: &GameContent, ship_id: Id, rng: &mut impl Rng) {
    let cfg = &content.config;
    let Some(ship) = state.ships.get(&ship_id) else {
        return;
    };
    let start = cfg.ship_maintenance_breakdown_start_fraction;
    if start <= 0.0 || ship.maintenance_condition >= start {
        return;
    }
    let frac = ((start - ship.maintenance_condition) / start).max(0.0);
    let rate = cfg.ship_maintenance_breakdown_rate_per_day_at_zero * frac.powf(cfg.ship_maintenance_breakdown_exponent);
    let probability = 1.0 - (-rate).exp();
    if rng.gen::<f64>() >= probability {
        return;
    }

    let subsystems = [Subsystem::Engines, Subsystem::Sensors, Subsystem::Weapons, Subsystem::Shields];
    let target = subsystems[rng.gen_range(0..subsystems.len())];
    let Some(ship) = state.ships.get_mut(&ship_id) else {
        return;
    };
    let (field, name) = match target {
        Subsystem::Engines => (&mut ship.integrity.engines, "engines"),
        Subsystem::Sensors => (&mut ship.integrity.sensors, "sensors"),
        Subsystem::Weapons => (&mut ship.integrity.weapons, "weapons"),
        Subsystem::Shields => (&mut ship.integrity.shields, "shields"),
    };
    *field = (*field - 0.25).max(0.0);

    record(
        state,
        ship_id,
        format!("{name} subsystem breaks down"),
        Some(EventKind::SubsystemBreakdown {
            ship_id,
            subsystem: name.to_string(),
        }),
    );
}

/// Advances maintenance condition, shipyard repair and breakdown rolls for
/// every ship by one day.
pub(crate) fn tick_maintenance(state: &mut GameState, content: &GameContent) {
    if !content.config.enable_ship_maintenance {
        return;
    }
    let mut rng = rng_for(state);
    for ship_id in state.sorted_ship_ids() {
        let colony_id = docked_colony(state, content, ship_id);
        let has_shipyard = colony_id.is_some_and(|cid| shipyard_count(state, content, cid) > 0);

        if !has_shipyard {
            if let Some(ship) = state.ships.get_mut(&ship_id) {
                ship.maintenance_condition = (ship.maintenance_condition - content.config.ship_maintenance_decay_per_day).max(0.0);
            }
        }

        if let Some(colony_id) = colony_id {
            recover_condition(state, content, ship_id, colony_id);
            if has_shipyard {
                repair_ship(state, content, ship_id, colony_id);
            }
        }

        roll_breakdown(state, content, ship_id, &mut rng);
    }
    save_rng_pos(state, &rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Colony, DiplomacyStatus, Faction};
    use crate::test_fixtures::{base_content, base_state_with_ship, stub_body};
    use std::collections::HashMap;

    fn colony_at(body_id: Id, colony_id: Id) -> Colony {
        Colony {
            id: colony_id,
            faction_id: Id(1),
            body_id,
            name: "Home".to_string(),
            population_millions: 1.0,
            installations: HashMap::new(),
            installation_targets: HashMap::new(),
            minerals: HashMap::new(),
            mineral_reserves: HashMap::new(),
            shipyard_queue: vec![],
            construction_queue: vec![],
        }
    }

    #[test]
    fn undocked_ship_loses_condition_each_day() {
        let content = base_content();
        let mut state = base_state_with_ship();
        tick_maintenance(&mut state, &content);
        let ship = state.ships.values().next().unwrap();
        assert!(ship.maintenance_condition < 1.0);
    }

    #[test]
    fn blockade_multiplier_is_one_with_no_hostiles() {
        let content = base_content();
        let mut state = base_state_with_ship();
        let body_id = state.allocate_id();
        state.bodies.insert(body_id, stub_body(body_id, Id(1), (0.0, 0.0)));
        let colony_id = state.allocate_id();
        state.colonies.insert(colony_id, colony_at(body_id, colony_id));

        assert_eq!(blockade_output_multiplier_for_colony(&state, &content, colony_id), 1.0);
    }

    #[test]
    fn blockade_multiplier_drops_when_hostiles_exceed_threshold() {
        let mut content = base_content();
        content.config.blockade_hostile_ship_threshold = 0;
        let mut state = base_state_with_ship();
        let body_id = state.allocate_id();
        state.bodies.insert(body_id, stub_body(body_id, Id(1), (0.0, 0.0)));
        let colony_id = state.allocate_id();
        state.colonies.insert(colony_id, colony_at(body_id, colony_id));

        let mut owner = Faction {
            id: Id(1),
            ..Faction::default()
        };
        owner.diplomacy.insert(Id(2), DiplomacyStatus::Hostile);
        state.factions.insert(Id(1), owner);

        let hostile_ship = state.ships.values().next().unwrap().clone();
        let mut raider = hostile_ship;
        raider.faction_id = Id(2);
        raider.id = state.allocate_id();
        state.ships.insert(raider.id, raider);

        assert_eq!(
            blockade_output_multiplier_for_colony(&state, &content, colony_id),
            content.config.blockade_output_multiplier
        );
    }
}
