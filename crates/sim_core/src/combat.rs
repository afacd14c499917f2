//! Beam weapons, missiles, point defense, boarding and ground invasions (§4.5).
//! Physical fidelity is explicitly out of scope: engagements resolve as
//! instantaneous damage exchanges each sub-step rather than simulated
//! projectile flight.

use crate::config::SimConfig;
use crate::content::GameContent;
use crate::events::{emit, EventBuilder, EventCategory, EventKind, EventLevel};
use crate::id::Id;
use crate::orders::Order;
use crate::rng::rng_for;
use crate::state::{DiplomacyStatus, GameState, GroundBattle, Wreck};
use rand::Rng;
use std::collections::HashMap;

fn distance_mkm(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn clock(state: &GameState) -> (i64, u8) {
    (state.date.days_since_epoch(), state.hour_of_day)
}

fn record(state: &mut GameState, level: EventLevel, category: EventCategory, message: impl Into<String>, kind: Option<EventKind>) {
    let (day, hour) = clock(state);
    let event = emit(
        &mut state.next_event_seq,
        message,
        EventBuilder {
            day,
            hour,
            level,
            category,
            faction_id: None,
            system_id: None,
            ship_id: None,
            colony_id: None,
            kind,
        },
    );
    state.events.push(event);
}

fn are_hostile(state: &GameState, a: Id, b: Id) -> bool {
    a != b
        && state
            .factions
            .get(&a)
            .map(|f| f.diplomacy_status(b) == DiplomacyStatus::Hostile)
            .unwrap_or(false)
}

fn destroy_ship(state: &mut GameState, ship_id: Id) {
    let Some(ship) = state.ships.remove(&ship_id) else {
        return;
    };
    state.ship_orders.remove(&ship_id);
    let wreck_id = state.allocate_id();
    let mut minerals = HashMap::new();
    for (mineral, tons) in ship.cargo {
        minerals.insert(mineral, tons);
    }
    state.wrecks.insert(
        wreck_id,
        Wreck {
            id: wreck_id,
            system_id: ship.system_id,
            position_mkm: ship.position_mkm,
            minerals,
            source_design_id: Some(ship.design_id),
            source_faction_id: Some(ship.faction_id),
        },
    );
    record(
        state,
        EventLevel::Info,
        EventCategory::Combat,
        format!("ship {} destroyed", ship_id.0),
        Some(EventKind::ShipDestroyed { ship_id }),
    );
}

fn apply_damage(state: &mut GameState, target_id: Id, damage: f64) {
    let destroyed = {
        let Some(ship) = state.ships.get_mut(&target_id) else {
            return;
        };
        let shield_absorbed = damage.min(ship.shields);
        ship.shields -= shield_absorbed;
        let remaining = damage - shield_absorbed;
        ship.hp -= remaining;
        ship.hp <= 0.0
    };
    if destroyed {
        destroy_ship(state, target_id);
    }
}

/// Beam-weapon exchanges between hostile ships sharing a system and within
/// weapon range. `tick_missiles` handles ranged missile salvos separately.
pub(crate) fn tick_combat(state: &mut GameState, content: &GameContent) {
    if !content.config.enable_combat {
        return;
    }
    let mut systems: HashMap<Id, Vec<Id>> = HashMap::new();
    for ship in state.ships.values() {
        systems.entry(ship.system_id).or_default().push(ship.id);
    }

    for (_system_id, mut ship_ids) in systems {
        ship_ids.sort_unstable();
        for i in 0..ship_ids.len() {
            for j in 0..ship_ids.len() {
                if i == j {
                    continue;
                }
                resolve_beam_shot(state, content, ship_ids[i], ship_ids[j]);
            }
        }
    }

    resolve_boarding(state, &content.config);
    resolve_ground_battles(state, content);
}

fn resolve_beam_shot(state: &mut GameState, content: &GameContent, shooter_id: Id, target_id: Id) {
    let Some(shooter) = state.ships.get(&shooter_id) else {
        return;
    };
    let Some(target) = state.ships.get(&target_id) else {
        return;
    };
    if !are_hostile(state, shooter.faction_id, target.faction_id) {
        return;
    }
    let Some(design) = content.designs.get(&shooter.design_id) else {
        return;
    };
    if design.weapons.is_empty() {
        return;
    }
    let range = distance_mkm(shooter.position_mkm, target.position_mkm);
    let weapons_integrity = shooter.integrity.weapons;
    let total_damage: f64 = design
        .weapons
        .iter()
        .filter(|w| range <= w.weapon_range_mkm)
        .map(|w| w.weapon_damage * weapons_integrity)
        .sum();
    if total_damage > 0.0 {
        apply_damage(state, target_id, total_damage);
    }
}

/// Missile salvos: launch, point-defense interception (ship PD, then colony
/// PD), then apply surviving damage.
pub(crate) fn tick_missiles(state: &mut GameState, content: &GameContent) {
    if !content.config.enable_combat {
        return;
    }
    let mut rng = rng_for(state);
    let launches = collect_missile_launches(state, content);
    for launch in launches {
        execute_missile_launch(state, content, &mut rng, launch);
    }
    crate::rng::save_rng_pos(state, &rng);
}

struct MissileLaunch {
    shooter_id: Id,
    target_id: Id,
    damage: f64,
    speed_mkm_per_day: f64,
}

fn collect_missile_launches(state: &GameState, content: &GameContent) -> Vec<MissileLaunch> {
    let mut launches = Vec::new();
    let mut ship_ids: Vec<Id> = state.ships.keys().copied().collect();
    ship_ids.sort_unstable();

    for shooter_id in ship_ids {
        let Some(shooter) = state.ships.get(&shooter_id) else {
            continue;
        };
        if shooter.missile_ammo == 0 || shooter.missile_reload_progress_days > 0.0 {
            continue;
        }
        let Some(design) = content.designs.get(&shooter.design_id) else {
            continue;
        };
        let Some(missile) = &design.missile else {
            continue;
        };
        let Some(target_id) = best_hostile_target(state, shooter.faction_id, shooter.system_id, shooter.position_mkm, missile.missile_speed_mkm_per_day * 5.0) else {
            continue;
        };
        launches.push(MissileLaunch {
            shooter_id,
            target_id,
            damage: missile.missile_damage,
            speed_mkm_per_day: missile.missile_speed_mkm_per_day,
        });
    }
    launches
}

fn best_hostile_target(state: &GameState, faction_id: Id, system_id: Id, from_pos: (f64, f64), max_range_mkm: f64) -> Option<Id> {
    state
        .ships
        .values()
        .filter(|s| s.system_id == system_id && are_hostile(state, faction_id, s.faction_id))
        .filter(|s| distance_mkm(from_pos, s.position_mkm) <= max_range_mkm)
        .min_by(|a, b| {
            distance_mkm(from_pos, a.position_mkm)
                .partial_cmp(&distance_mkm(from_pos, b.position_mkm))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|s| s.id)
}

fn execute_missile_launch(state: &mut GameState, content: &GameContent, rng: &mut impl Rng, launch: MissileLaunch) {
    if let Some(shooter) = state.ships.get_mut(&launch.shooter_id) {
        shooter.missile_ammo -= 1;
        let reload_days = content
            .designs
            .get(&shooter.design_id)
            .and_then(|d| d.missile.as_ref())
            .map(|m| m.missile_reload_days)
            .unwrap_or(0.0);
        shooter.missile_reload_progress_days = reload_days;
    }

    let intercepted = point_defense_intercepts(state, content, rng, launch.target_id, launch.speed_mkm_per_day);
    if intercepted {
        record(
            state,
            EventLevel::Info,
            EventCategory::Combat,
            "missile intercepted by point defense",
            Some(EventKind::PointDefenseIntercept {
                defender_id: Some(launch.target_id),
            }),
        );
        return;
    }
    apply_damage(state, launch.target_id, launch.damage);
}

fn point_defense_intercepts(state: &GameState, content: &GameContent, rng: &mut impl Rng, target_id: Id, missile_speed: f64) -> bool {
    let Some(target) = state.ships.get(&target_id) else {
        return false;
    };
    let ship_pd = content
        .designs
        .get(&target.design_id)
        .and_then(|d| d.point_defense.as_ref())
        .map(|pd| pd.point_defense_damage > 0.0)
        .unwrap_or(false);

    let colony_pd = state
        .colonies
        .values()
        .filter(|c| c.faction_id == target.faction_id)
        .filter_map(|c| state.bodies.get(&c.body_id))
        .any(|b| b.system_id == target.system_id && distance_mkm(b.position_mkm, target.position_mkm) < missile_speed);

    if !ship_pd && !colony_pd {
        return false;
    }
    if content.config.enable_missile_hit_chance {
        rng.gen_bool(0.5)
    } else {
        true
    }
}

fn resolve_boarding(state: &mut GameState, cfg: &SimConfig) {
    if !cfg.enable_boarding {
        return;
    }
    let mut ship_ids: Vec<Id> = state.ships.keys().copied().collect();
    ship_ids.sort_unstable();

    for attacker_id in ship_ids {
        let Some(order) = state.ship_orders.get(&attacker_id).and_then(|o| o.queue.front().cloned()) else {
            continue;
        };
        let Order::AttackShip { target_id, .. } = order else {
            continue;
        };
        let Some(attacker) = state.ships.get(&attacker_id) else {
            continue;
        };
        let Some(target) = state.ships.get(&target_id) else {
            continue;
        };
        if attacker.troops < cfg.boarding_min_attacker_troops {
            continue;
        }
        if target.hp > target.max_hp * cfg.boarding_target_hp_fraction {
            continue;
        }
        if distance_mkm(attacker.position_mkm, target.position_mkm) > cfg.boarding_range_mkm {
            continue;
        }
        attempt_boarding(state, cfg, attacker_id, target_id);
    }
}

fn attempt_boarding(state: &mut GameState, cfg: &SimConfig, attacker_id: Id, target_id: Id) {
    let (attacker_troops, defender_troops) = {
        let Some(attacker) = state.ships.get(&attacker_id) else { return };
        let Some(target) = state.ships.get(&target_id) else { return };
        (attacker.troops, target.troops * cfg.boarding_defense_hp_factor)
    };

    if attacker_troops > defender_troops {
        if let Some(attacker) = state.ships.get_mut(&attacker_id) {
            attacker.troops -= defender_troops * cfg.boarding_attacker_casualty_fraction;
        }
        record(
            state,
            EventLevel::Info,
            EventCategory::Combat,
            "boarding action succeeded",
            Some(EventKind::BoardingSucceeded {
                attacker_ship_id: attacker_id,
                target_ship_id: target_id,
            }),
        );
        destroy_ship(state, target_id);
    } else if let Some(attacker) = state.ships.get_mut(&attacker_id) {
        attacker.troops -= attacker_troops * cfg.boarding_attacker_casualty_fraction;
        if let Some(target) = state.ships.get_mut(&target_id) {
            target.troops -= defender_troops * cfg.boarding_defender_casualty_fraction;
        }
    }
}

/// Invasion ground combat: attrition each sub-step until one side runs out of
/// troops. Resolved here rather than in the order-execution engine because it
/// spans multiple ticks and ships involved may come and go.
fn resolve_ground_battles(state: &mut GameState, _content: &GameContent) {
    spawn_new_ground_battles(state);

    let battle_ids: Vec<Id> = state.ground_battles.keys().copied().collect();
    for battle_id in battle_ids {
        let Some(mut battle) = state.ground_battles.get(&battle_id).cloned() else {
            continue;
        };
        const DAILY_ATTRITION: f64 = 0.1;
        let attacker_loss = battle.defender_troops.min(battle.attacker_troops) * DAILY_ATTRITION;
        let defender_loss = battle.attacker_troops.min(battle.defender_troops) * DAILY_ATTRITION;
        battle.attacker_troops = (battle.attacker_troops - attacker_loss).max(0.0);
        battle.defender_troops = (battle.defender_troops - defender_loss).max(0.0);

        if battle.defender_troops <= 0.0 && battle.attacker_troops > 0.0 {
            if let Some(colony) = state.colonies.get_mut(&battle.colony_id) {
                colony.faction_id = battle.attacker_faction_id;
            }
            state.ground_battles.remove(&battle_id);
        } else if battle.attacker_troops <= 0.0 {
            state.ground_battles.remove(&battle_id);
        } else {
            state.ground_battles.insert(battle_id, battle);
        }
    }
}

fn spawn_new_ground_battles(state: &mut GameState) {
    let current_day = state.date.days_since_epoch();
    let mut ship_ids: Vec<Id> = state.ships.keys().copied().collect();
    ship_ids.sort_unstable();

    for ship_id in ship_ids {
        let Some(order) = state.ship_orders.get(&ship_id).and_then(|o| o.queue.front().cloned()) else {
            continue;
        };
        let Order::InvadeColony { colony_id } = order else {
            continue;
        };
        let Some(ship) = state.ships.get(&ship_id) else {
            continue;
        };
        if ship.troops <= 0.0 {
            continue;
        }
        let Some(colony) = state.colonies.get(&colony_id) else {
            continue;
        };
        if colony.faction_id == ship.faction_id {
            continue;
        }
        if state.ground_battles.values().any(|b| b.colony_id == colony_id && b.attacker_faction_id == ship.faction_id) {
            continue;
        }
        let battle_id = state.allocate_id();
        state.ground_battles.insert(
            battle_id,
            GroundBattle {
                id: battle_id,
                colony_id,
                attacker_faction_id: ship.faction_id,
                defender_faction_id: colony.faction_id,
                attacker_troops: ship.troops,
                defender_troops: colony.population_millions * 10.0,
                started_day: current_day,
            },
        );
    }
}
