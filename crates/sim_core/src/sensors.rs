//! Detection and per-faction contact tracks (§4.3).

use crate::config::SimConfig;
use crate::content::GameContent;
use crate::id::Id;
use crate::state::{ContactTrack, GameState, SensorMode};

/// A single sensor emitter: a ship, or the best-ranged installation at a colony.
pub struct SensorSource {
    pub position_mkm: (f64, f64),
    pub range_mkm: f64,
}

fn distance_mkm(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Nebulae dampen every sensor in the system uniformly; `nebula_density` is
/// in `[0, 1]` and the multiplier never drops below 0.1.
pub fn system_sensor_environment_multiplier(state: &GameState, system_id: Id) -> f64 {
    state.systems.get(&system_id).map(|s| (1.0 - s.nebula_density).clamp(0.1, 1.0)).unwrap_or(1.0)
}

/// Collects every sensor source belonging to `faction_id` (or a
/// mutual-friendly faction) in `system_id`. Colony sensor range is the max
/// across its installations — ranges never stack.
pub fn gather_sensor_sources(
    state: &GameState,
    content: &GameContent,
    faction_id: Id,
    system_id: Id,
) -> Vec<SensorSource> {
    let mut sources = Vec::new();
    let env_multiplier = system_sensor_environment_multiplier(state, system_id);

    let is_friendly = |other: Id| -> bool {
        other == faction_id
            || state
                .factions
                .get(&faction_id)
                .map(|f| f.diplomacy_status(other) == crate::state::DiplomacyStatus::Friendly)
                .unwrap_or(false)
    };

    for ship in state.ships.values() {
        if ship.system_id != system_id || !is_friendly(ship.faction_id) {
            continue;
        }
        let Some(design) = content.designs.get(&ship.design_id) else {
            continue;
        };
        let range =
            design.sensor_range_mkm * ship.sensor_mode.range_multiplier(&content.config) * ship.integrity.sensors * env_multiplier;
        sources.push(SensorSource {
            position_mkm: ship.position_mkm,
            range_mkm: range,
        });
    }

    for colony in state.colonies.values() {
        if !is_friendly(colony.faction_id) {
            continue;
        }
        let Some(body) = state.bodies.get(&colony.body_id) else {
            continue;
        };
        if body.system_id != system_id {
            continue;
        }
        let best_range = colony
            .installations
            .keys()
            .filter_map(|installation_id| content.installations.get(installation_id))
            .map(|def| def.sensor_range_mkm)
            .fold(0.0_f64, f64::max);
        if best_range > 0.0 {
            sources.push(SensorSource {
                position_mkm: body.position_mkm,
                range_mkm: best_range * env_multiplier,
            });
        }
    }

    sources
}

/// `true` if any source detects a target at `target_pos` with the given
/// effective signature multiplier.
pub fn any_source_detects(sources: &[SensorSource], target_pos: (f64, f64), target_signature_multiplier: f64) -> bool {
    sources
        .iter()
        .any(|s| distance_mkm(s.position_mkm, target_pos) <= s.range_mkm * target_signature_multiplier)
}

pub fn effective_signature_multiplier(base_stealth: f64, mode: SensorMode, cfg: &SimConfig) -> f64 {
    (base_stealth * mode.signature_multiplier(cfg)).clamp(0.05, f64::MAX)
}

/// Refreshes every faction's ship contact tracks for ships currently visible
/// to them, and prunes tracks older than `contact_prediction_max_days`.
pub(crate) fn tick_sensors(state: &mut GameState, content: &GameContent) {
    let faction_ids = state.sorted_faction_ids();
    let current_day = state.date.days_since_epoch();

    for viewer in faction_ids {
        let mut refreshed: Vec<(Id, ContactTrack)> = Vec::new();

        let systems_with_presence: std::collections::BTreeSet<Id> = state
            .ships
            .values()
            .filter(|s| s.faction_id == viewer)
            .map(|s| s.system_id)
            .chain(
                state
                    .colonies
                    .values()
                    .filter(|c| c.faction_id == viewer)
                    .filter_map(|c| state.bodies.get(&c.body_id).map(|b| b.system_id)),
            )
            .collect();

        for system_id in systems_with_presence {
            let sources = gather_sensor_sources(state, content, viewer, system_id);
            let mut target_ids: Vec<Id> = state
                .ships
                .values()
                .filter(|s| s.system_id == system_id && s.faction_id != viewer)
                .map(|s| s.id)
                .collect();
            target_ids.sort_unstable();

            for target_id in target_ids {
                let Some(target) = state.ships.get(&target_id) else {
                    continue;
                };
                let Some(design) = content.designs.get(&target.design_id) else {
                    continue;
                };
                let sig = effective_signature_multiplier(design.signature_multiplier, target.sensor_mode, &content.config);
                if !any_source_detects(&sources, target.position_mkm, sig) {
                    continue;
                }

                let previous = state
                    .factions
                    .get(&viewer)
                    .and_then(|f| f.ship_contacts.get(&target_id));
                let (velocity_estimate, sample_count) = match previous {
                    Some(prev) if prev.last_seen_day < current_day => {
                        let dt = (current_day - prev.last_seen_day).max(1) as f64;
                        (
                            (
                                (target.position_mkm.0 - prev.position_mkm.0) / dt,
                                (target.position_mkm.1 - prev.position_mkm.1) / dt,
                            ),
                            prev.sample_count.saturating_add(1).min(2),
                        )
                    }
                    Some(prev) => (prev.velocity_estimate_mkm_per_day, prev.sample_count),
                    None => ((0.0, 0.0), 1),
                };

                let speed = (velocity_estimate.0.powi(2) + velocity_estimate.1.powi(2)).sqrt();
                let uncertainty = content.config.contact_uncertainty_growth_fraction_of_speed * speed
                    + content.config.contact_uncertainty_min_mkm_per_day;

                refreshed.push((
                    target_id,
                    ContactTrack {
                        target_ship_id: target_id,
                        last_seen_day: current_day,
                        last_seen_hour: state.hour_of_day,
                        position_mkm: target.position_mkm,
                        velocity_estimate_mkm_per_day: velocity_estimate,
                        design_id: target.design_id.clone(),
                        target_faction_id: target.faction_id,
                        uncertainty_radius_mkm: uncertainty,
                        sample_count,
                    },
                ));
            }
        }

        if let Some(faction) = state.factions.get_mut(&viewer) {
            for (target_id, track) in refreshed {
                faction.ship_contacts.insert(target_id, track);
            }
            let max_days = content.config.contact_prediction_max_days as i64;
            faction
                .ship_contacts
                .retain(|_, track| current_day - track.last_seen_day <= max_days);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_rule_is_range_times_signature() {
        let sources = vec![SensorSource {
            position_mkm: (0.0, 0.0),
            range_mkm: 10.0,
        }];
        assert!(any_source_detects(&sources, (5.0, 0.0), 1.0));
        assert!(!any_source_detects(&sources, (50.0, 0.0), 1.0));
        // Halved signature (e.g. passive EMCON) halves effective detection range.
        assert!(!any_source_detects(&sources, (8.0, 0.0), 0.5));
    }

    #[test]
    fn signature_multiplier_floors_at_005() {
        let cfg = SimConfig::default();
        let sig = effective_signature_multiplier(0.0, SensorMode::Passive, &cfg);
        assert!((sig - 0.05).abs() < 1e-9);
    }

    #[test]
    fn nebula_density_dampens_the_environment_multiplier() {
        let mut state = crate::test_fixtures::base_state();
        state.systems.get_mut(&Id(1)).unwrap().nebula_density = 0.5;
        assert!((system_sensor_environment_multiplier(&state, Id(1)) - 0.5).abs() < 1e-9);
        state.systems.get_mut(&Id(1)).unwrap().nebula_density = 1.0;
        assert!((system_sensor_environment_multiplier(&state, Id(1)) - 0.1).abs() < 1e-9);
    }
}
