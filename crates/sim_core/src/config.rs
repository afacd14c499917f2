//! Simulation-wide tunables. One value-typed struct, loaded once with the
//! content DB and read-only thereafter — mirrors the teacher's `Constants`
//! content struct.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // Time
    pub seconds_per_day: f64,
    pub arrival_epsilon_mkm: f64,
    pub docking_range_mkm: f64,

    // Sensors
    pub sensor_mode_passive_range_multiplier: f64,
    pub sensor_mode_normal_range_multiplier: f64,
    pub sensor_mode_active_range_multiplier: f64,
    pub sensor_mode_passive_signature_multiplier: f64,
    pub sensor_mode_normal_signature_multiplier: f64,
    pub sensor_mode_active_signature_multiplier: f64,
    pub contact_uncertainty_growth_fraction_of_speed: f64,
    pub contact_uncertainty_min_mkm_per_day: f64,
    pub contact_prediction_max_days: f64,

    // Economy
    pub auto_freight_min_transfer_tons: f64,
    pub auto_freight_max_take_fraction_of_surplus: f64,
    pub auto_freight_multi_mineral: bool,
    pub auto_tanker_request_threshold_fraction: f64,
    pub auto_tanker_fill_target_fraction: f64,
    pub auto_tanker_min_transfer_tons: f64,
    /// Legacy/prototype behavior, preserved on purpose: bodies with no entry
    /// at all for a mineral in `deposits` are treated as an infinite source.
    pub missing_deposit_is_infinite: bool,

    // Combat
    pub enable_combat: bool,
    pub enable_missile_hit_chance: bool,
    pub bombard_standoff_range_fraction: f64,
    pub enable_boarding: bool,
    pub boarding_range_mkm: f64,
    pub boarding_target_hp_fraction: f64,
    pub boarding_min_attacker_troops: f64,
    pub boarding_defense_hp_factor: f64,
    pub boarding_attacker_casualty_fraction: f64,
    pub boarding_defender_casualty_fraction: f64,

    // Maintenance
    pub enable_ship_maintenance: bool,
    pub ship_maintenance_resource_id: String,
    pub ship_maintenance_tons_per_day_per_mass_ton: f64,
    pub ship_maintenance_recovery_per_day: f64,
    pub ship_maintenance_decay_per_day: f64,
    pub ship_maintenance_breakdown_start_fraction: f64,
    pub ship_maintenance_breakdown_rate_per_day_at_zero: f64,
    pub ship_maintenance_breakdown_exponent: f64,

    // Repair
    pub repair_hp_per_day_per_shipyard: f64,
    pub repair_duranium_per_hp: f64,
    pub repair_neutronium_per_hp: f64,
    pub ship_subsystem_repair_hp_equiv_per_integrity: f64,

    // Blockades
    pub enable_blockades: bool,
    pub blockade_range_mkm: f64,
    pub blockade_hostile_ship_threshold: u32,
    pub blockade_output_multiplier: f64,

    // Salvage / reverse engineering
    pub enable_salvage_research: bool,
    pub salvage_research_rp_multiplier: f64,
    pub enable_reverse_engineering: bool,
    pub reverse_engineering_points_per_salvaged_ton: f64,
    pub reverse_engineering_points_required_per_component_ton: f64,
    pub reverse_engineering_unlock_cap_per_tick: u32,

    // Transport
    pub colonist_transfer_millions_per_day_per_colony_cap: f64,
    pub colonist_transfer_millions_per_day_min: f64,

    // Construction / research
    pub construction_points_per_day_per_installation: f64,
    pub research_roll_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            seconds_per_day: 86_400.0,
            arrival_epsilon_mkm: 1e-6,
            docking_range_mkm: 0.01,

            sensor_mode_passive_range_multiplier: 0.6,
            sensor_mode_normal_range_multiplier: 1.0,
            sensor_mode_active_range_multiplier: 1.5,
            sensor_mode_passive_signature_multiplier: 0.5,
            sensor_mode_normal_signature_multiplier: 1.0,
            sensor_mode_active_signature_multiplier: 2.0,
            contact_uncertainty_growth_fraction_of_speed: 0.25,
            contact_uncertainty_min_mkm_per_day: 0.01,
            contact_prediction_max_days: 30.0,

            auto_freight_min_transfer_tons: 1.0,
            auto_freight_max_take_fraction_of_surplus: 1.0,
            auto_freight_multi_mineral: true,
            auto_tanker_request_threshold_fraction: 0.5,
            auto_tanker_fill_target_fraction: 1.0,
            auto_tanker_min_transfer_tons: 1.0,
            missing_deposit_is_infinite: true,

            enable_combat: true,
            enable_missile_hit_chance: false,
            bombard_standoff_range_fraction: 0.9,
            enable_boarding: true,
            boarding_range_mkm: 0.01,
            boarding_target_hp_fraction: 0.25,
            boarding_min_attacker_troops: 1.0,
            boarding_defense_hp_factor: 1.0,
            boarding_attacker_casualty_fraction: 0.1,
            boarding_defender_casualty_fraction: 0.3,

            enable_ship_maintenance: true,
            ship_maintenance_resource_id: "maintenance_supplies".to_string(),
            ship_maintenance_tons_per_day_per_mass_ton: 0.001,
            ship_maintenance_recovery_per_day: 0.05,
            ship_maintenance_decay_per_day: 0.01,
            ship_maintenance_breakdown_start_fraction: 0.5,
            ship_maintenance_breakdown_rate_per_day_at_zero: 0.2,
            ship_maintenance_breakdown_exponent: 2.0,

            repair_hp_per_day_per_shipyard: 50.0,
            repair_duranium_per_hp: 0.1,
            repair_neutronium_per_hp: 0.02,
            ship_subsystem_repair_hp_equiv_per_integrity: 20.0,

            enable_blockades: true,
            blockade_range_mkm: 5.0,
            blockade_hostile_ship_threshold: 1,
            blockade_output_multiplier: 0.5,

            enable_salvage_research: true,
            salvage_research_rp_multiplier: 1.0,
            enable_reverse_engineering: true,
            reverse_engineering_points_per_salvaged_ton: 1.0,
            reverse_engineering_points_required_per_component_ton: 100.0,
            reverse_engineering_unlock_cap_per_tick: 1,

            colonist_transfer_millions_per_day_per_colony_cap: 0.01,
            colonist_transfer_millions_per_day_min: 0.001,

            construction_points_per_day_per_installation: 10.0,
            research_roll_interval_ticks: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_json() {
        let cfg = SimConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
