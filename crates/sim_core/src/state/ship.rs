use crate::id::Id;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorMode {
    Passive,
    Normal,
    Active,
}

impl SensorMode {
    pub fn range_multiplier(self, cfg: &crate::config::SimConfig) -> f64 {
        match self {
            SensorMode::Passive => cfg.sensor_mode_passive_range_multiplier,
            SensorMode::Normal => cfg.sensor_mode_normal_range_multiplier,
            SensorMode::Active => cfg.sensor_mode_active_range_multiplier,
        }
    }

    pub fn signature_multiplier(self, cfg: &crate::config::SimConfig) -> f64 {
        match self {
            SensorMode::Passive => cfg.sensor_mode_passive_signature_multiplier,
            SensorMode::Normal => cfg.sensor_mode_normal_signature_multiplier,
            SensorMode::Active => cfg.sensor_mode_active_signature_multiplier,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatDoctrineMode {
    Auto,
    Beam,
    Missile,
    PointDefense,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatDoctrine {
    pub mode: CombatDoctrineMode,
    pub range_fraction: f64,
    pub min_range_fraction: f64,
    pub kite_if_too_close: bool,
}

impl Default for CombatDoctrine {
    fn default() -> Self {
        CombatDoctrine {
            mode: CombatDoctrineMode::Auto,
            range_fraction: 0.9,
            min_range_fraction: 0.0,
            kite_if_too_close: false,
        }
    }
}

/// Subsystem integrities, each in `[0, 1]`. Damaged subsystems degrade the
/// corresponding capability proportionally (engines -> speed, sensors ->
/// range, weapons -> damage, shields -> shield capacity).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubsystemIntegrity {
    pub engines: f64,
    pub sensors: f64,
    pub weapons: f64,
    pub shields: f64,
}

impl Default for SubsystemIntegrity {
    fn default() -> Self {
        SubsystemIntegrity {
            engines: 1.0,
            sensors: 1.0,
            weapons: 1.0,
            shields: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum Subsystem {
    Engines,
    Sensors,
    Weapons,
    Shields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutomationFlags {
    pub auto_refuel: bool,
    pub auto_freight: bool,
    pub auto_tanker: bool,
    pub auto_salvage: bool,
    pub auto_mine: bool,
    pub auto_colonize: bool,
    pub auto_explore: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub id: Id,
    pub faction_id: Id,
    pub system_id: Id,
    pub position_mkm: (f64, f64),
    pub velocity_mkm_per_day: (f64, f64),
    pub design_id: String,
    pub name: String,
    pub hp: f64,
    pub max_hp: f64,
    pub shields: f64,
    pub max_shields: f64,
    pub integrity: SubsystemIntegrity,
    pub fuel_tons: f64,
    pub cargo: HashMap<String, f64>,
    pub troops: f64,
    pub colonists_millions: f64,
    /// `[0, 1]`, see `crate::maintenance`.
    pub maintenance_condition: f64,
    pub sensor_mode: SensorMode,
    pub combat_doctrine: CombatDoctrine,
    pub automation: AutomationFlags,
    pub missile_ammo: u32,
    pub missile_reload_progress_days: f64,
}

impl Ship {
    /// Total cargo currently aboard, in tons.
    pub fn cargo_total_tons(&self) -> f64 {
        self.cargo.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cargo_total_sums_all_minerals() {
        let mut cargo = HashMap::new();
        cargo.insert("Duranium".to_string(), 10.0);
        cargo.insert("Corbomite".to_string(), 5.0);
        let ship = Ship {
            id: Id(1),
            faction_id: Id(1),
            system_id: Id(1),
            position_mkm: (0.0, 0.0),
            velocity_mkm_per_day: (0.0, 0.0),
            design_id: "scout".to_string(),
            name: "Test".to_string(),
            hp: 100.0,
            max_hp: 100.0,
            shields: 0.0,
            max_shields: 0.0,
            integrity: SubsystemIntegrity::default(),
            fuel_tons: 50.0,
            cargo,
            troops: 0.0,
            colonists_millions: 0.0,
            maintenance_condition: 1.0,
            sensor_mode: SensorMode::Normal,
            combat_doctrine: CombatDoctrine::default(),
            automation: AutomationFlags::default(),
            missile_ammo: 0,
            missile_reload_progress_days: 0.0,
        };
        assert_eq!(ship.cargo_total_tons(), 15.0);
    }
}
