//! The read-only content database: ship designs, components, installations,
//! techs and resources, loaded once at init alongside [`crate::config::SimConfig`].
//!
//! Loading content JSON from disk is out of scope here (an external
//! collaborator per the core's charter) — this module only defines the
//! shapes the core consumes and validates.

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipRole {
    Scout,
    Freighter,
    Tanker,
    Combatant,
    Colonizer,
    Survey,
    Miner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponDef {
    pub weapon_range_mkm: f64,
    pub weapon_damage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissileDef {
    pub missile_speed_mkm_per_day: f64,
    pub missile_damage: f64,
    pub missile_reload_days: f64,
    pub ammo_capacity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointDefenseDef {
    pub point_defense_range_mkm: f64,
    pub point_defense_damage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipDesign {
    pub mass_tons: f64,
    pub speed_km_s: f64,
    pub fuel_capacity_tons: f64,
    pub fuel_use_per_mkm: f64,
    pub cargo_capacity_tons: f64,
    pub sensor_range_mkm: f64,
    pub signature_multiplier: f64,
    pub power_generation_kw: f64,
    pub power_use_kw: f64,
    pub max_hp: f64,
    pub max_shields: f64,
    pub weapons: Vec<WeaponDef>,
    pub missile: Option<MissileDef>,
    pub point_defense: Option<PointDefenseDef>,
    pub colony_capacity_millions: f64,
    pub troop_capacity: f64,
    pub role: ShipRole,
    pub component_ids: Vec<String>,
    pub build_rate_tons_per_day: f64,
    /// Mineral cost per ton of hull mass at the shipyard.
    pub cost_per_ton: HashMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentType {
    Engine,
    Reactor,
    FuelTank,
    Cargo,
    Mining,
    Sensor,
    Weapon,
    Armor,
    Shield,
    ColonyModule,
    TroopBay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDef {
    pub component_type: ComponentType,
    pub mass_tons: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstallationDef {
    pub build_costs: HashMap<String, f64>,
    pub construction_cost_cp: f64,
    pub production_per_day: HashMap<String, f64>,
    pub consumption_per_day: HashMap<String, f64>,
    pub research_points_per_day: f64,
    pub shipyard_build_rate_tons_per_day: f64,
    pub mining: bool,
    pub sensor_range_mkm: f64,
    pub point_defense: Option<PointDefenseDef>,
    pub maintenance_supply_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TechEffect {
    UnlockComponent { component_id: String },
    UnlockInstallation { installation_id: String },
    FactionOutputBonus { key: String, amount: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechDef {
    pub cost_rp: f64,
    pub prereqs: Vec<String>,
    pub effects: Vec<TechEffect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDef {
    pub mineable: bool,
    pub salvage_rp_coefficient: f64,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameContent {
    pub designs: HashMap<String, ShipDesign>,
    pub components: HashMap<String, ComponentDef>,
    pub installations: HashMap<String, InstallationDef>,
    pub techs: HashMap<String, TechDef>,
    pub resources: HashMap<String, ResourceDef>,
    pub config: SimConfig,
}

impl GameContent {
    /// Validates cross-references between content tables (tech prereqs and
    /// effects referencing real ids, design component ids existing). This is
    /// the boundary where malformed content is rejected before it ever
    /// reaches `GameState`.
    pub fn validate(&self) -> SimResult<()> {
        for (tech_id, tech) in &self.techs {
            for prereq in &tech.prereqs {
                if !self.techs.contains_key(prereq) {
                    return Err(SimError::MalformedContent(format!(
                        "tech {tech_id} has unknown prereq {prereq}"
                    )));
                }
            }
            for effect in &tech.effects {
                match effect {
                    TechEffect::UnlockComponent { component_id } => {
                        if !self.components.contains_key(component_id) {
                            return Err(SimError::MalformedContent(format!(
                                "tech {tech_id} unlocks unknown component {component_id}"
                            )));
                        }
                    }
                    TechEffect::UnlockInstallation { installation_id } => {
                        if !self.installations.contains_key(installation_id) {
                            return Err(SimError::MalformedContent(format!(
                                "tech {tech_id} unlocks unknown installation {installation_id}"
                            )));
                        }
                    }
                    TechEffect::FactionOutputBonus { .. } => {}
                }
            }
        }
        for (design_id, design) in &self.designs {
            for component_id in &design.component_ids {
                if !self.components.contains_key(component_id) {
                    return Err(SimError::MalformedContent(format!(
                        "design {design_id} references unknown component {component_id}"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_unknown_prereq() {
        let mut content = GameContent::default();
        content.techs.insert(
            "tech_a".to_string(),
            TechDef {
                cost_rp: 10.0,
                prereqs: vec!["tech_missing".to_string()],
                effects: vec![],
            },
        );
        assert!(content.validate().is_err());
    }

    #[test]
    fn validate_accepts_consistent_content() {
        let mut content = GameContent::default();
        content.components.insert(
            "comp_engine".to_string(),
            ComponentDef {
                component_type: ComponentType::Engine,
                mass_tons: 10.0,
            },
        );
        content.techs.insert(
            "tech_a".to_string(),
            TechDef {
                cost_rp: 10.0,
                prereqs: vec![],
                effects: vec![TechEffect::UnlockComponent {
                    component_id: "comp_engine".to_string(),
                }],
            },
        );
        assert!(content.validate().is_ok());
    }
}
