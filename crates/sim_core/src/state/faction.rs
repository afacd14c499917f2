use crate::id::Id;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiplomacyStatus {
    Hostile,
    Neutral,
    Friendly,
}

/// A faction's remembered sighting of a foreign ship, refreshed each
/// sub-step by the sensor tick (`crate::sensors`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactTrack {
    pub target_ship_id: Id,
    pub last_seen_day: i64,
    pub last_seen_hour: u8,
    pub position_mkm: (f64, f64),
    pub velocity_estimate_mkm_per_day: (f64, f64),
    pub design_id: String,
    pub target_faction_id: Id,
    pub uncertainty_radius_mkm: f64,
    /// Samples accumulated so far; velocity estimation needs at least 2.
    pub sample_count: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    pub id: Id,
    pub name: String,

    pub known_techs: HashSet<String>,
    pub active_research_id: Option<String>,
    pub research_queue: Vec<String>,
    pub rp_bank: f64,
    /// Additive bonus amounts per output key, from `TechEffect::FactionOutputBonus`.
    pub research_output_bonuses: HashMap<String, f64>,

    pub ship_contacts: HashMap<Id, ContactTrack>,
    pub discovered_systems: HashSet<Id>,

    pub diplomacy: HashMap<Id, DiplomacyStatus>,
}

impl Faction {
    /// `1 + sum(bonuses)` for the given output key, clamped to `>= 0`.
    pub fn output_multiplier(&self, key: &str) -> f64 {
        let sum: f64 = self.research_output_bonuses.get(key).copied().unwrap_or(0.0);
        (1.0 + sum).max(0.0)
    }

    pub fn diplomacy_status(&self, other: Id) -> DiplomacyStatus {
        self.diplomacy.get(&other).copied().unwrap_or(DiplomacyStatus::Neutral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_multiplier_defaults_to_one() {
        let faction = Faction {
            id: Id(1),
            ..Faction::default()
        };
        assert_eq!(faction.output_multiplier("mining"), 1.0);
    }

    #[test]
    fn output_multiplier_is_additive_and_floored() {
        let mut faction = Faction {
            id: Id(1),
            ..Faction::default()
        };
        faction.research_output_bonuses.insert("mining".to_string(), 0.5);
        assert_eq!(faction.output_multiplier("mining"), 1.5);
        faction.research_output_bonuses.insert("mining".to_string(), -5.0);
        assert_eq!(faction.output_multiplier("mining"), 0.0);
    }

    #[test]
    fn unknown_pair_defaults_to_neutral() {
        let faction = Faction {
            id: Id(1),
            ..Faction::default()
        };
        assert_eq!(faction.diplomacy_status(Id(2)), DiplomacyStatus::Neutral);
    }
}
