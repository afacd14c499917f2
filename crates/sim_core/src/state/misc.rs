use crate::id::Id;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wreck {
    pub id: Id,
    pub system_id: Id,
    pub position_mkm: (f64, f64),
    pub minerals: HashMap<String, f64>,
    pub source_design_id: Option<String>,
    pub source_faction_id: Option<Id>,
}

impl Wreck {
    pub fn is_depleted(&self) -> bool {
        self.minerals.values().all(|tons| *tons <= 1e-9)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnomalyTag {
    IronRich,
    RareElements,
    Hazardous,
    Derelict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub id: Id,
    pub system_id: Id,
    pub position_mkm: (f64, f64),
    pub tag: AnomalyTag,
    pub investigation_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundBattle {
    pub id: Id,
    pub colony_id: Id,
    pub attacker_faction_id: Id,
    pub defender_faction_id: Id,
    pub attacker_troops: f64,
    pub defender_troops: f64,
    pub started_day: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fleet {
    pub id: Id,
    pub faction_id: Id,
    pub name: String,
    pub ship_ids: Vec<Id>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: Id,
    pub name: String,
    pub system_ids: Vec<Id>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreatyType {
    Ceasefire,
    NonAggressionPact,
    Alliance,
    TradeAgreement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treaty {
    pub id: Id,
    pub treaty_type: TreatyType,
    pub faction_a: Id,
    pub faction_b: Id,
    pub start_day: i64,
    /// `-1` means indefinite.
    pub duration_days: i64,
}

impl Treaty {
    pub fn is_expired(&self, current_day: i64) -> bool {
        self.duration_days >= 0 && current_day >= self.start_day + self.duration_days
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiplomaticOffer {
    pub id: Id,
    pub from_faction: Id,
    pub to_faction: Id,
    pub treaty_type: TreatyType,
    pub expire_day: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indefinite_treaty_never_expires() {
        let treaty = Treaty {
            id: Id(1),
            treaty_type: TreatyType::Alliance,
            faction_a: Id(1),
            faction_b: Id(2),
            start_day: 0,
            duration_days: -1,
        };
        assert!(!treaty.is_expired(1_000_000));
    }

    #[test]
    fn finite_treaty_expires_on_schedule() {
        let treaty = Treaty {
            id: Id(1),
            treaty_type: TreatyType::Ceasefire,
            faction_a: Id(1),
            faction_b: Id(2),
            start_day: 10,
            duration_days: 5,
        };
        assert!(!treaty.is_expired(14));
        assert!(treaty.is_expired(15));
    }

    #[test]
    fn depleted_wreck_has_zero_minerals() {
        let mut minerals = HashMap::new();
        minerals.insert("Duranium".to_string(), 1e-12);
        let wreck = Wreck {
            id: Id(1),
            system_id: Id(1),
            position_mkm: (0.0, 0.0),
            minerals,
            source_design_id: None,
            source_faction_id: None,
        };
        assert!(wreck.is_depleted());
    }
}
