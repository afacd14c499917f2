use crate::id::Id;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A ship under construction or refit at a colony's shipyard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildOrder {
    /// `Some` builds a new ship of this design; mutually exclusive with `refit_ship_id`.
    pub design_id: Option<String>,
    /// `Some` refits an existing, docked ship instead of building new.
    pub refit_ship_id: Option<Id>,
    pub tons_total: f64,
    pub tons_remaining: f64,
}

/// An installation queued for construction at a colony.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationBuildOrder {
    pub installation_id: String,
    /// Whether the mineral cost has already been paid (CP draining started).
    pub minerals_paid: bool,
    pub cp_remaining: f64,
    pub construction_cost_cp: f64,
    /// Inserted by auto-target reconciliation rather than a direct player command.
    pub auto_queued: bool,
}

impl InstallationBuildOrder {
    /// "Committed" units are never pruned by auto-target reconciliation.
    pub fn is_committed(&self) -> bool {
        self.minerals_paid || self.cp_remaining > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Colony {
    pub id: Id,
    pub faction_id: Id,
    pub body_id: Id,
    pub name: String,
    pub population_millions: f64,
    pub installations: HashMap<String, u32>,
    pub installation_targets: HashMap<String, u32>,
    pub minerals: HashMap<String, f64>,
    pub mineral_reserves: HashMap<String, f64>,
    pub shipyard_queue: Vec<BuildOrder>,
    pub construction_queue: Vec<InstallationBuildOrder>,
}

impl Colony {
    pub fn installation_count(&self, installation_id: &str) -> u32 {
        self.installations.get(installation_id).copied().unwrap_or(0)
    }

    pub fn mineral_tons(&self, mineral: &str) -> f64 {
        self.minerals.get(mineral).copied().unwrap_or(0.0)
    }
}
