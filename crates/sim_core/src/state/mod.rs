//! World state: the single source of truth. Every entity is owned by value
//! in one of these maps; cross-references are by [`Id`] only, never a
//! back-pointer — callers look entities up with `HashMap::get`/`get_mut`,
//! the idiomatic replacement for the source's `find_ptr(map, key)` helper.

mod colony;
mod faction;
mod misc;
mod ship;
mod system;

pub use colony::*;
pub use faction::*;
pub use misc::*;
pub use ship::*;
pub use system::*;

use crate::date::Date;
use crate::events::EventEnvelope;
use crate::id::{Id, IdAllocator};
use crate::orders::ShipOrders;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const CURRENT_SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub save_version: u32,
    pub date: Date,
    pub hour_of_day: u8,
    /// Seed for the save's PRNG stream. `rng_word_pos` is `ChaCha8Rng`'s
    /// internal word offset (`get_word_pos`/`set_word_pos`), persisted so the
    /// exact stream position survives a save/load round trip.
    pub seed: u64,
    pub rng_word_pos: u128,

    pub ids: IdAllocator,
    pub next_event_seq: u64,

    pub systems: HashMap<Id, StarSystem>,
    pub bodies: HashMap<Id, Body>,
    pub ships: HashMap<Id, Ship>,
    pub colonies: HashMap<Id, Colony>,
    pub factions: HashMap<Id, Faction>,
    pub jump_points: HashMap<Id, JumpPoint>,
    pub wrecks: HashMap<Id, Wreck>,
    pub anomalies: HashMap<Id, Anomaly>,
    pub ground_battles: HashMap<Id, GroundBattle>,
    pub fleets: HashMap<Id, Fleet>,
    pub regions: HashMap<Id, Region>,
    pub treaties: HashMap<Id, Treaty>,
    pub diplomatic_offers: HashMap<Id, DiplomaticOffer>,

    pub ship_orders: HashMap<Id, ShipOrders>,

    pub events: Vec<EventEnvelope>,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        GameState {
            save_version: CURRENT_SAVE_VERSION,
            date: Date::EPOCH,
            hour_of_day: 0,
            seed,
            rng_word_pos: 0,
            ids: IdAllocator::default(),
            next_event_seq: 0,
            systems: HashMap::new(),
            bodies: HashMap::new(),
            ships: HashMap::new(),
            colonies: HashMap::new(),
            factions: HashMap::new(),
            jump_points: HashMap::new(),
            wrecks: HashMap::new(),
            anomalies: HashMap::new(),
            ground_battles: HashMap::new(),
            fleets: HashMap::new(),
            regions: HashMap::new(),
            treaties: HashMap::new(),
            diplomatic_offers: HashMap::new(),
            ship_orders: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn allocate_id(&mut self) -> Id {
        self.ids.allocate()
    }

    /// Sorted snapshot of ship ids — the idiom every subsystem uses to keep
    /// per-entity iteration independent of `HashMap`'s internal order.
    pub fn sorted_ship_ids(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self.ships.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn sorted_colony_ids(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self.colonies.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn sorted_faction_ids(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self.factions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn sorted_body_ids(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self.bodies.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
