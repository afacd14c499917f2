//! The order execution engine: a polymorphic per-ship queue of orders driven
//! one sub-step at a time, with fuel accounting, jump routing, lead pursuit
//! and cancellation.

mod intercept;
mod step;
mod step_arrival;

pub use intercept::{deterministic_search_offset, lead_intercept_point};

use crate::id::Id;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The closed set of ship orders. Dispatch is by variant match, never by
/// virtual call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Order {
    WaitDays {
        days_remaining: f64,
    },
    MoveToPoint {
        target_mkm: (f64, f64),
    },
    MoveToBody {
        body_id: Id,
    },
    /// `duration_days < 0` means orbit indefinitely.
    OrbitBody {
        body_id: Id,
        duration_days: f64,
    },
    TravelViaJump {
        jump_point_id: Id,
    },
    /// Expands into a sequence of `TravelViaJump` + `MoveToPoint` hops the
    /// first time it reaches the front of the queue.
    TravelToSystem {
        system_id: Id,
        final_pos: (f64, f64),
    },
    SurveyJumpPoint {
        jump_point_id: Id,
        transit_when_done: bool,
        progress_points: f64,
    },
    LoadMineral {
        colony_id: Id,
        mineral: String,
        tons: f64,
    },
    UnloadMineral {
        colony_id: Id,
        mineral: String,
        tons: f64,
    },
    LoadTroops {
        colony_id: Id,
        troops: f64,
    },
    UnloadTroops {
        colony_id: Id,
        troops: f64,
    },
    LoadColonists {
        colony_id: Id,
        millions: f64,
    },
    UnloadColonists {
        colony_id: Id,
        millions: f64,
    },
    TransferCargoToShip {
        target_ship_id: Id,
        mineral: String,
        tons: f64,
    },
    TransferFuelToShip {
        target_ship_id: Id,
        tons: f64,
    },
    TransferTroopsToShip {
        target_ship_id: Id,
        troops: f64,
    },
    AttackShip {
        target_id: Id,
        last_known_pos: Option<(f64, f64)>,
        has_search_offset: bool,
        search_waypoint_index: u32,
        search_offset_mkm: (f64, f64),
    },
    EscortShip {
        target_id: Id,
        follow_distance_mkm: f64,
    },
    BombardColony {
        colony_id: Id,
        duration_days: f64,
    },
    InvadeColony {
        colony_id: Id,
    },
    SalvageWreck {
        wreck_id: Id,
        mineral: String,
        tons: f64,
    },
    InvestigateAnomaly {
        anomaly_id: Id,
        /// `0` falls back to the anomaly's own `investigation_days` (preserved on purpose).
        duration_days: f64,
        progress_days: f64,
    },
    ColonizeBody {
        body_id: Id,
    },
    ScrapShip {
        colony_id: Id,
    },
}

impl Order {
    pub fn attack(target_id: Id) -> Order {
        Order::AttackShip {
            target_id,
            last_known_pos: None,
            has_search_offset: false,
            search_waypoint_index: 0,
            search_offset_mkm: (0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipOrders {
    pub queue: VecDeque<Order>,
    pub repeat_template: Option<VecDeque<Order>>,
    /// `-1` repeats unboundedly.
    pub repeat_count_remaining: i64,
}

impl ShipOrders {
    /// Drops the queue but preserves the repeat template, per `clear_orders`.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Refills from the repeat template if one is set and the counter allows it.
    pub(crate) fn refill_from_repeat(&mut self) {
        if self.queue.is_empty() {
            if let Some(template) = self.repeat_template.clone() {
                if self.repeat_count_remaining != 0 {
                    self.queue = template;
                    if self.repeat_count_remaining > 0 {
                        self.repeat_count_remaining -= 1;
                    }
                }
            }
        }
    }
}

pub(crate) use step::tick_ships;
