//! `sim_core` — deterministic tick-based simulation of star systems, fleets,
//! colonies and factions advancing through discrete ticks in fixed subsystem
//! order.
//!
//! No IO, no network, no wall-clock reads. All randomness flows from the
//! per-save seed via [`rng::rng_for`]; advancing the same save by the same
//! number of hours from the same seed always yields the same state.

mod colony_economy;
mod combat;
pub mod config;
pub mod content;
mod date;
mod diplomacy;
mod engine;
pub mod error;
pub mod events;
pub mod facade;
mod id;
mod jump_routing;
mod maintenance;
mod orbits;
mod orders;
pub mod planners;
mod research;
mod rng;
mod sensors;
pub mod state;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use date::Date;
pub use engine::{advance_days, advance_hours};
pub use error::{SimError, SimResult};
pub use facade::Simulation;
pub use id::{Id, IdAllocator};
pub use jump_routing::{plan_route, Route, RouteHop};
pub use maintenance::blockade_output_multiplier_for_colony;
pub use orders::Order;
