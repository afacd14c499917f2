//! Read-only forecasters. Every planner in this module borrows world state
//! and content immutably, runs its projection against a local working copy,
//! and returns a result describing what *would* happen — no planner ever
//! mutates `GameState` itself. Mutation, when a caller wants to act on a
//! planner's output, goes through the ordinary order/treaty API instead.
//!
//! All eight share one shape: take a const handle plus an options struct
//! with explicit safety caps (`max_days`, `max_items`, ...), and return a
//! result with `ok`, `stalled` (+ `stall_reason`), `truncated` (+
//! `truncated_reason`), and a collection of items.

pub mod colony_schedule;
pub mod freight_planner;
pub mod fuel_planner;
pub mod maintenance_planner;
pub mod order_planner;
pub mod planner_events;
pub mod repair_planner;
pub mod research_schedule;

/// Shared status block embedded in every planner result.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlannerStatus {
    pub ok: bool,
    pub stalled: bool,
    pub stall_reason: Option<String>,
    pub truncated: bool,
    pub truncated_reason: Option<String>,
}

impl PlannerStatus {
    pub fn ok() -> Self {
        PlannerStatus {
            ok: true,
            ..Default::default()
        }
    }

    pub fn stalled(reason: impl Into<String>) -> Self {
        PlannerStatus {
            ok: true,
            stalled: true,
            stall_reason: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        PlannerStatus {
            ok: false,
            stalled: true,
            stall_reason: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn mark_truncated(&mut self, reason: impl Into<String>) {
        self.truncated = true;
        self.truncated_reason = Some(reason.into());
    }
}
