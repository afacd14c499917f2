//! The append-only event log. The log is the canonical diagnostic surface
//! (spec'd error-handling design): tick subsystems never propagate failures,
//! they skip the offending entity and push an event instead.

use crate::id::Id;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCategory {
    General,
    Combat,
    Shipyard,
    Construction,
    Research,
    Diplomacy,
    Movement,
    Maintenance,
    Sensors,
}

/// Structured payload for notable events. Not every event carries one —
/// `message` is always present and human-readable on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    ConstructionComplete {
        colony_id: Id,
        installation_id: String,
        auto_queued: bool,
    },
    ShipyardComplete {
        colony_id: Id,
        design_id: Option<String>,
        refit_ship_id: Option<Id>,
        new_ship_id: Option<Id>,
    },
    TechUnlocked {
        tech_id: String,
    },
    ShipDestroyed {
        ship_id: Id,
    },
    ShipFuelOut {
        ship_id: Id,
    },
    OrderDropped {
        ship_id: Id,
        reason: String,
    },
    SubsystemBreakdown {
        ship_id: Id,
        subsystem: String,
    },
    PointDefenseIntercept {
        defender_id: Option<Id>,
    },
    ColonizeComplete {
        colony_id: Id,
        body_id: Id,
    },
    BoardingSucceeded {
        attacker_ship_id: Id,
        target_ship_id: Id,
    },
    TreatyExpired {
        faction_a: Id,
        faction_b: Id,
    },
    ReverseEngineeringUnlock {
        component_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub seq: u64,
    pub day: i64,
    pub hour: u8,
    pub level: EventLevel,
    pub category: EventCategory,
    pub message: String,
    pub faction_id: Option<Id>,
    pub system_id: Option<Id>,
    pub ship_id: Option<Id>,
    pub colony_id: Option<Id>,
    pub kind: Option<EventKind>,
}

/// Builder for event envelopes sharing a clock + sequence counter. Kept
/// minimal and constructed fresh each call site — `emit` below is the
/// ergonomic entry point most subsystems use.
pub struct EventBuilder {
    pub day: i64,
    pub hour: u8,
    pub level: EventLevel,
    pub category: EventCategory,
    pub faction_id: Option<Id>,
    pub system_id: Option<Id>,
    pub ship_id: Option<Id>,
    pub colony_id: Option<Id>,
    pub kind: Option<EventKind>,
}

/// Allocates the next `seq` and constructs an [`EventEnvelope`]. Mirrors the
/// teacher's `crate::emit(counters, tick, event)` helper, generalized to the
/// day/hour clock and the richer context-id set this event log carries.
pub fn emit(next_seq: &mut u64, message: impl Into<String>, builder: EventBuilder) -> EventEnvelope {
    let seq = *next_seq;
    *next_seq += 1;
    EventEnvelope {
        seq,
        day: builder.day,
        hour: builder.hour,
        level: builder.level,
        category: builder.category,
        message: message.into(),
        faction_id: builder.faction_id,
        system_id: builder.system_id,
        ship_id: builder.ship_id,
        colony_id: builder.colony_id,
        kind: builder.kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_allocates_increasing_seq() {
        let mut seq = 0u64;
        let a = emit(
            &mut seq,
            "first",
            EventBuilder {
                day: 0,
                hour: 0,
                level: EventLevel::Info,
                category: EventCategory::General,
                faction_id: None,
                system_id: None,
                ship_id: None,
                colony_id: None,
                kind: None,
            },
        );
        let b = emit(
            &mut seq,
            "second",
            EventBuilder {
                day: 0,
                hour: 1,
                level: EventLevel::Info,
                category: EventCategory::General,
                faction_id: None,
                system_id: None,
                ship_id: None,
                colony_id: None,
                kind: None,
            },
        );
        assert_eq!(a.seq, 0);
        assert_eq!(b.seq, 1);
    }
}
