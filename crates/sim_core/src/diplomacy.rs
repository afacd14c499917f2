//! Per-pair diplomatic status, treaties and offers (§4.9). Day-granular.

use crate::content::GameContent;
use crate::events::{emit, EventBuilder, EventCategory, EventKind, EventLevel};
use crate::id::Id;
use crate::state::{DiplomacyStatus, GameState, Treaty, TreatyType};

fn clock(state: &GameState) -> (i64, u8) {
    (state.date.days_since_epoch(), state.hour_of_day)
}

fn record(state: &mut GameState, faction_a: Id, message: impl Into<String>, kind: Option<EventKind>) {
    let (day, hour) = clock(state);
    let event = emit(
        &mut state.next_event_seq,
        message,
        EventBuilder {
            day,
            hour,
            level: EventLevel::Info,
            category: EventCategory::Diplomacy,
            faction_id: Some(faction_a),
            system_id: None,
            ship_id: None,
            colony_id: None,
            kind,
        },
    );
    state.events.push(event);
}

/// Sets the diplomatic status between two factions. Symmetric unless
/// `reciprocal` is false, in which case only `a`'s view of `b` changes.
pub(crate) fn set_status(state: &mut GameState, a: Id, b: Id, status: DiplomacyStatus, reciprocal: bool) {
    if let Some(fac) = state.factions.get_mut(&a) {
        fac.diplomacy.insert(b, status);
    }
    if reciprocal {
        if let Some(fac) = state.factions.get_mut(&b) {
            fac.diplomacy.insert(a, status);
        }
    }
}

pub(crate) fn create_treaty(
    state: &mut GameState,
    treaty_type: TreatyType,
    faction_a: Id,
    faction_b: Id,
    duration_days: i64,
) -> Id {
    let id = state.allocate_id();
    let start_day = state.date.days_since_epoch();
    state.treaties.insert(
        id,
        Treaty {
            id,
            treaty_type,
            faction_a,
            faction_b,
            start_day,
            duration_days,
        },
    );
    apply_treaty_side_effects(state, treaty_type, faction_a, faction_b);
    id
}

pub(crate) fn cancel_treaty(state: &mut GameState, treaty_id: Id) -> bool {
    state.treaties.remove(&treaty_id).is_some()
}

fn apply_treaty_side_effects(state: &mut GameState, treaty_type: TreatyType, a: Id, b: Id) {
    match treaty_type {
        TreatyType::Alliance => set_status(state, a, b, DiplomacyStatus::Friendly, true),
        TreatyType::Ceasefire => {
            let current = state.factions.get(&a).map(|f| f.diplomacy_status(b)).unwrap_or(DiplomacyStatus::Neutral);
            if current == DiplomacyStatus::Hostile {
                set_status(state, a, b, DiplomacyStatus::Neutral, true);
            }
        }
        TreatyType::NonAggressionPact | TreatyType::TradeAgreement => {}
    }
}

pub(crate) fn accept_offer(state: &mut GameState, offer_id: Id) -> bool {
    let Some(offer) = state.diplomatic_offers.remove(&offer_id) else {
        return false;
    };
    create_treaty(state, offer.treaty_type, offer.from_faction, offer.to_faction, -1);
    true
}

pub(crate) fn decline_offer(state: &mut GameState, offer_id: Id) -> bool {
    state.diplomatic_offers.remove(&offer_id).is_some()
}

/// Expires treaties past their duration and offers past their `expire_day`.
pub(crate) fn tick_diplomacy(state: &mut GameState, _content: &GameContent) {
    let today = state.date.days_since_epoch();

    let expired_treaty_ids: Vec<Id> = state
        .treaties
        .values()
        .filter(|t| t.is_expired(today))
        .map(|t| t.id)
        .collect();
    for treaty_id in expired_treaty_ids {
        if let Some(treaty) = state.treaties.remove(&treaty_id) {
            record(
                state,
                treaty.faction_a,
                format!("treaty {treaty_id} expired"),
                Some(EventKind::TreatyExpired {
                    faction_a: treaty.faction_a,
                    faction_b: treaty.faction_b,
                }),
            );
        }
    }

    let expired_offer_ids: Vec<Id> = state
        .diplomatic_offers
        .values()
        .filter(|o| today >= o.expire_day)
        .map(|o| o.id)
        .collect();
    for offer_id in expired_offer_ids {
        state.diplomatic_offers.remove(&offer_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_status_is_symmetric_by_default() {
        let mut state = GameState::new(1);
        state.factions.insert(Id(1), crate::state::Faction { id: Id(1), ..Default::default() });
        state.factions.insert(Id(2), crate::state::Faction { id: Id(2), ..Default::default() });
        set_status(&mut state, Id(1), Id(2), DiplomacyStatus::Hostile, true);
        assert_eq!(state.factions[&Id(1)].diplomacy_status(Id(2)), DiplomacyStatus::Hostile);
        assert_eq!(state.factions[&Id(2)].diplomacy_status(Id(1)), DiplomacyStatus::Hostile);
    }

    #[test]
    fn alliance_treaty_sets_friendly_status() {
        let mut state = GameState::new(1);
        state.factions.insert(Id(1), crate::state::Faction { id: Id(1), ..Default::default() });
        state.factions.insert(Id(2), crate::state::Faction { id: Id(2), ..Default::default() });
        create_treaty(&mut state, TreatyType::Alliance, Id(1), Id(2), -1);
        assert_eq!(state.factions[&Id(1)].diplomacy_status(Id(2)), DiplomacyStatus::Friendly);
    }

    #[test]
    fn ceasefire_lifts_hostile_status_to_neutral() {
        let mut state = GameState::new(1);
        state.factions.insert(Id(1), crate::state::Faction { id: Id(1), ..Default::default() });
        state.factions.insert(Id(2), crate::state::Faction { id: Id(2), ..Default::default() });
        set_status(&mut state, Id(1), Id(2), DiplomacyStatus::Hostile, true);
        create_treaty(&mut state, TreatyType::Ceasefire, Id(1), Id(2), 30);
        assert_eq!(state.factions[&Id(1)].diplomacy_status(Id(2)), DiplomacyStatus::Neutral);
    }

    #[test]
    fn expired_treaty_is_removed_and_events_logged() {
        let content = crate::test_fixtures::base_content();
        let mut state = GameState::new(1);
        state.factions.insert(Id(1), crate::state::Faction { id: Id(1), ..Default::default() });
        state.factions.insert(Id(2), crate::state::Faction { id: Id(2), ..Default::default() });
        let treaty_id = create_treaty(&mut state, TreatyType::NonAggressionPact, Id(1), Id(2), 5);
        state.date = state.date.add_days(10);
        tick_diplomacy(&mut state, &content);
        assert!(!state.treaties.contains_key(&treaty_id));
        assert!(state.events.iter().any(|e| matches!(e.kind, Some(EventKind::TreatyExpired { .. }))));
    }

    #[test]
    fn accept_offer_creates_treaty_and_consumes_offer() {
        let mut state = GameState::new(1);
        state.factions.insert(Id(1), crate::state::Faction { id: Id(1), ..Default::default() });
        state.factions.insert(Id(2), crate::state::Faction { id: Id(2), ..Default::default() });
        let offer_id = state.allocate_id();
        state.diplomatic_offers.insert(
            offer_id,
            crate::state::DiplomaticOffer {
                id: offer_id,
                from_faction: Id(1),
                to_faction: Id(2),
                treaty_type: TreatyType::Alliance,
                expire_day: 30,
            },
        );
        assert!(accept_offer(&mut state, offer_id));
        assert!(!state.diplomatic_offers.contains_key(&offer_id));
        assert_eq!(state.treaties.len(), 1);
    }
}
