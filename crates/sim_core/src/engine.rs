//! The tick scheduler: advances the wall clock in integer-hour increments
//! and invokes subsystems in the canonical fixed order. Day-granular
//! subsystems (colonies, research, maintenance, diplomacy) only run on the
//! sub-step that crosses a day boundary; continuous subsystems (orbits,
//! ships, combat, missiles, sensors) run every sub-step.

use crate::colony_economy::tick_colonies;
use crate::combat::{tick_combat, tick_missiles};
use crate::content::GameContent;
use crate::diplomacy::tick_diplomacy;
use crate::maintenance::tick_maintenance;
use crate::orbits::tick_orbits;
use crate::orders::tick_ships;
use crate::research::tick_research;
use crate::sensors::tick_sensors;
use crate::state::GameState;

/// Advances the simulation by one hour, running continuous subsystems and,
/// if this sub-step crosses a day boundary, the day-granular ones too.
fn step_one_hour(state: &mut GameState, content: &GameContent) {
    let day_before = state.date.days_since_epoch();

    state.hour_of_day += 1;
    if state.hour_of_day >= 24 {
        state.hour_of_day = 0;
        state.date = state.date.add_days(1);
    }
    let crossed_day_boundary = state.date.days_since_epoch() != day_before;
    let dt_days = 1.0 / 24.0;

    tick_orbits(state);
    tick_sensors(state, content);
    tick_ships(state, content, dt_days);
    tick_combat(state, content);
    tick_missiles(state, content);

    if crossed_day_boundary {
        tick_colonies(state, content);
        tick_research(state, content);
        tick_maintenance(state, content);
        tick_diplomacy(state, content);
    }
}

/// Advances the simulation by `n` whole hours, one sub-step at a time.
pub fn advance_hours(state: &mut GameState, content: &GameContent, n: u32) {
    for _ in 0..n {
        step_one_hour(state, content);
    }
}

/// Advances the simulation by `n` whole days (`n * 24` hourly sub-steps).
pub fn advance_days(state: &mut GameState, content: &GameContent, n: u32) {
    advance_hours(state, content, n * 24);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, base_state};

    #[test]
    fn advance_hours_zero_is_a_no_op() {
        let content = base_content();
        let mut state = base_state();
        let before = state.date;
        advance_hours(&mut state, &content, 0);
        assert_eq!(state.date, before);
        assert_eq!(state.hour_of_day, 0);
    }

    #[test]
    fn twenty_four_hours_advances_exactly_one_day() {
        let content = base_content();
        let mut state = base_state();
        advance_hours(&mut state, &content, 24);
        assert_eq!(state.date, crate::date::Date::EPOCH.add_days(1));
        assert_eq!(state.hour_of_day, 0);
    }

    #[test]
    fn advance_days_is_deterministic_given_fixed_seed() {
        let content = base_content();
        let mut a = base_state();
        let mut b = base_state();
        advance_days(&mut a, &content, 5);
        advance_days(&mut b, &content, 5);
        assert_eq!(a.date, b.date);
        assert_eq!(a.events.len(), b.events.len());
    }
}
