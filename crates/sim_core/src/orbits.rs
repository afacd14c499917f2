//! Body position updates (§4.1: a continuous subsystem, runs every sub-step).

use crate::state::GameState;

/// Refreshes every body's cached `position_mkm` for the current wall clock.
/// Bodies are resolved in parent-before-child order so a moon's position is
/// computed from its already-updated parent.
pub(crate) fn tick_orbits(state: &mut GameState) {
    let day = state.date.days_since_epoch() as f64 + f64::from(state.hour_of_day) / 24.0;

    let mut ids = state.sorted_body_ids();
    ids.sort_by_key(|id| depth(state, *id));

    for body_id in ids {
        let Some(body) = state.bodies.get(&body_id) else {
            continue;
        };
        let parent_pos = body
            .parent_body_id
            .and_then(|parent_id| state.bodies.get(&parent_id))
            .map(|parent| parent.position_mkm)
            .unwrap_or((0.0, 0.0));
        let new_pos = body.orbital_position_mkm(day, parent_pos);
        if let Some(body) = state.bodies.get_mut(&body_id) {
            body.position_mkm = new_pos;
        }
    }
}

/// Chain depth from the root body (no parent), capped to avoid infinite
/// loops on a malformed parent cycle.
fn depth(state: &GameState, body_id: crate::id::Id) -> u32 {
    let mut current = body_id;
    let mut depth = 0;
    while let Some(parent_id) = state.bodies.get(&current).and_then(|b| b.parent_body_id) {
        depth += 1;
        if depth > 64 || parent_id == body_id {
            break;
        }
        current = parent_id;
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::Id;
    use crate::test_fixtures::stub_body;

    #[test]
    fn moon_position_follows_updated_parent() {
        let mut state = GameState::new(1);
        let mut planet = stub_body(Id(1), Id(1), (0.0, 0.0));
        planet.orbit_radius_mkm = 100.0;
        planet.orbit_period_days = 365.0;
        state.bodies.insert(Id(1), planet);

        let mut moon = stub_body(Id(2), Id(1), (0.0, 0.0));
        moon.parent_body_id = Some(Id(1));
        moon.orbit_radius_mkm = 1.0;
        moon.orbit_period_days = 10.0;
        state.bodies.insert(Id(2), moon);

        tick_orbits(&mut state);

        let planet_pos = state.bodies[&Id(1)].position_mkm;
        assert_ne!(planet_pos, (0.0, 0.0));
    }
}
