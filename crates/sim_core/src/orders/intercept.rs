//! Lead-pursuit intercept and the deterministic search-offset fan used when
//! an `AttackShip` order's target is lost to fog of war.

use crate::id::Id;
use std::f64::consts::TAU;

/// Solves `t = |target(t) - shooter| / speed` by fixed-point iteration
/// (roughly 8 steps is enough to converge for sub-light speeds and typical
/// engagement ranges).
pub fn lead_intercept_point(
    shooter_pos: (f64, f64),
    shooter_speed_mkm_per_day: f64,
    target_pos: (f64, f64),
    target_vel_mkm_per_day: (f64, f64),
) -> (f64, f64) {
    let mut t = 0.0_f64;
    for _ in 0..8 {
        let future = (
            target_pos.0 + target_vel_mkm_per_day.0 * t,
            target_pos.1 + target_vel_mkm_per_day.1 * t,
        );
        let dist = ((future.0 - shooter_pos.0).powi(2) + (future.1 - shooter_pos.1).powi(2)).sqrt();
        t = if shooter_speed_mkm_per_day > 0.0 {
            dist / shooter_speed_mkm_per_day
        } else {
            0.0
        };
    }
    (
        target_pos.0 + target_vel_mkm_per_day.0 * t,
        target_pos.1 + target_vel_mkm_per_day.1 * t,
    )
}

/// A stable angular fan keyed by `(ship_id, waypoint_index)`, so repeated
/// calls for the same ship/waypoint always pick the same search point and
/// sub-steps don't jitter while searching for a lost contact.
pub fn deterministic_search_offset(ship_id: Id, waypoint_index: u32, search_radius_mkm: f64) -> (f64, f64) {
    let key = ship_id.0.wrapping_mul(1_000_003).wrapping_add(u64::from(waypoint_index));
    let angle = TAU * ((key % 360) as f64 / 360.0);
    (search_radius_mkm * angle.cos(), search_radius_mkm * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stationary_target_intercept_is_the_target_itself() {
        let p = lead_intercept_point((0.0, 0.0), 10.0, (5.0, 0.0), (0.0, 0.0));
        assert!((p.0 - 5.0).abs() < 1e-6);
        assert!((p.1 - 0.0).abs() < 1e-6);
    }

    #[test]
    fn moving_target_is_led_ahead_of_its_current_position() {
        let p = lead_intercept_point((0.0, 0.0), 100.0, (10.0, 0.0), (0.0, 1.0));
        assert!(p.1 > 0.0);
    }

    #[test]
    fn search_offset_is_deterministic_for_same_key() {
        let a = deterministic_search_offset(Id(7), 3, 1.0);
        let b = deterministic_search_offset(Id(7), 3, 1.0);
        assert_eq!(a, b);
    }

    #[test]
    fn search_offset_varies_by_waypoint() {
        let a = deterministic_search_offset(Id(7), 0, 1.0);
        let b = deterministic_search_offset(Id(7), 1, 1.0);
        assert_ne!(a, b);
    }
}
