use crate::id::Id;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyType {
    Star,
    Planet,
    GasGiant,
    Asteroid,
    Comet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarSystem {
    pub id: Id,
    pub name: String,
    pub galaxy_position: (f64, f64),
    pub body_ids: Vec<Id>,
    pub ship_ids: Vec<Id>,
    pub jump_point_ids: Vec<Id>,
    pub nebula_density: f64,
    pub region_id: Id,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: Id,
    pub system_id: Id,
    pub parent_body_id: Option<Id>,
    pub body_type: BodyType,
    pub orbit_radius_mkm: f64,
    pub orbit_period_days: f64,
    /// Orbital phase at day 0, in days (i.e. mean anomaly expressed as a time offset).
    pub orbit_phase_days: f64,
    pub arg_periapsis_rad: f64,
    pub eccentricity: f64,
    pub temperature_k: f64,
    pub atmosphere: Option<String>,
    pub mineral_deposits: HashMap<String, f64>,
    /// Cached position, refreshed by `tick_orbits` every sub-step.
    pub position_mkm: (f64, f64),
}

impl Body {
    /// Approximate orbital position. Fidelity is explicitly not a goal here
    /// (spec Non-goals: Keplerian orbits are approximate) — this is a
    /// circular/elliptical parametrization, not a true two-body solve.
    pub fn orbital_position_mkm(&self, day: f64, parent_pos: (f64, f64)) -> (f64, f64) {
        if self.orbit_period_days <= 0.0 {
            return parent_pos;
        }
        let mean_anomaly = TAU * (day + self.orbit_phase_days) / self.orbit_period_days;
        let radius = self.orbit_radius_mkm * (1.0 - self.eccentricity * mean_anomaly.cos());
        let angle = mean_anomaly + self.arg_periapsis_rad;
        (
            parent_pos.0 + radius * angle.cos(),
            parent_pos.1 + radius * angle.sin(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpPoint {
    pub id: Id,
    pub system_id: Id,
    pub position_mkm: (f64, f64),
    pub linked_jump_id: Option<Id>,
    pub surveyed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stationary_body_returns_parent_position() {
        let body = Body {
            id: Id(1),
            system_id: Id(1),
            parent_body_id: None,
            body_type: BodyType::Star,
            orbit_radius_mkm: 0.0,
            orbit_period_days: 0.0,
            orbit_phase_days: 0.0,
            arg_periapsis_rad: 0.0,
            eccentricity: 0.0,
            temperature_k: 5000.0,
            atmosphere: None,
            mineral_deposits: HashMap::new(),
            position_mkm: (0.0, 0.0),
        };
        assert_eq!(body.orbital_position_mkm(10.0, (1.0, 2.0)), (1.0, 2.0));
    }

    #[test]
    fn orbiting_body_returns_to_start_after_one_period() {
        let body = Body {
            id: Id(2),
            system_id: Id(1),
            parent_body_id: Some(Id(1)),
            body_type: BodyType::Planet,
            orbit_radius_mkm: 100.0,
            orbit_period_days: 365.0,
            orbit_phase_days: 0.0,
            arg_periapsis_rad: 0.0,
            eccentricity: 0.0,
            temperature_k: 280.0,
            atmosphere: None,
            mineral_deposits: HashMap::new(),
            position_mkm: (0.0, 0.0),
        };
        let p0 = body.orbital_position_mkm(0.0, (0.0, 0.0));
        let p1 = body.orbital_position_mkm(365.0, (0.0, 0.0));
        assert!((p0.0 - p1.0).abs() < 1e-6);
        assert!((p0.1 - p1.1).abs() < 1e-6);
    }
}
