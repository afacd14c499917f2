//! The host-facing API. Everything a driver needs to start a game, advance
//! it, issue orders and query derived facts lives behind [`Simulation`] —
//! nothing downstream reaches into `GameState`'s internals directly except
//! through `state()`/`state_mut()`.

use crate::content::{GameContent, ShipDesign};
use crate::diplomacy;
use crate::engine;
use crate::error::{SimError, SimResult};
use crate::id::Id;
use crate::jump_routing::{self, Route};
use crate::maintenance::blockade_output_multiplier_for_colony;
use crate::orders::Order;
use crate::planners::freight_planner::{self, LogisticsNeeds};
use crate::sensors::system_sensor_environment_multiplier;
use crate::state::{DiplomacyStatus, Fleet, GameState, TreatyType};

pub struct Simulation {
    pub state: GameState,
    pub content: GameContent,
}

impl Simulation {
    /// Starts a fresh game against validated content.
    pub fn new_game(seed: u64, content: GameContent) -> SimResult<Self> {
        content.validate()?;
        Ok(Simulation {
            state: GameState::new(seed),
            content,
        })
    }

    /// Resumes a persisted save. The content DB is not part of the save and
    /// must be supplied fresh, then re-validated against the loaded state's
    /// schema version.
    pub fn load_game(state: GameState, content: GameContent) -> SimResult<Self> {
        content.validate()?;
        if state.save_version > crate::state::CURRENT_SAVE_VERSION {
            return Err(SimError::CorruptedSave(format!(
                "save version {} is newer than this build supports ({})",
                state.save_version,
                crate::state::CURRENT_SAVE_VERSION
            )));
        }
        Ok(Simulation { state, content })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn advance_hours(&mut self, n: u32) {
        engine::advance_hours(&mut self.state, &self.content, n);
    }

    pub fn advance_days(&mut self, n: u32) {
        engine::advance_days(&mut self.state, &self.content, n);
    }

    fn issue(&mut self, ship_id: Id, order: Order) -> bool {
        if !self.state.ships.contains_key(&ship_id) {
            return false;
        }
        self.state.ship_orders.entry(ship_id).or_default().queue.push_back(order);
        true
    }

    pub fn issue_wait_days(&mut self, ship_id: Id, days_remaining: f64) -> bool {
        self.issue(ship_id, Order::WaitDays { days_remaining })
    }

    pub fn issue_move_to_point(&mut self, ship_id: Id, target_mkm: (f64, f64)) -> bool {
        self.issue(ship_id, Order::MoveToPoint { target_mkm })
    }

    pub fn issue_move_to_body(&mut self, ship_id: Id, body_id: Id) -> bool {
        self.issue(ship_id, Order::MoveToBody { body_id })
    }

    pub fn issue_orbit_body(&mut self, ship_id: Id, body_id: Id, duration_days: f64) -> bool {
        self.issue(ship_id, Order::OrbitBody { body_id, duration_days })
    }

    pub fn issue_travel_via_jump(&mut self, ship_id: Id, jump_point_id: Id) -> bool {
        self.issue(ship_id, Order::TravelViaJump { jump_point_id })
    }

    pub fn issue_travel_to_system(&mut self, ship_id: Id, system_id: Id, final_pos: (f64, f64)) -> bool {
        self.issue(ship_id, Order::TravelToSystem { system_id, final_pos })
    }

    pub fn issue_survey_jump_point(&mut self, ship_id: Id, jump_point_id: Id, transit_when_done: bool) -> bool {
        self.issue(
            ship_id,
            Order::SurveyJumpPoint {
                jump_point_id,
                transit_when_done,
                progress_points: 0.0,
            },
        )
    }

    pub fn issue_load_mineral(&mut self, ship_id: Id, colony_id: Id, mineral: String, tons: f64) -> bool {
        self.issue(ship_id, Order::LoadMineral { colony_id, mineral, tons })
    }

    pub fn issue_unload_mineral(&mut self, ship_id: Id, colony_id: Id, mineral: String, tons: f64) -> bool {
        self.issue(ship_id, Order::UnloadMineral { colony_id, mineral, tons })
    }

    pub fn issue_load_troops(&mut self, ship_id: Id, colony_id: Id, troops: f64) -> bool {
        self.issue(ship_id, Order::LoadTroops { colony_id, troops })
    }

    pub fn issue_unload_troops(&mut self, ship_id: Id, colony_id: Id, troops: f64) -> bool {
        self.issue(ship_id, Order::UnloadTroops { colony_id, troops })
    }

    pub fn issue_load_colonists(&mut self, ship_id: Id, colony_id: Id, millions: f64) -> bool {
        self.issue(ship_id, Order::LoadColonists { colony_id, millions })
    }

    pub fn issue_unload_colonists(&mut self, ship_id: Id, colony_id: Id, millions: f64) -> bool {
        self.issue(ship_id, Order::UnloadColonists { colony_id, millions })
    }

    pub fn issue_transfer_cargo_to_ship(&mut self, ship_id: Id, target_ship_id: Id, mineral: String, tons: f64) -> bool {
        self.issue(ship_id, Order::TransferCargoToShip { target_ship_id, mineral, tons })
    }

    pub fn issue_transfer_fuel_to_ship(&mut self, ship_id: Id, target_ship_id: Id, tons: f64) -> bool {
        self.issue(ship_id, Order::TransferFuelToShip { target_ship_id, tons })
    }

    pub fn issue_transfer_troops_to_ship(&mut self, ship_id: Id, target_ship_id: Id, troops: f64) -> bool {
        self.issue(ship_id, Order::TransferTroopsToShip { target_ship_id, troops })
    }

    pub fn issue_attack_ship(&mut self, ship_id: Id, target_id: Id) -> bool {
        self.issue(ship_id, Order::attack(target_id))
    }

    pub fn issue_escort_ship(&mut self, ship_id: Id, target_id: Id, follow_distance_mkm: f64) -> bool {
        self.issue(ship_id, Order::EscortShip { target_id, follow_distance_mkm })
    }

    pub fn issue_bombard_colony(&mut self, ship_id: Id, colony_id: Id, duration_days: f64) -> bool {
        self.issue(ship_id, Order::BombardColony { colony_id, duration_days })
    }

    pub fn issue_invade_colony(&mut self, ship_id: Id, colony_id: Id) -> bool {
        self.issue(ship_id, Order::InvadeColony { colony_id })
    }

    pub fn issue_salvage_wreck(&mut self, ship_id: Id, wreck_id: Id, mineral: String, tons: f64) -> bool {
        self.issue(ship_id, Order::SalvageWreck { wreck_id, mineral, tons })
    }

    pub fn issue_investigate_anomaly(&mut self, ship_id: Id, anomaly_id: Id, duration_days: f64) -> bool {
        self.issue(
            ship_id,
            Order::InvestigateAnomaly {
                anomaly_id,
                duration_days,
                progress_days: 0.0,
            },
        )
    }

    pub fn issue_colonize_body(&mut self, ship_id: Id, body_id: Id) -> bool {
        self.issue(ship_id, Order::ColonizeBody { body_id })
    }

    pub fn issue_scrap_ship(&mut self, ship_id: Id, colony_id: Id) -> bool {
        self.issue(ship_id, Order::ScrapShip { colony_id })
    }

    /// Drops the queue but preserves any repeat template, matching a
    /// single-ship "stop and wait for new orders" command.
    pub fn clear_orders(&mut self, ship_id: Id) -> bool {
        let Some(orders) = self.state.ship_orders.get_mut(&ship_id) else {
            return false;
        };
        orders.clear();
        true
    }

    pub fn set_diplomatic_status(&mut self, a: Id, b: Id, status: DiplomacyStatus, reciprocal: bool) {
        diplomacy::set_status(&mut self.state, a, b, status, reciprocal);
    }

    pub fn create_treaty(&mut self, treaty_type: TreatyType, faction_a: Id, faction_b: Id, duration_days: i64) -> Id {
        diplomacy::create_treaty(&mut self.state, treaty_type, faction_a, faction_b, duration_days)
    }

    pub fn cancel_treaty(&mut self, treaty_id: Id) -> bool {
        diplomacy::cancel_treaty(&mut self.state, treaty_id)
    }

    pub fn create_diplomatic_offer(&mut self, from_faction: Id, to_faction: Id, treaty_type: TreatyType, expire_day: i64) -> Id {
        let id = self.state.allocate_id();
        self.state.diplomatic_offers.insert(
            id,
            crate::state::DiplomaticOffer {
                id,
                from_faction,
                to_faction,
                treaty_type,
                expire_day,
            },
        );
        id
    }

    pub fn accept_diplomatic_offer(&mut self, offer_id: Id) -> bool {
        diplomacy::accept_offer(&mut self.state, offer_id)
    }

    pub fn decline_diplomatic_offer(&mut self, offer_id: Id) -> bool {
        diplomacy::decline_offer(&mut self.state, offer_id)
    }

    /// Adds or replaces a design in the content DB, e.g. after a refit or a
    /// reverse-engineering unlock. Rejected if it references unknown
    /// components.
    pub fn upsert_custom_design(&mut self, design_id: String, design: ShipDesign) -> SimResult<()> {
        for component_id in &design.component_ids {
            if !self.content.components.contains_key(component_id) {
                return Err(SimError::MalformedContent(format!(
                    "design {design_id} references unknown component {component_id}"
                )));
            }
        }
        self.content.designs.insert(design_id, design);
        Ok(())
    }

    /// `true` unless some tech gates the installation behind an
    /// `UnlockInstallation` effect the faction hasn't researched.
    pub fn is_installation_buildable_for_faction(&self, faction_id: Id, installation_id: &str) -> bool {
        if !self.content.installations.contains_key(installation_id) {
            return false;
        }
        let gating_tech_ids: Vec<&String> = self
            .content
            .techs
            .iter()
            .filter(|(_, tech)| {
                tech.effects
                    .iter()
                    .any(|e| matches!(e, crate::content::TechEffect::UnlockInstallation { installation_id: gated } if gated == installation_id))
            })
            .map(|(tech_id, _)| tech_id)
            .collect();
        if gating_tech_ids.is_empty() {
            return true;
        }
        let Some(faction) = self.state.factions.get(&faction_id) else {
            return false;
        };
        gating_tech_ids.iter().any(|tech_id| faction.known_techs.contains(*tech_id))
    }

    pub fn are_factions_mutual_friendly(&self, a: Id, b: Id) -> bool {
        let a_view = self.state.factions.get(&a).map(|f| f.diplomacy_status(b)).unwrap_or(DiplomacyStatus::Neutral);
        let b_view = self.state.factions.get(&b).map(|f| f.diplomacy_status(a)).unwrap_or(DiplomacyStatus::Neutral);
        a_view == DiplomacyStatus::Friendly && b_view == DiplomacyStatus::Friendly
    }

    pub fn are_factions_trade_partners(&self, a: Id, b: Id) -> bool {
        self.state
            .treaties
            .values()
            .any(|t| t.treaty_type == TreatyType::TradeAgreement && ((t.faction_a == a && t.faction_b == b) || (t.faction_a == b && t.faction_b == a)))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn plan_jump_route_from_pos(
        &self,
        start_system: Id,
        start_pos: (f64, f64),
        faction_id: Id,
        speed_mkm_per_day: f64,
        goal_system: Id,
        restrict_to_discovered: bool,
        goal_pos: (f64, f64),
    ) -> Option<Route> {
        jump_routing::plan_route(
            &self.state,
            start_system,
            start_pos,
            goal_system,
            goal_pos,
            speed_mkm_per_day,
            Some(faction_id),
            restrict_to_discovered,
        )
    }

    pub fn logistics_needs_for_faction(&self, faction_id: Id, buffer_days: f64) -> LogisticsNeeds {
        freight_planner::logistics_needs_for_faction(&self.state, &self.content, faction_id, buffer_days)
    }

    pub fn blockade_output_multiplier_for_colony(&self, colony_id: Id) -> f64 {
        blockade_output_multiplier_for_colony(&self.state, &self.content, colony_id)
    }

    pub fn construction_points_per_day(&self, _colony_id: Id) -> f64 {
        self.content.config.construction_points_per_day_per_installation
    }

    pub fn system_sensor_environment_multiplier(&self, system_id: Id) -> f64 {
        system_sensor_environment_multiplier(&self.state, system_id)
    }

    pub fn fleet_for_ship(&self, ship_id: Id) -> Option<&Fleet> {
        self.state.fleets.values().find(|f| f.ship_ids.contains(&ship_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, base_state_with_ship};

    #[test]
    fn issuing_an_order_on_an_unknown_ship_returns_false() {
        let mut sim = Simulation {
            state: base_state_with_ship(),
            content: base_content(),
        };
        assert!(!sim.issue_wait_days(Id(999), 1.0));
    }

    #[test]
    fn issuing_an_order_enqueues_it_for_a_real_ship() {
        let mut sim = Simulation {
            state: base_state_with_ship(),
            content: base_content(),
        };
        let ship_id = *sim.state.ships.keys().next().unwrap();
        assert!(sim.issue_move_to_point(ship_id, (10.0, 0.0)));
        assert_eq!(sim.state.ship_orders[&ship_id].queue.len(), 1);
    }

    #[test]
    fn clear_orders_preserves_repeat_template() {
        let mut sim = Simulation {
            state: base_state_with_ship(),
            content: base_content(),
        };
        let ship_id = *sim.state.ships.keys().next().unwrap();
        sim.issue_wait_days(ship_id, 1.0);
        sim.state.ship_orders.get_mut(&ship_id).unwrap().repeat_template = Some(std::collections::VecDeque::new());
        assert!(sim.clear_orders(ship_id));
        assert!(sim.state.ship_orders[&ship_id].queue.is_empty());
        assert!(sim.state.ship_orders[&ship_id].repeat_template.is_some());
    }

    #[test]
    fn installation_with_no_gating_tech_is_always_buildable() {
        let mut sim = Simulation {
            state: base_state_with_ship(),
            content: base_content(),
        };
        sim.content.installations.insert("mine".to_string(), crate::content::InstallationDef::default());
        assert!(sim.is_installation_buildable_for_faction(Id(1), "mine"));
    }

    #[test]
    fn installation_gated_by_unresearched_tech_is_not_buildable() {
        let mut sim = Simulation {
            state: base_state_with_ship(),
            content: base_content(),
        };
        sim.content.installations.insert("advanced_mine".to_string(), crate::content::InstallationDef::default());
        sim.content.techs.insert(
            "tech_mining_2".to_string(),
            crate::content::TechDef {
                cost_rp: 10.0,
                prereqs: vec![],
                effects: vec![crate::content::TechEffect::UnlockInstallation {
                    installation_id: "advanced_mine".to_string(),
                }],
            },
        );
        sim.state.factions.insert(Id(1), crate::state::Faction { id: Id(1), ..Default::default() });
        assert!(!sim.is_installation_buildable_for_faction(Id(1), "advanced_mine"));

        sim.state.factions.get_mut(&Id(1)).unwrap().known_techs.insert("tech_mining_2".to_string());
        assert!(sim.is_installation_buildable_for_faction(Id(1), "advanced_mine"));
    }

    #[test]
    fn mutual_friendly_requires_both_sides_to_agree() {
        let mut sim = Simulation {
            state: base_state_with_ship(),
            content: base_content(),
        };
        sim.state.factions.insert(Id(1), crate::state::Faction { id: Id(1), ..Default::default() });
        sim.state.factions.insert(Id(2), crate::state::Faction { id: Id(2), ..Default::default() });
        assert!(!sim.are_factions_mutual_friendly(Id(1), Id(2)));
        sim.set_diplomatic_status(Id(1), Id(2), DiplomacyStatus::Friendly, false);
        assert!(!sim.are_factions_mutual_friendly(Id(1), Id(2)));
        sim.set_diplomatic_status(Id(2), Id(1), DiplomacyStatus::Friendly, false);
        assert!(sim.are_factions_mutual_friendly(Id(1), Id(2)));
    }

    #[test]
    fn fleet_for_ship_finds_the_containing_fleet() {
        let mut sim = Simulation {
            state: base_state_with_ship(),
            content: base_content(),
        };
        let ship_id = *sim.state.ships.keys().next().unwrap();
        let fleet_id = sim.state.allocate_id();
        sim.state.fleets.insert(
            fleet_id,
            Fleet {
                id: fleet_id,
                faction_id: Id(1),
                name: "First Fleet".to_string(),
                ship_ids: vec![ship_id],
            },
        );
        assert_eq!(sim.fleet_for_ship(ship_id).map(|f| f.id), Some(fleet_id));
        assert!(sim.fleet_for_ship(Id(999)).is_none());
    }
}
