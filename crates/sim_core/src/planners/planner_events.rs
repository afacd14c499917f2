//! Aggregates forecast items from the other planners into one time-ordered
//! timeline. This is a distinct, never-persisted event channel: nothing
//! here ever lands in `GameState::events`.

use crate::id::Id;
use crate::planners::colony_schedule::{ColonyScheduleItem, ColonyScheduleKind};
use crate::planners::research_schedule::ResearchScheduleItem;
use crate::planners::PlannerStatus;
use crate::state::GameState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerEventsOptions {
    pub max_items: usize,
}

impl Default for PlannerEventsOptions {
    fn default() -> Self {
        PlannerEventsOptions { max_items: 128 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlannerEventLevel {
    Info,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerEvent {
    pub day: i64,
    pub hour: u8,
    pub level: PlannerEventLevel,
    pub category: String,
    pub title: String,
    pub ship_id: Option<Id>,
    pub colony_id: Option<Id>,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerEventsResult {
    pub status: PlannerStatus,
    pub events: Vec<PlannerEvent>,
}

fn absolute_time(state: &GameState, relative_days: f64) -> (i64, u8) {
    let total_hours = (state.date.days_since_epoch() as f64 + f64::from(state.hour_of_day) / 24.0 + relative_days) * 24.0;
    let day = (total_hours / 24.0).floor() as i64;
    let hour = (total_hours - (day as f64) * 24.0).round().clamp(0.0, 23.0) as u8;
    (day, hour)
}

fn from_research(state: &GameState, faction_id: Id, items: &[ResearchScheduleItem]) -> Vec<PlannerEvent> {
    items
        .iter()
        .map(|item| {
            let (day, hour) = absolute_time(state, f64::from(item.end_day));
            PlannerEvent {
                day,
                hour,
                level: PlannerEventLevel::Info,
                category: "research".to_string(),
                title: format!("{} completes", item.tech_id),
                ship_id: None,
                colony_id: None,
                detail: format!("faction {faction_id} tech {}", item.tech_id),
            }
        })
        .collect()
}

fn from_colony(state: &GameState, colony_id: Id, items: &[ColonyScheduleItem]) -> Vec<PlannerEvent> {
    items
        .iter()
        .map(|item| {
            let (day, hour) = absolute_time(state, f64::from(item.day));
            let (title, detail) = match &item.kind {
                ColonyScheduleKind::ShipyardComplete { design_id, refit_ship_id } => (
                    "shipyard order complete".to_string(),
                    format!("design={design_id:?} refit={refit_ship_id:?}"),
                ),
                ColonyScheduleKind::ConstructionComplete { installation_id, auto_queued } => (
                    format!("{installation_id} construction complete"),
                    format!("auto_queued={auto_queued}"),
                ),
            };
            PlannerEvent {
                day,
                hour,
                level: PlannerEventLevel::Info,
                category: "colony".to_string(),
                title,
                ship_id: None,
                colony_id: Some(colony_id),
                detail,
            }
        })
        .collect()
}

/// Merges pre-computed research and colony forecast items into one
/// absolute-time-sorted timeline, truncated to `max_items`.
pub fn aggregate(
    state: &GameState,
    research: &[(Id, Vec<ResearchScheduleItem>)],
    colonies: &[(Id, Vec<ColonyScheduleItem>)],
    options: &PlannerEventsOptions,
) -> PlannerEventsResult {
    let mut events = Vec::new();
    for (faction_id, items) in research {
        events.extend(from_research(state, *faction_id, items));
    }
    for (colony_id, items) in colonies {
        events.extend(from_colony(state, *colony_id, items));
    }

    events.sort_by(|a, b| {
        (a.day, a.hour)
            .cmp(&(b.day, b.hour))
            .then(a.category.cmp(&b.category))
            .then(b.level.cmp(&a.level))
            .then(a.title.cmp(&b.title))
            .then(a.ship_id.cmp(&b.ship_id))
            .then(a.colony_id.cmp(&b.colony_id))
            .then(a.detail.cmp(&b.detail))
    });

    let mut status = PlannerStatus::ok();
    if events.len() > options.max_items {
        events.truncate(options.max_items);
        status.mark_truncated("max_items reached");
    }

    PlannerEventsResult { status, events }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GameState;

    #[test]
    fn merges_and_sorts_by_absolute_time() {
        let state = GameState::new(1);
        let research = vec![(
            Id(1),
            vec![ResearchScheduleItem {
                tech_id: "tech_a".to_string(),
                start_day: 5,
                end_day: 5,
                cost_rp: 10.0,
                progress_at_start: 0.0,
                was_active_at_start: true,
            }],
        )];
        let colonies = vec![(
            Id(2),
            vec![ColonyScheduleItem {
                day: 2,
                kind: ColonyScheduleKind::ConstructionComplete {
                    installation_id: "mine".to_string(),
                    auto_queued: false,
                },
            }],
        )];

        let result = aggregate(&state, &research, &colonies, &PlannerEventsOptions::default());
        assert_eq!(result.events.len(), 2);
        assert_eq!(result.events[0].day, 2);
        assert_eq!(result.events[1].day, 5);
    }
}
