//! Shortest-ETA routing over the jump-point graph (§4.4). Nodes are star
//! systems; edges are jump-point pairs. Used both by the order execution
//! engine (auto-inserting `TravelViaJump` hops) and by planners.

use crate::id::Id;
use crate::state::GameState;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct RouteHop {
    pub jump_point_id: Id,
    pub destination_system_id: Id,
    pub eta_days: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub total_eta_days: f64,
    pub hops: Vec<RouteHop>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SearchNode {
    cost: f64,
    system_id: Id,
}

impl Eq for SearchNode {}
impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap via BinaryHeap (which is max-heap by default).
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.system_id.cmp(&other.system_id))
    }
}

fn distance_mkm(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Dijkstra over the (system, jump-point) graph. `start_pos`/`goal_pos` are
/// used only to account for the intra-system leg to/from the nearest jump
/// point; the search itself operates on whole systems as nodes.
///
/// When `faction_id` is `Some` and `restrict_to_discovered` is true, only
/// systems in that faction's `discovered_systems` are traversable (the start
/// and goal systems are always allowed even if undiscovered, matching the
/// intuition that a planner always knows where it currently is and where it
/// is trying to go).
pub fn plan_route(
    state: &GameState,
    start_system: Id,
    start_pos: (f64, f64),
    goal_system: Id,
    goal_pos: (f64, f64),
    speed_mkm_per_day: f64,
    faction_id: Option<Id>,
    restrict_to_discovered: bool,
) -> Option<Route> {
    if start_system == goal_system {
        return Some(Route {
            total_eta_days: distance_mkm(start_pos, goal_pos) / speed_mkm_per_day.max(1e-9),
            hops: Vec::new(),
        });
    }
    if speed_mkm_per_day <= 0.0 {
        return None;
    }

    let discovered = faction_id.and_then(|fid| state.factions.get(&fid)).map(|f| &f.discovered_systems);
    let allowed = |system_id: Id| -> bool {
        if !restrict_to_discovered {
            return true;
        }
        system_id == start_system
            || system_id == goal_system
            || discovered.map_or(true, |d| d.contains(&system_id))
    };

    let mut dist: HashMap<Id, f64> = HashMap::new();
    let mut prev: HashMap<Id, (Id, Id, f64)> = HashMap::new(); // system -> (via_jump_point, from_system, hop_eta)
    let mut heap = BinaryHeap::new();

    dist.insert(start_system, 0.0);
    heap.push(SearchNode {
        cost: 0.0,
        system_id: start_system,
    });

    while let Some(SearchNode { cost, system_id }) = heap.pop() {
        if cost > *dist.get(&system_id).unwrap_or(&f64::INFINITY) {
            continue;
        }
        if system_id == goal_system {
            break;
        }
        let Some(system) = state.systems.get(&system_id) else {
            continue;
        };
        for jp_id in &system.jump_point_ids {
            let Some(jp) = state.jump_points.get(jp_id) else {
                continue;
            };
            let Some(linked_id) = jp.linked_jump_id else {
                continue;
            };
            let Some(linked) = state.jump_points.get(&linked_id) else {
                continue;
            };
            let dest_system = linked.system_id;
            if !allowed(dest_system) {
                continue;
            }
            let origin_pos = if system_id == start_system { start_pos } else { system.galaxy_position };
            let intra_system_mkm = distance_mkm(origin_pos, jp.position_mkm);
            let hop_eta = intra_system_mkm / speed_mkm_per_day;
            let next_cost = cost + hop_eta;
            if next_cost < *dist.get(&dest_system).unwrap_or(&f64::INFINITY) {
                dist.insert(dest_system, next_cost);
                prev.insert(dest_system, (*jp_id, system_id, hop_eta));
                heap.push(SearchNode {
                    cost: next_cost,
                    system_id: dest_system,
                });
            }
        }
    }

    if !dist.contains_key(&goal_system) {
        return None;
    }

    let mut hops = Vec::new();
    let mut cur = goal_system;
    while let Some(&(jp_id, from_system, hop_eta)) = prev.get(&cur) {
        hops.push(RouteHop {
            jump_point_id: jp_id,
            destination_system_id: cur,
            eta_days: hop_eta,
        });
        cur = from_system;
        if cur == start_system {
            break;
        }
    }
    hops.reverse();

    let last_system_pos = state.jump_points.get(&hops.last()?.jump_point_id).and_then(|jp| {
        jp.linked_jump_id.and_then(|l| state.jump_points.get(&l)).map(|l| l.position_mkm)
    });
    let final_leg = last_system_pos.map_or(0.0, |p| distance_mkm(p, goal_pos) / speed_mkm_per_day);

    Some(Route {
        total_eta_days: dist[&goal_system] + final_leg,
        hops,
    })
}
