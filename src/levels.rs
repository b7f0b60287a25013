use std::collections::{BTreeSet, HashMap};

use crate::types::route::Route;

/// Levels already claimed at each stop, keyed by stop `codigo`. Owned by a
/// single pipeline run and rebuilt from scratch every time.
pub type UsedLevels = HashMap<String, BTreeSet<u32>>;

/// Greedy first-fit coloring in catalogue order: each route takes the
/// smallest level not yet claimed on any stop it serves, then claims that
/// level on all of them. Two routes sharing a stop therefore never end up
/// on the same level; the exact numbers depend on route iteration order.
pub fn assign_route_levels(routes: &mut [Route], used_levels: &mut UsedLevels) {
    for route in routes.iter_mut() {
        let mut level = 0;
        while route.stops.iter().any(|stop_id| {
            used_levels
                .get(stop_id)
                .is_some_and(|levels| levels.contains(&level))
        }) {
            level += 1;
        }
        route.level = level;

        for stop_id in &route.stops {
            used_levels
                .entry(stop_id.clone())
                .or_default()
                .insert(level);
        }
    }
}

/// A stop renders at the highest level any of its routes claimed, or 0 when
/// nothing serves it.
pub fn stop_level(used_levels: &UsedLevels, stop_id: &str) -> u32 {
    used_levels
        .get(stop_id)
        .and_then(|levels| levels.iter().next_back())
        .copied()
        .unwrap_or(0)
}
