use std::collections::HashMap;

use crate::types::{route::Route, stop::Stop};

/// Fill each route's stop set from the stops' declared memberships. The
/// stops' `linhas` lists are the authoritative side of the relation; entries
/// pointing at routes absent from the catalogue are stale and ignored.
/// The index is rebuilt from scratch on every run.
pub fn link_stops_to_routes(stops: &[Stop], routes: &mut [Route]) {
    let index_by_id: HashMap<String, usize> = routes
        .iter()
        .enumerate()
        .map(|(index, route)| (route.record.id.clone(), index))
        .collect();

    for stop in stops {
        for linha in &stop.record.linhas {
            if let Some(&index) = index_by_id.get(linha.idLinha.as_str()) {
                routes[index].stops.insert(stop.record.codigo.clone());
            }
        }
    }
}
