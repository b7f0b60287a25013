use std::collections::BTreeSet;

use crate::services::poa_client::types::route_record::RouteRecord;

/// A route being prepared: the upstream summary record, the fetched path,
/// the stop set derived from the stops' membership lists (the stops are the
/// authoritative side), and the render level assigned exactly once by the
/// coloring pass.
#[derive(Clone, Debug)]
pub struct Route {
    pub record: RouteRecord,
    pub path: Vec<[f64; 2]>,
    pub stops: BTreeSet<String>,
    pub level: u32,
}
