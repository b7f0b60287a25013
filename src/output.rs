use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::services::poa_client::types::route_record::RouteRecord;
use crate::types::{route::Route, stop::Stop};
use crate::utils::pipeline_error::PipelineError;

/// Elevation distance between adjacent levels, in renderer units.
const LEVEL_ELEVATION_STEP: f64 = 100.0;

/// Drop routes nobody uses: still on the base level and listed by no stop.
/// Routes that legitimately earned level 0 at real stops are always listed
/// by at least one of them and stay. The predicate only reads final levels
/// and the stop membership lists, so re-applying it is a no-op.
pub fn filter_routes(routes: Vec<Route>, stops: &[Stop]) -> Vec<Route> {
    routes
        .into_iter()
        .filter(|route| {
            route.level != 0
                || stops.iter().any(|stop| {
                    stop.record
                        .linhas
                        .iter()
                        .any(|linha| linha.idLinha == route.record.id)
                })
        })
        .collect()
}

/// A route as serialized: its original summary fields, the assigned level,
/// and the path extended to `[lon, lat, elevation]`. Base-level routes get
/// a negative elevation and sit below the ground plane.
#[derive(Serialize)]
struct RouteArtifact<'a> {
    #[serde(flatten)]
    record: &'a RouteRecord,
    level: u32,
    path: Vec<[f64; 3]>,
}

impl<'a> RouteArtifact<'a> {
    fn new(route: &'a Route) -> Self {
        let elevation = (f64::from(route.level) - 1.0) * LEVEL_ELEVATION_STEP;
        RouteArtifact {
            record: &route.record,
            level: route.level,
            path: route
                .path
                .iter()
                .map(|&[lon, lat]| [lon, lat, elevation])
                .collect(),
        }
    }
}

/// Write all six artifacts: stops, routes, and the stop→level lookup, each
/// pretty-printed and minified. Called only once the whole pipeline has
/// succeeded, so a failed run never leaves partial files behind.
pub fn write_artifacts(
    data_dir: &Path,
    stops: &[Stop],
    routes: &[Route],
) -> Result<(), PipelineError> {
    fs::create_dir_all(data_dir)?;

    let route_artifacts: Vec<RouteArtifact> = routes.iter().map(RouteArtifact::new).collect();
    let levels: BTreeMap<&str, u32> = stops
        .iter()
        .map(|stop| (stop.record.codigo.as_str(), stop.level))
        .collect();

    write_pair(data_dir, "stops", &stops)?;
    write_pair(data_dir, "routes", &route_artifacts)?;
    write_pair(data_dir, "levels", &levels)?;
    Ok(())
}

/// One pretty file for diffing, one minified for serving.
fn write_pair<T: Serialize>(data_dir: &Path, name: &str, value: &T) -> Result<(), PipelineError> {
    let pretty = serde_json::to_string_pretty(value)?;
    fs::write(data_dir.join(format!("{name}.json")), pretty)?;

    let minified = serde_json::to_string(value)?;
    fs::write(data_dir.join(format!("{name}.min.json")), minified)?;

    info!("Wrote {name}.json and {name}.min.json");
    Ok(())
}
