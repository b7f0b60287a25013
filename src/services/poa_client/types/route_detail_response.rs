use serde::Deserialize;
use serde_json::{Map, Value};

use crate::utils::pipeline_error::PipelineError;

/// The detail endpoint returns a single object mixing metadata fields
/// (`idlinha`, `nome`, ...) with the path vertices keyed by stringified
/// indices: `"0": {"lat": ..., "lng": ...}, "1": ...`. Only the
/// numeric-keyed entries belong to the path.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct RouteDetailResponse(pub Map<String, Value>);

impl RouteDetailResponse {
    /// The ordered path as `[longitude, latitude]` pairs, sorted by the
    /// numeric value of the vertex keys.
    pub fn path(&self) -> Result<Vec<[f64; 2]>, PipelineError> {
        let mut vertices: Vec<(u32, &Value)> = self
            .0
            .iter()
            .filter_map(|(key, value)| key.parse::<u32>().ok().map(|index| (index, value)))
            .collect();
        vertices.sort_by_key(|(index, _)| *index);

        vertices
            .into_iter()
            .map(|(index, vertex)| {
                let lat = coordinate_field(vertex, "lat", index)?;
                let lng = coordinate_field(vertex, "lng", index)?;
                Ok([lng, lat])
            })
            .collect()
    }
}

fn coordinate_field(vertex: &Value, key: &str, index: u32) -> Result<f64, PipelineError> {
    match vertex.get(key) {
        Some(Value::String(raw)) => raw.trim().parse::<f64>().map_err(|_| {
            PipelineError::Coordinate(format!(
                "path vertex {index}: {key} {raw:?} is not numeric"
            ))
        }),
        Some(Value::Number(number)) => number.as_f64().ok_or_else(|| {
            PipelineError::Coordinate(format!("path vertex {index}: {key} out of range"))
        }),
        _ => Err(PipelineError::Coordinate(format!(
            "path vertex {index}: missing {key}"
        ))),
    }
}
