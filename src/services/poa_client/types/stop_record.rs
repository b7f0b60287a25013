#![allow(non_snake_case)]
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::pipeline_error::PipelineError;

/// One entry of a stop's route membership list.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StopRecordLinha {
    pub idLinha: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A raw stop as returned by the upstream facade. Coordinates arrive as
/// decimal strings; fields we do not model are carried through untouched so
/// they survive into the serialized artifacts.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StopRecord {
    pub codigo: String,
    pub latitude: String,
    pub longitude: String,
    #[serde(default)]
    pub linhas: Vec<StopRecordLinha>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StopRecord {
    /// Parsed (longitude, latitude) pair.
    pub fn coordinate(&self) -> Result<(f64, f64), PipelineError> {
        let longitude = self.longitude.trim().parse::<f64>().map_err(|_| {
            PipelineError::Coordinate(format!(
                "stop {}: longitude {:?} is not numeric",
                self.codigo, self.longitude
            ))
        })?;
        let latitude = self.latitude.trim().parse::<f64>().map_err(|_| {
            PipelineError::Coordinate(format!(
                "stop {}: latitude {:?} is not numeric",
                self.codigo, self.latitude
            ))
        })?;
        Ok((longitude, latitude))
    }
}
