use serde::Serialize;

use crate::services::poa_client::types::stop_record::StopRecord;

/// A stop enriched for rendering: the raw upstream record (all of its
/// fields pass through to the artifact), the contour polygon around its
/// coordinate, and the level derived once every route is assigned.
#[derive(Clone, Debug, Serialize)]
pub struct Stop {
    #[serde(flatten)]
    pub record: StopRecord,
    pub contour: Vec<[f64; 2]>,
    pub level: u32,
}
