use urlencoding::encode;

use super::types::{
    route_detail_response::RouteDetailResponse, route_record::RouteRecord,
    stop_record::StopRecord,
};
use crate::utils::pipeline_error::PipelineError;

/// Client for the poatransporte facade. All three operations hit the same
/// `process.php` endpoint and differ only in query parameters.
#[derive(Clone)]
pub struct PoaClient {
    host: String,
    client: reqwest::Client,
}

impl PoaClient {
    pub fn new(host: &str) -> Self {
        PoaClient {
            host: host.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Full stop collection (`a=tp`).
    pub async fn fetch_stops(&self) -> Result<Vec<StopRecord>, PipelineError> {
        let url = format!("{}/php/facades/process.php?a=tp&p=", self.host);
        let stops = self
            .client
            .get(&url)
            .send()
            .await?
            .json::<Vec<StopRecord>>()
            .await?;
        Ok(stops)
    }

    /// Full route summary collection (`a=nc`, `%` wildcard, `t=o` for buses).
    pub async fn fetch_routes(&self) -> Result<Vec<RouteRecord>, PipelineError> {
        let url = format!(
            "{}/php/facades/process.php?a=nc&p={}&t=o",
            self.host,
            encode("%")
        );
        let routes = self
            .client
            .get(&url)
            .send()
            .await?
            .json::<Vec<RouteRecord>>()
            .await?;
        Ok(routes)
    }

    /// Ordered path for one route (`a=il`), as `[longitude, latitude]` pairs.
    pub async fn fetch_route_detail(&self, route_id: &str) -> Result<Vec<[f64; 2]>, PipelineError> {
        let url = format!(
            "{}/php/facades/process.php?a=il&p={}",
            self.host,
            encode(route_id)
        );
        let detail = self
            .client
            .get(&url)
            .send()
            .await?
            .json::<RouteDetailResponse>()
            .await?;
        detail.path()
    }
}
