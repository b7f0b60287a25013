use std::collections::BTreeSet;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::geometry;
use crate::indexing;
use crate::levels::{self, UsedLevels};
use crate::output;
use crate::services::poa_client::poa_service::PoaClient;
use crate::types::{route::Route, stop::Stop};
use crate::utils::pipeline_error::PipelineError;
use crate::utils::task_queue::{QueueLimits, TaskQueue};

/// Runs the whole preparation pipeline against `host` and writes the
/// artifacts into `data_dir`. Fail-fast: the first error aborts the run
/// before anything is written.
pub async fn run(host: &str, data_dir: &Path) -> Result<(), PipelineError> {
    let client = PoaClient::new(host);

    let (stop_records, route_records) =
        tokio::try_join!(client.fetch_stops(), client.fetch_routes())?;
    info!(
        "Fetched {} stops and {} routes",
        stop_records.len(),
        route_records.len()
    );

    let mut stops = Vec::with_capacity(stop_records.len());
    for record in stop_records {
        let (longitude, latitude) = record.coordinate()?;
        let contour = geometry::stop_contour(longitude, latitude);
        stops.push(Stop {
            record,
            contour,
            level: 0,
        });
    }
    info!("Computed stop contours");

    let progress = ProgressBar::new(route_records.len() as u64).with_style(
        ProgressStyle::with_template(
            "Route paths: [{bar:40}] {percent}% | ETA: {eta} | {pos}/{len}",
        )
        .unwrap()
        .progress_chars("█░"),
    );
    let mut queue = TaskQueue::new(QueueLimits::default(), progress.clone());
    for record in &route_records {
        let client = client.clone();
        let route_id = record.id.clone();
        queue.submit(async move { client.fetch_route_detail(&route_id).await });
    }
    let paths = queue.drain().await;
    progress.finish_and_clear();

    let mut routes = Vec::with_capacity(route_records.len());
    for (record, path) in route_records.into_iter().zip(paths) {
        routes.push(Route {
            record,
            path: path?,
            stops: BTreeSet::new(),
            level: 0,
        });
    }
    info!("Fetched route paths");

    indexing::link_stops_to_routes(&stops, &mut routes);
    info!("Linked stops to routes");

    let mut used_levels = UsedLevels::new();
    levels::assign_route_levels(&mut routes, &mut used_levels);
    for stop in &mut stops {
        stop.level = levels::stop_level(&used_levels, &stop.record.codigo);
    }
    info!("Assigned route levels");

    let routes = output::filter_routes(routes, &stops);
    output::write_artifacts(data_dir, &stops, &routes)?;

    let max_level = stops.iter().map(|stop| stop.level).max().unwrap_or(0);
    info!("Max level: {max_level}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use std::path::PathBuf;
    use tracing_test::traced_test;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("busmap-pipeline-{name}-{}", std::process::id()))
    }

    async fn mock_catalogue(
        server: &mut ServerGuard,
        stops_body: &str,
        routes_body: &str,
    ) -> (mockito::Mock, mockito::Mock) {
        let stops = server
            .mock("GET", "/php/facades/process.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("a".into(), "tp".into()),
                Matcher::UrlEncoded("p".into(), "".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(stops_body)
            .create_async()
            .await;
        let routes = server
            .mock("GET", "/php/facades/process.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("a".into(), "nc".into()),
                Matcher::UrlEncoded("p".into(), "%".into()),
                Matcher::UrlEncoded("t".into(), "o".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(routes_body)
            .create_async()
            .await;
        (stops, routes)
    }

    async fn mock_detail(server: &mut ServerGuard, route_id: &str, body: &str) -> mockito::Mock {
        server
            .mock("GET", "/php/facades/process.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("a".into(), "il".into()),
                Matcher::UrlEncoded("p".into(), route_id.into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    // Three stops and three routes forming a triangle of conflicts, plus a
    // fourth route no stop lists: route 10 serves {100, 200}, route 20
    // serves {200, 300}, route 30 serves {100, 300}.
    const STOPS: &str = r#"[
        {"codigo":"100","latitude":"-30.01","longitude":"-51.01","linhas":[{"idLinha":"10"},{"idLinha":"30"}]},
        {"codigo":"200","latitude":"-30.02","longitude":"-51.02","linhas":[{"idLinha":"10"},{"idLinha":"20"}]},
        {"codigo":"300","latitude":"-30.03","longitude":"-51.03","linhas":[{"idLinha":"20"},{"idLinha":"30"}]}
    ]"#;
    const ROUTES: &str = r#"[
        {"id":"10","codigo":"10-1","nome":"NORTE"},
        {"id":"20","codigo":"20-1","nome":"SUL"},
        {"id":"30","codigo":"30-1","nome":"LESTE"},
        {"id":"40","codigo":"40-1","nome":"FANTASMA"}
    ]"#;

    #[tokio::test]
    #[traced_test]
    async fn end_to_end_run_writes_all_artifacts() {
        let mut server = Server::new_async().await;
        let _catalogue = mock_catalogue(&mut server, STOPS, ROUTES).await;
        let mut _details = Vec::new();
        for id in ["10", "20", "30", "40"] {
            _details.push(
                mock_detail(
                    &mut server,
                    id,
                    r#"{"idlinha":"x","0":{"lat":"-30.0","lng":"-51.0"},"1":{"lat":"-30.1","lng":"-51.1"}}"#,
                )
                .await,
            );
        }

        let data_dir = temp_dir("ok");
        run(server.url().as_str(), &data_dir).await.unwrap();

        for name in [
            "stops.json",
            "stops.min.json",
            "routes.json",
            "routes.min.json",
            "levels.json",
            "levels.min.json",
        ] {
            assert!(data_dir.join(name).exists(), "{name} missing");
        }

        let routes: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(data_dir.join("routes.min.json")).unwrap(),
        )
        .unwrap();
        let routes = routes.as_array().unwrap();

        // Route 40 is on the base level and listed by no stop: dropped.
        assert_eq!(routes.len(), 3);
        assert_eq!(routes[0]["id"], "10");
        assert_eq!(routes[0]["level"], 0);
        assert_eq!(routes[1]["id"], "20");
        assert_eq!(routes[1]["level"], 1);
        assert_eq!(routes[2]["id"], "30");
        assert_eq!(routes[2]["level"], 2);

        // Elevation is (level - 1) * 100 on every path vertex.
        assert_eq!(routes[0]["path"][0][2], -100.0);
        assert_eq!(routes[1]["path"][0][2], 0.0);
        assert_eq!(routes[2]["path"][1][2], 100.0);

        let levels: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(data_dir.join("levels.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(levels["100"], 2);
        assert_eq!(levels["200"], 1);
        assert_eq!(levels["300"], 2);

        let stops: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(data_dir.join("stops.min.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(stops[0]["codigo"], "100");
        assert_eq!(stops[0]["level"], 2);
        assert_eq!(stops[0]["contour"].as_array().unwrap().len(), 13);
        // Original membership list survives serialization.
        assert_eq!(stops[0]["linhas"][0]["idLinha"], "10");

        assert!(logs_contain("Assigned route levels"));
        assert!(logs_contain("Max level: 2"));

        let _ = std::fs::remove_dir_all(&data_dir);
    }

    #[tokio::test]
    async fn a_malformed_route_detail_aborts_without_artifacts() {
        let mut server = Server::new_async().await;
        let _catalogue = mock_catalogue(&mut server, STOPS, ROUTES).await;
        let mut _details = Vec::new();
        for id in ["10", "20", "30"] {
            _details.push(
                mock_detail(&mut server, id, r#"{"0":{"lat":"-30.0","lng":"-51.0"}}"#).await,
            );
        }
        _details.push(mock_detail(&mut server, "40", "<html>maintenance</html>").await);

        let data_dir = temp_dir("fail");
        let err = run(server.url().as_str(), &data_dir).await.unwrap_err();

        assert!(matches!(err, PipelineError::Decode(_)));
        assert!(!data_dir.exists());
    }

    #[tokio::test]
    async fn a_non_numeric_stop_coordinate_aborts_the_run() {
        let mut server = Server::new_async().await;
        let _catalogue = mock_catalogue(
            &mut server,
            r#"[{"codigo":"100","latitude":"abc","longitude":"-51.0","linhas":[]}]"#,
            r#"[]"#,
        )
        .await;

        let data_dir = temp_dir("coordinate");
        let err = run(server.url().as_str(), &data_dir).await.unwrap_err();

        assert!(matches!(err, PipelineError::Coordinate(_)));
        assert!(!data_dir.exists());
    }
}
