mod geometry;
mod indexing;
mod levels;
mod output;
mod pipeline;
mod services;
mod types;
mod utils;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};

// stops: https://www.poatransporte.com.br/php/facades/process.php?a=tp&p=
// routes: https://www.poatransporte.com.br/php/facades/process.php?a=nc&p=%&t=o
// route path: https://www.poatransporte.com.br/php/facades/process.php?a=il&p={ID}
const DEFAULT_HOST: &str = "https://www.poatransporte.com.br";
const DEFAULT_DATA_DIR: &str = "data";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    info!("Starting transit data preparation...");

    let host = env::var("POA_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let data_dir = env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));

    match pipeline::run(&host, &data_dir).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Pipeline failed: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
