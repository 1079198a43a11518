use std::sync::Arc;

use pushmetrics::config::{load_config_from, print_schema, DEFAULT_CONFIG_PATH};
use pushmetrics::startup::run;
use pushmetrics::utils::logger::init_logging;
use tracing::error;

// -- Entrypoint

#[tokio::main]
async fn main() {
    let arg = std::env::args().nth(1);

    if arg.as_deref() == Some("--print-schema") {
        if let Err(e) = print_schema() {
            eprintln!("Error printing schema: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let path = arg.unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = match load_config_from(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration from {}: {}", path, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error initializing logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(Arc::new(config)).await {
        error!("Fatal: {}", e);
        std::process::exit(1);
    }
}
