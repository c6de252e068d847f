//! AttSync daemon - Main entry point

use attsync::api::{endpoints, ApiClient, Transport};
use attsync::store::PunchStore;
use attsync::{Cli, Config, SyncEngine};
use clap::Parser;
use colored::Colorize;
use std::process;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration first: the log level lives in it
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    // The daemon still runs if logging cannot be set up
    let _guard = match attsync_common::init_logging(&config.log_config()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to setup logging: {}", e);
            None
        }
    };

    info!("Configuration loaded successfully");
    info!(school = %config.school.name, "School");
    info!(host = %config.database.host, port = config.database.port, "Database");

    if cli.test_connection {
        test_connection(&config).await;
        return;
    }

    if cli.test_api {
        test_api(&config).await;
        return;
    }

    if let Err(e) = run_daemon(config).await {
        error!(error = %e, "Application startup failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Run the continuous sync loop until a shutdown signal arrives.
async fn run_daemon(config: Config) -> attsync::Result<()> {
    let transport = ApiClient::new(config.api_timeout())?;
    let interval = config.sleep_interval();
    let school = config.school.name.clone();

    let engine = SyncEngine::new(config, transport);

    info!(school = %school, "AttSync started");
    attsync::scheduler::run(&engine, interval).await;

    Ok(())
}

/// Open a database session, ping it, and report the outcome.
async fn test_connection(config: &Config) {
    println!("Testing database connection...");

    match PunchStore::connect(&config.database).await {
        Ok(mut store) => {
            match store.ping().await {
                Ok(()) => println!("{} Database connection successful", "✓".green()),
                Err(e) => println!("{} Database ping failed: {}", "✗".red(), e),
            }
            if let Err(e) = store.close().await {
                warn!(error = %e, "Error closing database connection");
            }
        }
        Err(e) => println!("{} Database connection failed: {}", "✗".red(), e),
    }
}

/// Send the probe request and print whatever came back.
async fn test_api(config: &Config) {
    println!("Testing API connectivity...");

    let client = match ApiClient::new(config.api_timeout()) {
        Ok(client) => client,
        Err(e) => {
            println!("{} API test failed: {}", "✗".red(), e);
            return;
        }
    };

    let url = endpoints::probe_url(&config.api.primary_url, &config.school.code);
    let reply = client.send(&url).await;

    println!("{} API test completed. Response: {}", "✓".green(), reply);
}
