use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod models;
mod services;
mod session;
mod utils;

use api::snapshot::SnapshotClient;
use commands::Flow;
use config::AppConfig;
use services::fetch_service::Fetcher;
use session::Session;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    let mut filter = EnvFilter::from_default_env();
    for directive in ["mrnews=debug", "reqwest=warn", "hyper=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("📰 Starting mrnews dashboard...");
    info!("  mrnews v1.1.0 - FX, gold and macro news at a glance");
    info!("");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    // `mrnews fetch` refreshes the snapshot files once and exits
    if std::env::args().nth(1).as_deref() == Some("fetch") {
        let fetcher = match Fetcher::new(&config) {
            Ok(fetcher) => fetcher,
            Err(e) => {
                error!("Cannot fetch: {}", e);
                return;
            }
        };
        let now = chrono::Utc::now();
        match fetcher.run(now.date_naive(), now).await {
            Ok(report) => println!("{}", report.summary()),
            Err(e) => error!("Fetch failed: {}", e),
        }
        return;
    }

    if let Err(e) = tokio::fs::create_dir_all(&config.out_dir).await {
        error!("Failed to create output directory {}: {}", config.out_dir.display(), e);
        return;
    }

    let client = match SnapshotClient::new(&config.data_base, config.http_timeout) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create snapshot client: {}", e);
            return;
        }
    };
    info!("Reading snapshots from {}", config.data_base);

    let (loads_tx, mut loads_rx) = mpsc::unbounded_channel();
    let mut session = Session::new(config, client, loads_tx);
    session.start_load();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Type `help` for commands.");

    loop {
        tokio::select! {
            Some(result) = loads_rx.recv() => {
                match session.apply_load(result) {
                    Ok(true) => print!("{}", session.legends()),
                    Ok(false) => {}
                    Err(e) => {
                        warn!("Load could not be displayed: {}", e);
                        println!("{}", e);
                    }
                }
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if commands::handle_line(&mut session, &line) == Flow::Quit {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!("Failed to read input: {}", e);
                        break;
                    }
                }
            }
        }
    }

    info!("👋 Shutting down");
}
