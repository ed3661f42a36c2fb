//! Agassi Server Binary
//!
//! Opens the site store and serves it over TCP until interrupted.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use agassi::network::Server;
use agassi::{Config, DataService, StoreType};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// Agassi Server
#[derive(Parser, Debug)]
#[command(name = "agassi-server")]
#[command(about = "Player and coach registry server")]
#[command(version)]
struct Args {
    /// Site name, selects the store file
    #[arg(long, env = "AGASSI_SITE", default_value = "agassi")]
    site: String,

    /// Listen address (host:port)
    #[arg(short, long, env = "AGASSI_LISTEN", default_value = "127.0.0.1:8080")]
    listen: String,

    /// Storage engine type
    #[arg(long, env = "AGASSI_STORE_TYPE", default_value = "redb")]
    store_type: StoreType,

    /// Parent directory for the store files
    #[arg(long, env = "AGASSI_STORE_PATH", default_value = "./var")]
    store_path: String,

    /// Seconds to wait for the store file lock
    #[arg(long, env = "AGASSI_STORE_TIMEOUT", default_value = "30")]
    store_timeout: u64,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Debug logging
    #[arg(long, env = "DEBUG")]
    dbg: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize tracing/logging
    let default_filter = if args.dbg { "debug" } else { "info,agassi=debug" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    tracing::info!("Agassi Server v{}", agassi::VERSION);
    tracing::info!("Site: {}", args.site);
    tracing::info!("Store directory: {}", args.store_path);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .site(&args.site)
        .data_dir(&args.store_path)
        .store_type(args.store_type)
        .open_timeout(Duration::from_secs(args.store_timeout))
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .build();

    let service = match DataService::open(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to set up data store: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Data store initialized successfully");

    let server = Arc::new(Server::new(config, service));

    // Ctrl+C / SIGTERM → graceful shutdown
    let (stop_tx, stop_rx) = crossbeam::channel::bounded::<()>(1);
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    }) {
        tracing::error!("Failed to install signal handler: {}", e);
        std::process::exit(1);
    }

    let watcher = Arc::clone(&server);
    thread::spawn(move || {
        if stop_rx.recv().is_ok() {
            tracing::warn!("Interrupt signal");
            watcher.shutdown();
        }
    });

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Agassi terminated");
}
