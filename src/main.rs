use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

mod badge;
mod config;
mod github;
mod handler;
mod http;
mod logger;
mod routing;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // First argument names the config file (extension optional)
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Size the runtime from the workers setting, CPU count otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers.filter(|&w| w > 0) {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let state = Arc::new(config::AppState::new(&cfg)?);
    let active_connections = Arc::new(AtomicUsize::new(0));
    let (shutdown_tx, shutdown_rx) = server::shutdown::channel();

    server::start_signal_handler(shutdown_tx);
    logger::log_server_start(&addr, &cfg);

    server::start_server_loop(
        listener,
        Arc::clone(&state),
        Arc::clone(&active_connections),
        shutdown_rx,
    )
    .await?;

    let grace = Duration::from_secs(std::cmp::max(
        cfg.performance.read_timeout,
        cfg.performance.write_timeout,
    ));
    let remaining = server::drain_connections(&active_connections, grace).await;
    if remaining > 0 {
        logger::log_warning(&format!("Exiting with {remaining} connection(s) open"));
    }

    Ok(())
}
