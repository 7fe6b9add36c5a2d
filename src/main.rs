use std::sync::Arc;
use tokio::sync::Notify;

mod config;
mod data;
mod error;
mod handler;
mod http;
mod logger;
mod render;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional first argument: config file path without extension
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Size the Tokio runtime from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let font = render::register_chart_font(cfg.chart.font_path.as_deref());
    logger::log_server_start(&addr, &cfg, font.as_deref());

    let state = Arc::new(config::AppState::new(cfg, font.is_some()));
    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    server::start_server_loop(listener, state, shutdown).await;
    Ok(())
}
