mod config;
mod handler;
mod http;
mod logger;
mod relay;
mod server;

use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional config file path (without extension), defaults to ./config.toml
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Create Tokio runtime, thread count from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("[Config] Using {workers} worker threads"));
    } else {
        logger::log_info("[Config] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let client = reqwest::Client::builder()
        .user_agent(cfg.http.server_name.as_str())
        .build()?;
    let state = Arc::new(config::AppState::new(&cfg, client));

    logger::log_server_start(&addr, &cfg);
    logger::log_relay_settings(&cfg);

    server::run_server(listener, state, server::shutdown_signal()).await;
    Ok(())
}
