use std::sync::Arc;

use tokio::sync::Notify;

use petronox_server::config::{self, AppState, Config};
use petronox_server::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path_from_args();

    // Startup errors are reported before anything is bound
    let (cfg, addr) = match Config::load_from(&config_path).and_then(|cfg| {
        let addr = cfg.validate()?;
        Ok((cfg, addr))
    }) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("[FATAL] {e}");
            std::process::exit(1);
        }
    };

    // Create the Tokio runtime, sizing the worker pool from config when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, addr))
}

/// `--config <path>` selects the config file (without extension)
fn config_path_from_args() -> String {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return path;
            }
        } else if let Some(path) = arg.strip_prefix("--config=") {
            return path.to_string();
        }
    }
    config::DEFAULT_CONFIG_PATH.to_string()
}

async fn async_main(
    cfg: Config,
    addr: std::net::SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    logger::init(&cfg)?;

    let listener = server::create_listener(addr)?;
    logger::log_server_start(&listener.local_addr()?, &cfg);

    let state = Arc::new(AppState::new(cfg));
    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown));

    server::start_server_loop(listener, state, shutdown).await;
    Ok(())
}
