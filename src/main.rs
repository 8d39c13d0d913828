use clap::Parser;
use std::sync::Arc;

use cachelab::config::{self, AppState, Config, Overrides};
use cachelab::error::StartupError;
use cachelab::strategy::CacheStrategy;
use cachelab::{logger, server};

/// Static file server for comparing HTTP caching strategies
#[derive(Debug, Parser)]
#[command(name = "cachelab", version, about)]
struct Cli {
    /// Configuration file; the extension is optional
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Cache strategy, overriding the configuration
    #[arg(short, long)]
    strategy: Option<CacheStrategy>,

    /// Static root directory, overriding the configuration
    #[arg(short, long)]
    root: Option<String>,

    /// Print the available strategies and exit
    #[arg(long)]
    list_strategies: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = Overrides {
        strategy: cli.strategy.map(|strategy| strategy.name().to_string()),
        root: cli.root,
    };
    let cfg = Config::load_from(&cli.config, &overrides).map_err(StartupError::from)?;

    if cli.list_strategies {
        logger::log_strategy_table(cfg.cache.strategy);
        return Ok(());
    }

    logger::init(&cfg.logging).map_err(StartupError::Logger)?;

    // Build the Tokio runtime, sized by server.workers when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr, cfg.performance.backlog)?;
    let bound = listener.local_addr().unwrap_or(addr);

    let state = Arc::new(AppState::new(cfg));
    if !state.static_root.is_dir() {
        logger::log_warning(&format!(
            "Static root '{}' is not a directory; every request will get the plain 404",
            state.static_root.display()
        ));
    }

    logger::log_server_start(&bound, &state);

    // LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local.run_until(server::run(listener, state)).await;

    logger::log_info("Server stopped");
    Ok(())
}
