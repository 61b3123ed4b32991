use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use sauceqa_common::{init_logging, initialize, Config};
use sauceqa_web::{DashboardState, RunnerCommand};

#[derive(Parser, Debug)]
#[command(name = "sauceqa-dashboard")]
#[command(about = "Local dashboard for SauceQA test runs and reports")]
struct Args {
    /// Bind host (default from config)
    #[arg(long, env = "SAUCEQA_DASHBOARD_HOST")]
    host: Option<String>,

    /// Bind port (default from config)
    #[arg(long, env = "SAUCEQA_DASHBOARD_PORT")]
    port: Option<u16>,

    /// Configuration file (TOML)
    #[arg(short, long, env = "SAUCEQA_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.dashboard.host = host;
    }
    if let Some(port) = args.port {
        config.dashboard.port = port;
    }

    let paths = config.paths();
    initialize(&paths)?;
    let _log_guard = init_logging(&paths, false)?;

    let (host, port) = (config.dashboard.host.clone(), config.dashboard.port);
    let listener = match tokio::net::TcpListener::bind((host.as_str(), port)).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!(
                "Cannot start dashboard on {}:{}: {}. Is the port already in use?",
                host, port, e
            );
            std::process::exit(1);
        }
    };

    info!("Starting SauceQA dashboard on {}", config.dashboard.url());
    // runs start in base_dir, so hand them an absolute config path
    let config_file = args
        .config
        .as_deref()
        .map(|p| p.canonicalize().unwrap_or_else(|_| p.to_path_buf()));
    let runner = RunnerCommand::locate(&paths.base_dir, config_file.as_deref());
    info!("Runner: {}", runner.program.display());

    let state = Arc::new(DashboardState::new(config, runner));
    sauceqa_web::serve(listener, state).await
}
