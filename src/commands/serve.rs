//! Serve command - Starts the HTTP server.

use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::AppResult;
use crate::server::{shutdown_signal, ServerProcess};

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    let config = apply_overrides(args, config);

    ServerProcess::new(config).run(shutdown_signal()).await
}

fn apply_overrides(args: ServeArgs, mut config: Config) -> Config {
    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }
    config
}
