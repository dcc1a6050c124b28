//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// Todo API - user and todo service over PostgreSQL
#[derive(Parser, Debug)]
#[command(name = "todo-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Create the store tables, then exit
    Provision,
}

/// Arguments for the serve command. Unset values fall back to the environment.
#[derive(Parser, Debug, Default)]
pub struct ServeArgs {
    /// Host to bind to (overrides SERVER_HOST)
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on (overrides SERVER_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from(["todo-api", "-v", "serve", "--port", "8080"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(8080));
                assert!(args.host.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_provision() {
        let cli = Cli::parse_from(["todo-api", "provision"]);
        assert!(matches!(cli.command, Commands::Provision));
        assert!(!cli.verbose);
    }
}
