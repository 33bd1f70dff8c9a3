use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tfstate",
    about = "In-memory Terraform HTTP remote-state backend",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file; flags override its values
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the backend server
    Serve(Overrides),
    /// Print the effective configuration as TOML
    Config(Overrides),
}

#[derive(Args)]
pub struct Overrides {
    /// Address to listen on
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Refuse state writes that do not carry the held lock's ID
    #[arg(long)]
    pub require_lock: bool,
    /// Maximum accepted request body, in bytes
    #[arg(long)]
    pub max_body_bytes: Option<usize>,
    /// Refuse state uploads that are not valid JSON
    #[arg(long)]
    pub reject_invalid_state: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub log_format: Option<LogFormatArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from(["tfstate", "serve"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert!(args.bind.is_none());
            assert!(!args.require_lock);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "tfstate", "serve",
            "--bind", "0.0.0.0:8080",
            "--require-lock",
            "--max-body-bytes", "1024",
            "--log-format", "json",
        ]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("0.0.0.0:8080".parse().unwrap()));
            assert!(args.require_lock);
            assert_eq!(args.max_body_bytes, Some(1024));
            assert_eq!(args.log_format, Some(LogFormatArg::Json));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_bad_bind() {
        assert!(Cli::try_parse_from(["tfstate", "serve", "--bind", "nowhere"]).is_err());
    }

    #[test]
    fn parse_global_config() {
        let cli = Cli::try_parse_from(["tfstate", "config", "--config", "/etc/tfstate.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/tfstate.toml")));
        assert!(matches!(cli.command, Command::Config(_)));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["tfstate", "-v", "serve"]).unwrap();
        assert!(cli.verbose);
    }
}
