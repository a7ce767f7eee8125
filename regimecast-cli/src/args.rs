//! CLI argument parsing

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// How the MCP server talks to its client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// JSON-RPC over `POST /mcp`
    #[default]
    Http,
    /// Newline-delimited JSON-RPC over stdin/stdout
    Stdio,
}

#[derive(Debug, Parser)]
#[command(name = "regimecast")]
#[command(
    author,
    version,
    about = "MCP server for crypto prices and LLM market regime classification"
)]
pub struct Args {
    /// Transport to serve MCP on
    #[arg(long, value_enum, default_value_t = Transport::Http)]
    pub transport: Transport,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind (HTTP transport only)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (HTTP transport only)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Default log filter when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
