//! 命令行参数

use std::path::PathBuf;

use clap::Parser;

/// Connects to every host in an inventory over SSH, runs one command
/// and appends the collected output to a report file.
#[derive(Debug, Clone, Parser)]
#[command(name = "ops-fanout", version)]
pub struct Cli {
    /// File containing the list of hosts, one per line.
    pub inventory_file: PathBuf,

    /// Command to execute on every host.
    #[arg(short = 'c', long = "command", default_value = "net-stats -l")]
    pub command: String,

    /// File containing the SSH credentials.
    #[arg(short = 'f', long = "credentials-file", default_value = "credentials.json")]
    pub credentials_file: PathBuf,

    /// Report file to append to (overrides FANOUT_REPORT__PATH).
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Maximum number of hosts contacted at once (overrides FANOUT_DISPATCH__WORKER_LIMIT).
    #[arg(short = 'w', long = "workers")]
    pub workers: Option<usize>,
}
