pub mod scan;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use tagscan_common::config::{DEFAULT_CONFIRMATION_ATTEMPTS, ScanConfig, ScanMode};
use tagscan_common::network::endpoint::DEFAULT_PORT;

#[derive(Parser)]
#[command(name = "tagscan")]
#[command(about = "Finds model-serving endpoints and sorts them by the models they report.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Reduce output; repeat to hide everything but the summary
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Increase log verbosity; repeat for trace output
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Do not print the startup banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe every host once and keep all results, failures included
    #[command(alias = "c")]
    Census(ScanArgs),
    /// Confirm every host with repeated probes and keep only valid ones
    #[command(alias = "v")]
    Validate {
        #[command(flatten)]
        scan: ScanArgs,
        /// Probe attempts per host before it counts as failed
        #[arg(short, long, default_value_t = DEFAULT_CONFIRMATION_ATTEMPTS)]
        attempts: u32,
        /// Keep a model only if the host also answers a generate request for it
        #[arg(long)]
        generate_check: bool,
    },
}

#[derive(Args)]
pub struct ScanArgs {
    /// File with one host per line (host, host:port or URL)
    pub input: PathBuf,

    /// Maximum number of hosts probed at the same time
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Per-attempt timeout in seconds
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Directory that receives the listings
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Port used for hosts listed without one
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl ScanArgs {
    /// Starts from the mode defaults and applies whatever was given on the command line.
    pub fn to_config(&self, mode: ScanMode) -> ScanConfig {
        let mut cfg = ScanConfig::for_mode(mode);
        if let Some(concurrency) = self.concurrency {
            cfg.concurrency_limit = concurrency;
        }
        if let Some(secs) = self.timeout {
            cfg.request_timeout = Duration::from_secs(secs);
        }
        if let Some(output) = &self.output {
            cfg.output_directory = output.clone();
        }
        cfg.default_port = self.port;
        cfg
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
