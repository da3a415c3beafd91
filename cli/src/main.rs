mod commands;
mod terminal;

use commands::{CommandLine, Commands, scan};
use tagscan_common::config::ScanMode;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.quiet, commands.verbose);
    print::banner(commands.no_banner, commands.quiet);

    match commands.command {
        Commands::Census(args) => {
            print::header("starting census", commands.quiet);
            let cfg = args.to_config(ScanMode::Census);
            scan::scan(cfg, &args.input, commands.quiet).await
        }
        Commands::Validate {
            scan: args,
            attempts,
            generate_check,
        } => {
            print::header("starting validation", commands.quiet);
            let mut cfg = args.to_config(ScanMode::Validation);
            cfg.confirmation_attempts = attempts;
            cfg.generate_check = generate_check;
            scan::scan(cfg, &args.input, commands.quiet).await
        }
    }
}
