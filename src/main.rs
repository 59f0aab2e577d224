use std::process::ExitCode;

use clap::Parser;
use dcmbench::app;
use dcmbench::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    app::run(cli)
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_module("dcmbench", log::LevelFilter::Debug);
    }
    let _ = builder.format_timestamp_secs().try_init();
}
