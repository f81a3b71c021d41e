use clap::Parser;
use env_logger::Builder;
use log::{error, LevelFilter};
use pdb_gtar::application::{main_to_wrap, Cli};
use pdb_gtar::fetch::WgetFetcher;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
    } else {
        let mut verbosity_level = LevelFilter::Info;
        if cli.verbose {
            verbosity_level = LevelFilter::Debug
        };
        if cli.trace {
            verbosity_level = LevelFilter::Trace
        };

        let mut builder = Builder::new();
        builder
            .filter_module("pdb_gtar", verbosity_level)
            .filter_module("pack_gtar", verbosity_level)
            .format_target(false)
            .init();
    }

    match main_to_wrap(cli, &WgetFetcher) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error}");
            ExitCode::FAILURE
        }
    }
}
