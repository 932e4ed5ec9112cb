mod cli;

use bmk::error::BmkError;
use bmk::exit_codes;
use bmk::logging::init_tracing;
use bmk::runner::{install_signal_handler, CancelToken};
use clap::Parser;
use colored::Colorize;

use cli::{dispatch, Cli};

fn main() {
    let cancel = CancelToken::new();
    // Must precede any other thread
    if let Err(e) = install_signal_handler(cancel.clone()) {
        eprintln!("{} {e}", "warning:".yellow().bold());
    }

    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let code = match dispatch(&cli.global, cli.command, cancel) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            e.downcast_ref::<BmkError>()
                .map(BmkError::exit_code)
                .unwrap_or(exit_codes::GENERAL_ERROR)
        }
    };

    std::process::exit(code);
}
