mod platform;

use std::process::ExitCode;

use clap::Parser;
use engine_logging::engine_error;

fn main() -> ExitCode {
    let cli = platform::cli::Cli::parse();
    match platform::run_app(cli) {
        Ok(code) => code,
        Err(err) => {
            engine_error!("Fatal: {:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::from(platform::EXIT_FATAL)
        }
    }
}
