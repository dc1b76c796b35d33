mod platform;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let args = platform::cli::Args::parse();
    match platform::run_app(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("pinboard: {err:#}");
            ExitCode::FAILURE
        }
    }
}
