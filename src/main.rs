//! Main entry point for the transplant CLI app

use transplant::cli_runner;

fn main() -> std::process::ExitCode {
    cli_runner::init_logging();
    if let Err(e) = cli_runner::run_cli_app() {
        eprintln!("Error: {}", e);
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}
