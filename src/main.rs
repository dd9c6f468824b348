use colored::Colorize;
use std::process::ExitCode;

fn main() -> ExitCode {
    match modelbook::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "error:".bright_red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
