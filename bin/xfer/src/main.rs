//! Process entry point: parses arguments, runs one job, and maps its exit
//! code onto the process exit status.

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli::args::Cli::parse();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let code = cli::run(cli, &mut stdout, &mut stderr);
    ExitCode::from(code.as_i32() as u8)
}
