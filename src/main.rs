//! Binary entry point for `archintel`.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use archintel::cli::output::{OutputFormat, format_error};
use archintel::cli::{Cli, execute};
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.format);

    match execute(&cli) {
        Ok(outcome) => {
            if !outcome.output.is_empty() {
                if let Err(e) = write!(io::stdout(), "{}", outcome.output)
                    && e.kind() != io::ErrorKind::BrokenPipe
                {
                    eprintln!("Error writing to stdout: {e}");
                    return ExitCode::from(1);
                }
            }
            ExitCode::from(outcome.exit_code)
        }
        Err(e) => {
            let error_output = format_error(&e, format);
            match format {
                OutputFormat::Json | OutputFormat::Ndjson => println!("{error_output}"),
                OutputFormat::Text => eprintln!("Error: {error_output}"),
            }
            ExitCode::from(e.exit_code())
        }
    }
}
