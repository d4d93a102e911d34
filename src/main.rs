use std::process::ExitCode;

use clap::Parser;

use elfalign::cli::Cli;
use elfalign::output;

fn main() -> ExitCode {
    let cli = Cli::parse();

    for path in &cli.files {
        match elfalign::align_file(path) {
            Ok(report) => {
                if let Err(e) = output::emit(cli.output, &report) {
                    output::emit_error(cli.output, e.exit_code(), &e.to_string());
                    return ExitCode::from(e.exit_code());
                }
            }
            Err(e) => {
                // Stop at the first failing file; later files stay untouched.
                let message = format!("{}: {e}", path.display());
                output::emit_error(cli.output, e.exit_code(), &message);
                return ExitCode::from(e.exit_code());
            }
        }
    }

    ExitCode::SUCCESS
}
