use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use insignia::cli::{execute, Cli};
use insignia::error::{resolve_error_message, ClientError, DEFAULT_DISPLAY_MESSAGE};

// -- Entrypoint

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match execute(&cli.config, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("{}", user_message(&e));
            ExitCode::FAILURE
        }
    }
}

fn user_message(error: &ClientError) -> String {
    match error {
        ClientError::Validation(errors) => errors.to_string(),
        ClientError::Unauthorized(_) | ClientError::Request(_) => {
            resolve_error_message(error, DEFAULT_DISPLAY_MESSAGE)
        }
        other => other.to_string(),
    }
}
