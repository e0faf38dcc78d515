//! Duly Noted - command-line entry point

use std::process::ExitCode;

use clap::Parser;
use dulynoted_lib::utils::logging::init_tracing;
use dulynoted_lib::{execute, AppContext, Cli};
use tracing::{error, info};

#[tokio::main]
#[allow(clippy::print_stdout, clippy::print_stderr)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);
    info!(version = env!("CARGO_PKG_VERSION"), "dulynoted starting");

    let ctx = match AppContext::new() {
        Ok(ctx) => ctx,
        Err(err) => {
            error!(error = %err, "Failed to initialize");
            eprintln!("error: {}", err.user_message());
            return ExitCode::FAILURE;
        }
    };

    // Ctrl-C during a sign-in abandons the browser wait; a second one exits.
    // Every other command keeps the default interrupt behaviour.
    if cli.command.waits_for_browser() {
        let cancel = ctx.sign_in_canceller();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
                if tokio::signal::ctrl_c().await.is_ok() {
                    std::process::exit(130);
                }
            }
        });
    }

    match execute(&ctx, cli.command).await {
        Ok(output) => {
            println!("{}", output.render(cli.json));
            ExitCode::SUCCESS
        }
        Err(err) if err.is_cancellation() => {
            eprintln!("{}", err.user_message());
            ExitCode::from(130)
        }
        Err(err) => {
            eprintln!("error: {}", err.user_message());
            if err.requires_sign_in() {
                eprintln!("Run `dulynoted sign-in <provider>` and try again.");
            }
            ExitCode::FAILURE
        }
    }
}
