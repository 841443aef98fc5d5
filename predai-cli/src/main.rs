use std::process::ExitCode;

use clap::Parser;
use predai_cli::{Args, Runner, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log);

    let runner = match Runner::connect(args).await {
        Ok(runner) => runner,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = tokio::select! {
        r = runner.run() => r,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted; shutting down");
            Ok(())
        }
    };
    runner.close().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
