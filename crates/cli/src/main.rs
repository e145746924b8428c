//! Interactive invoice front end.

use std::process::ExitCode;

use cli::{Cli, CliError, Config, storage_factory};
use domain::InvoiceService;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, shutting down");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }
}

async fn run(config: Config) -> Result<(), CliError> {
    let storage = storage_factory(&config).await?;
    let cli = Cli::new(InvoiceService::new(storage));

    let input = BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = cli.run(input, tokio::io::stdout()) => result?,
        () = shutdown_signal() => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(cli::commands::FAREWELL.as_bytes()).await?;
            stdout.flush().await?;
            // A pending stdin read blocks runtime shutdown until a line arrives.
            std::process::exit(0);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::from_env();

    // Logs go to stderr so they do not interleave with command output.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "invoice front end failed");
            ExitCode::FAILURE
        }
    }
}
