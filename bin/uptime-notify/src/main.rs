//! Entrypoint. Runs one reconciliation cycle and exits; schedule it with cron or a timer.

use std::process::ExitCode;

use clap::Parser;
use config::{LogFormat, Opts};
use dotenvy::dotenv;
use driver::Driver;
use tracing::{error, info, warn};
use tracing_subscriber::filter::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    if let Ok(custom_env_file) = std::env::var("ENV_FILE") {
        dotenvy::from_filename(custom_env_file)?;
    } else {
        // Try the default .env file, and ignore if it doesn't exist.
        dotenv().ok();
    }

    let opts = Opts::parse();
    init_tracing(opts.log_format);
    info!("📡 uptime-notify starting...");

    let driver = Driver::from_opts(&opts)?;
    let code = match driver.run().await {
        Ok(report) if report.is_clean() => {
            info!(delivered = report.delivered(), "Done");
            report.exit_code()
        }
        Ok(report) => {
            warn!(
                delivered = report.delivered(),
                failed = report.failed.len(),
                "Some notifications were not delivered and will be retried"
            );
            report.exit_code()
        }
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Run aborted");
            e.exit_code()
        }
    };

    Ok(ExitCode::from(code))
}
