//! Entry point for the foxbridge binary.

use std::process::ExitCode;

use clap::Parser as _;
use tracing::error;

use foxbridge::cli::Cli;
use foxbridge::config::load_config_from;
use foxbridge::utils::logging::{self, LogFormat};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = match load_config_from(cli.config.as_deref()) {
        Ok(settings) => cli.apply(settings),
        Err(e) => {
            logging::init("info", LogFormat::Text);
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(
        &settings.logging.level,
        LogFormat::from_name(&settings.logging.format),
    );

    if let Err(e) = foxbridge::app::run(settings).await {
        error!("Bridge failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
