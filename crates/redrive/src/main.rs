//! Redrive CLI: resend tracking events that previously failed delivery.

use std::process::ExitCode;

use clap::Parser;
use tracing::{info, warn};

use redrive::{
    CliArgs, RecoveryFilter, RecoveryOptions, RegistryConfig, build_registry, init_tracing,
    run_recovery,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    let args = CliArgs::parse();

    let paths = args.sources.config_paths();
    if paths.is_empty() {
        eprintln!("Error: no config files or directories specified");
        return ExitCode::FAILURE;
    }

    info!("Recovering failed events");
    warn!("This command is intended for use in recovery situations only.");

    let config = match RegistryConfig::from_paths(&paths) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut registry = match build_registry(&config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to build backend registry: {e}");
            return ExitCode::FAILURE;
        }
    };

    let filter = RecoveryFilter::parse(&args.transformer_type);
    let options = RecoveryOptions::new(args.batch_size as usize);

    run_recovery(&mut registry, &filter, &options).await;

    ExitCode::SUCCESS
}
