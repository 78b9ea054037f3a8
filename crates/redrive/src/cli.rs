//! Command line interface for the recovery tool.

use clap::Parser;

use redrive_common::config::ConfigSources;

/// Resend tracking events that previously failed delivery.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct CliArgs {
    #[command(flatten)]
    pub sources: ConfigSources,

    /// The type of transformed events to recover: a routing engine name
    /// or "all".
    #[arg(long, alias = "transformer_type")]
    pub transformer_type: String,

    /// The number of events to recover at a time.
    #[arg(
        long,
        alias = "batch_size",
        default_value_t = 100,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub batch_size: u64,
}
