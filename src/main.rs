//! spihal - SPI bus access from the command line
//!
//! A thin front end over `spihal-bus`: open a device on the spidev backend
//! (or the loopback stub), inspect the negotiated configuration and run
//! full-duplex transfers.
//!
//! # Architecture
//!
//! - `spihal-core` holds the backend contract, the device handle and the
//!   chunked transfer engine with software LSB-first emulation
//! - `spihal-spidev` and `spihal-stub` are the two backends
//! - `spihal-bus` picks the default backend at build time and parses bus
//!   strings such as `spidev:dev=spidev0.0,speed=500000`

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logger, RUST_LOG still overrides the verbosity flags
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Info { backend } => commands::cmd_info(backend.as_deref()),
        Commands::MaxTransferSize { backend } => {
            commands::cmd_max_transfer_size(backend.as_deref())
        }
        Commands::Config { device } => commands::cmd_config(&device),
        Commands::Transfer {
            device,
            data,
            input,
            output,
        } => commands::cmd_transfer(&device, &data, input.as_deref(), output.as_deref()),
        Commands::ListBackends => {
            commands::list_backends();
            Ok(())
        }
    }
}
