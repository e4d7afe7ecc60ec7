//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate dynamic help text for the bus argument
fn bus_help() -> String {
    let names: Vec<&str> = spihal_bus::available_backends()
        .iter()
        .map(|b| b.name)
        .collect();
    format!(
        "Bus to open, e.g. spidev:dev=spidev0.0,speed=500000 [backends: {}]",
        names.join(", ")
    )
}

#[derive(Parser)]
#[command(name = "spihal")]
#[command(author, version, about = "SPI bus access over Linux spidev", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show backend information
    Info {
        /// Backend to describe (default: the build's default backend)
        #[arg(short, long)]
        backend: Option<String>,
    },

    /// Show the advisory single-transfer size limit
    MaxTransferSize {
        /// Backend to query (default: the build's default backend)
        #[arg(short, long)]
        backend: Option<String>,
    },

    /// Open a device and print the negotiated configuration
    Config {
        #[arg(short, long, help = bus_help())]
        device: String,
    },

    /// Perform a full-duplex transfer and print the bytes read
    Transfer {
        #[arg(short, long, help = bus_help())]
        device: String,

        /// Bytes to write, in hex (e.g. 9f 00 00 or 9f0000)
        #[arg(conflicts_with = "input")]
        data: Vec<String>,

        /// Read the bytes to write from a file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write the bytes read to a file instead of printing them
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List available backends
    ListBackends,
}
