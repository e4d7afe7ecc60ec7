//! CLI command implementations
//!
//! Every command goes through `spihal-bus`, so it works the same on the
//! spidev backend and on the loopback stub.

mod info;
mod list;
mod transfer;

pub use info::{cmd_info, cmd_max_transfer_size};
pub use list::list_backends;
pub use transfer::{cmd_config, cmd_transfer};
