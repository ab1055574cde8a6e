//! Command-line front end for the GxP validation assistant.
//!
//! The `gxp` binary offers:
//! - `gxp init` to build the vector index from the PDF data directory
//! - `gxp chat` for an interactive console with session history
//! - `gxp ask` for one-shot questions
//! - `gxp status` to report the indexed passage count

pub mod app;
pub mod args;
pub mod console;
pub mod init;
pub mod logging;

pub use args::{Cli, Command};
pub use init::{InitOutcome, initialize};
