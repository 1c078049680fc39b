//! # CLI Layer
//!
//! This module is **one possible UI client** for filterz. It is the only place
//! that parses arguments, writes to the terminal and installs a log subscriber.
//!
//! - `setup`: clap definitions
//! - `logging`: tracing subscriber wiring
//! - `commands`: `run()` plus one `handle_*` per subcommand
//! - `render`: turns `CmdResult` contents into terminal text

mod commands;
mod logging;
mod render;
mod setup;

pub use commands::run;
