//! Interactive command-line front end for the invoicing system.
//!
//! Reads one command per line, runs it through the invoice service and
//! prints the result. Storage is chosen at startup from the environment.

pub mod commands;
pub mod config;
pub mod error;
pub mod storage;

pub use commands::{COMMANDS, Cli, Command, CommandSpec, ParseError, Reply};
pub use config::Config;
pub use error::CliError;
pub use storage::storage_factory;
