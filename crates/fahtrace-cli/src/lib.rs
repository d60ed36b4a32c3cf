mod args;
mod commands;
pub mod config;
mod handlers;
mod output;

pub use args::{Cli, Commands, DialectArg};
pub use commands::run;
