//! Command-line entry point for the langfast proxy.

#![deny(unsafe_code)]

pub mod bootstrap;
pub mod parser;

pub use bootstrap::build_state;
pub use parser::Cli;
