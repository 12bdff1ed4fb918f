//! Subcommand implementations

pub mod decide;
pub mod describe;
