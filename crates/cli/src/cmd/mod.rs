//! CLI subcommand implementations

pub mod check;
pub mod list;
pub mod prune;
pub mod run;
pub mod serve;
