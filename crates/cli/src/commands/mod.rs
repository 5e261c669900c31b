//! CLI subcommands

pub mod check;
pub mod flatten;
pub mod kinds;
