mod commands;
mod runner;

pub use commands::Command;
pub use runner::Runner;
