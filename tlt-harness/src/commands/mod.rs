//! Subcommand implementations. Each returns the process exit code for its
//! child (0 for commands that only print).

pub mod image;
pub mod notebooks;
pub mod train;
