pub mod config;
pub mod interrupt;
pub mod observability;
