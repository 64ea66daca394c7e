pub mod config;
mod setup;

pub use setup::{setup, LogGuard};
