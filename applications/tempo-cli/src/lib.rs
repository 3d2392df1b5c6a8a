//! Tempo CLI - scan a music folder and play it through the playback controller
//!
//! Audio output is simulated: each track "plays" for a configurable number of
//! seconds, which is enough to watch queue advance, shuffle, repeat and the
//! skip-over-broken-files behaviour from a terminal.

pub mod config;
pub mod engine;
pub mod error;
pub mod scanner;
pub mod session;

pub use config::CliConfig;
pub use engine::SimulatedEngine;
pub use error::{CliError, Result};
pub use scanner::LibraryScanner;
