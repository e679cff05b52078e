pub mod config;
pub mod error;
pub mod graph;
pub mod retrieval;
pub mod paths;
pub mod client;
pub mod providers;
pub mod cache;
pub mod enrich;
pub mod synth;
pub mod services;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use error::{KgqaError, Result};
pub use graph::{GraphPath, GraphStore};
pub use pipeline::{Outcome, Pipeline};
pub use services::Services;
