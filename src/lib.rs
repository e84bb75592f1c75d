// Public library surface for integration tests and reuse by the binary.

pub mod classify;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod outputs;
pub mod rate_limit;
pub mod scrape;
pub mod sources;
pub mod utils;

// ---- Re-exports for the common entry points ----
pub use crate::models::{CandidateRecord, ClassifiedRecord, SourceConfig};
pub use crate::orchestrator::{Orchestrator, RuntimeEnv, ScrapeTarget};
pub use crate::sources::SourceRegistry;
