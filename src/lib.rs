pub mod cli;
pub mod config;
mod context;
pub mod encode;
pub mod engine;
mod error;
pub mod ingest;
mod metrics;
pub mod query;
pub mod schema;
pub mod server;
pub mod utils;

pub use config::Opts;
pub use context::Context;
pub use engine::{VectorEngine, WeaviateClient};
pub use error::{Error, Result};
pub use ingest::{ImportReport, Importer};
pub use query::{QueryPipeline, ResultSet, SearchResult};
pub use schema::SchemaManager;
