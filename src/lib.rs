pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{Cli, Command, RunArgs};

pub use adapters::{oprs::OprsClient, storage::LocalStorage};
pub use config::SourceSettings;
pub use core::{
    etl::{EnrichmentEngine, RunSummary},
    pipeline::EnrichmentPipeline,
};
pub use domain::model::{Attributes, LookupQuery};
pub use utils::error::{EnrichError, LookupError, Result};
