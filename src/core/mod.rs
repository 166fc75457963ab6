pub mod address;
pub mod etl;
pub mod ownership;
pub mod pipeline;
pub mod table;

pub use crate::domain::model::{EnrichedRecord, EnrichmentResult, InputTable};
pub use crate::domain::ports::{ConfigProvider, Pipeline, PropertyLookup, Storage};
pub use crate::utils::error::Result;
