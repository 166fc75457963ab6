use crate::domain::model::{Attributes, EnrichmentResult, InputTable, LookupQuery};
use crate::utils::error::{LookupError, Result};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Fails if `path` cannot be written, without leaving a file behind.
    fn prepare_write(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
}

/// External attribute source queried once per record.
#[async_trait]
pub trait PropertyLookup: Send + Sync {
    async fn lookup(&self, query: &LookupQuery) -> std::result::Result<Attributes, LookupError>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<InputTable>;
    async fn transform(&self, table: InputTable) -> Result<EnrichmentResult>;
    async fn load(&self, result: EnrichmentResult) -> Result<String>;
}
