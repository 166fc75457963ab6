use crate::core::table;
use crate::domain::model::{EnrichedRecord, EnrichmentResult, InputTable};
use crate::domain::ports::{ConfigProvider, Pipeline, PropertyLookup, Storage};
use crate::utils::error::Result;

/// 讀取 → 逐筆查詢 → 合併 → 寫出，全程依序執行
pub struct EnrichmentPipeline<S: Storage, L: PropertyLookup, C: ConfigProvider> {
    storage: S,
    lookup: L,
    config: C,
}

impl<S: Storage, L: PropertyLookup, C: ConfigProvider> EnrichmentPipeline<S, L, C> {
    pub fn new(storage: S, lookup: L, config: C) -> Self {
        Self {
            storage,
            lookup,
            config,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, L: PropertyLookup, C: ConfigProvider> Pipeline for EnrichmentPipeline<S, L, C> {
    async fn extract(&self) -> Result<InputTable> {
        tracing::debug!("Reading input CSV from: {}", self.config.input_path());
        let data = self.storage.read_file(self.config.input_path()).await?;
        let table = table::parse_input(&data)?;

        // 在任何查詢之前確認輸出路徑可寫
        self.storage.prepare_write(self.config.output_path()).await?;
        Ok(table)
    }

    async fn transform(&self, table: InputTable) -> Result<EnrichmentResult> {
        let total = table.records.len();
        let mut records = Vec::with_capacity(total);

        for input in table.records {
            let query = input.query();
            tracing::info!(
                "Processing property {} of {}: {}",
                input.position + 1,
                total,
                query.search_address()
            );

            let enriched = match self.lookup.lookup(&query).await {
                Ok(attributes) => {
                    if attributes.is_empty() {
                        tracing::warn!("No attributes found for {}", query.search_address());
                    } else {
                        tracing::debug!(
                            "Found {} attributes for {}",
                            attributes.len(),
                            query.search_address()
                        );
                    }
                    EnrichedRecord {
                        input,
                        attributes,
                        lookup_error: None,
                    }
                }
                Err(e) => {
                    // 單筆失敗不中止，保留空白欄位
                    tracing::warn!("Lookup failed for {}: {}", query.search_address(), e);
                    EnrichedRecord {
                        input,
                        attributes: Default::default(),
                        lookup_error: Some(e.to_string()),
                    }
                }
            };
            records.push(enriched);
        }

        let attribute_columns = table::collect_attribute_columns(&table.headers, &records);

        Ok(EnrichmentResult {
            headers: table.headers,
            attribute_columns,
            records,
        })
    }

    async fn load(&self, result: EnrichmentResult) -> Result<String> {
        let data = table::render_output(&result)?;

        tracing::debug!(
            "Writing {} rows ({} bytes) to {}",
            result.records.len(),
            data.len(),
            self.config.output_path()
        );
        self.storage
            .write_file(self.config.output_path(), &data)
            .await?;

        Ok(self.config.output_path().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Attributes, LookupQuery};
    use crate::utils::error::{EnrichError, LookupError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        read_only: bool,
    }

    impl MockStorage {
        fn with_file(path: &str, content: &str) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), content.as_bytes().to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
                read_only: false,
            }
        }

        fn read_only(mut self) -> Self {
            self.read_only = true;
            self
        }

        async fn get_file(&self, path: &str) -> Option<String> {
            let files = self.files.lock().await;
            files
                .get(path)
                .map(|data| String::from_utf8_lossy(data).into_owned())
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EnrichError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn prepare_write(&self, path: &str) -> Result<()> {
            if self.read_only {
                return Err(EnrichError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    format!("Cannot write: {}", path),
                )));
            }
            Ok(())
        }
    }

    struct MockConfig;

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            "stations.csv"
        }

        fn output_path(&self) -> &str {
            "enriched.csv"
        }
    }

    /// Returns canned attributes per street address; unknown addresses fail with a network-like error.
    struct StubLookup {
        responses: HashMap<String, Attributes>,
    }

    impl StubLookup {
        fn new(responses: Vec<(&str, Attributes)>) -> Self {
            Self {
                responses: responses
                    .into_iter()
                    .map(|(address, attributes)| (address.to_string(), attributes))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl PropertyLookup for StubLookup {
        async fn lookup(
            &self,
            query: &LookupQuery,
        ) -> std::result::Result<Attributes, LookupError> {
            self.responses
                .get(&query.address)
                .cloned()
                .ok_or_else(|| LookupError::Malformed("connection reset".to_string()))
        }
    }

    const INPUT: &str = "address,city,state,zip_code\n\
        123 Main St,Trenton,NJ,08608\n\
        9 Elm St,Wall,NJ,07719\n\
        44 Ocean Ave,Brielle,NJ,08730\n";

    fn owner(name: &str) -> Attributes {
        [("owner", name)].into_iter().collect()
    }

    #[tokio::test]
    async fn test_lookup_attributes_are_merged() {
        let storage = MockStorage::with_file("stations.csv", INPUT);
        let lookup = StubLookup::new(vec![
            ("123 Main St", owner("Acme Fuel Co.")),
            ("9 Elm St", owner("Elm Gas LLC")),
            ("44 Ocean Ave", owner("Ocean Petro")),
        ]);
        let pipeline = EnrichmentPipeline::new(storage.clone(), lookup, MockConfig);

        let table = pipeline.extract().await.unwrap();
        let result = pipeline.transform(table).await.unwrap();

        assert_eq!(result.records.len(), 3);
        assert_eq!(result.attribute_columns, vec!["owner"]);
        assert_eq!(result.failed_lookups(), 0);

        let path = pipeline.load(result).await.unwrap();
        assert_eq!(path, "enriched.csv");

        let output = storage.get_file("enriched.csv").await.unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "address,city,state,zip_code,owner");
        assert_eq!(lines[1], "123 Main St,Trenton,NJ,08608,Acme Fuel Co.");
        assert_eq!(lines[3], "44 Ocean Ave,Brielle,NJ,08730,Ocean Petro");
    }

    #[tokio::test]
    async fn test_failed_lookup_keeps_row_with_blank_attributes() {
        let storage = MockStorage::with_file("stations.csv", INPUT);
        let lookup = StubLookup::new(vec![
            ("123 Main St", owner("Acme Fuel Co.")),
            ("44 Ocean Ave", Attributes::new()),
        ]);
        let pipeline = EnrichmentPipeline::new(storage.clone(), lookup, MockConfig);

        let table = pipeline.extract().await.unwrap();
        let result = pipeline.transform(table).await.unwrap();

        assert_eq!(result.failed_lookups(), 1);
        assert!(result.records[1].is_failed());
        assert!(!result.records[2].is_failed());

        pipeline.load(result).await.unwrap();
        let output = storage.get_file("enriched.csv").await.unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "123 Main St,Trenton,NJ,08608,Acme Fuel Co.");
        assert_eq!(lines[2], "9 Elm St,Wall,NJ,07719,");
        assert_eq!(lines[3], "44 Ocean Ave,Brielle,NJ,08730,");
    }

    #[tokio::test]
    async fn test_extract_missing_column_is_format_error() {
        let storage = MockStorage::with_file("stations.csv", "address,city,state\n1 A St,B,NJ\n");
        let pipeline = EnrichmentPipeline::new(storage, StubLookup::new(vec![]), MockConfig);

        let result = pipeline.extract().await;
        assert!(matches!(result, Err(EnrichError::FormatError { .. })));
    }

    #[tokio::test]
    async fn test_extract_missing_input_is_io_error() {
        let storage = MockStorage::with_file("other.csv", INPUT);
        let pipeline = EnrichmentPipeline::new(storage, StubLookup::new(vec![]), MockConfig);

        let result = pipeline.extract().await;
        assert!(matches!(result, Err(EnrichError::IoError(_))));
    }

    #[tokio::test]
    async fn test_extract_unwritable_output_is_io_error() {
        let storage = MockStorage::with_file("stations.csv", INPUT).read_only();
        let pipeline = EnrichmentPipeline::new(storage, StubLookup::new(vec![]), MockConfig);

        let result = pipeline.extract().await;
        assert!(matches!(result, Err(EnrichError::IoError(_))));
    }

    #[tokio::test]
    async fn test_extract_format_error_wins_over_unwritable_output() {
        let storage =
            MockStorage::with_file("stations.csv", "address,city
1 A St,B
").read_only();
        let pipeline = EnrichmentPipeline::new(storage, StubLookup::new(vec![]), MockConfig);

        let result = pipeline.extract().await;
        assert!(matches!(result, Err(EnrichError::FormatError { .. })));
    }
}
