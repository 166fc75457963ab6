use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_path: String,
    pub records: usize,
    pub failed_lookups: usize,
    pub attribute_columns: usize,
}

pub struct EnrichmentEngine<P: Pipeline> {
    pipeline: P,
    monitor: Mutex<SystemMonitor>,
}

impl<P: Pipeline> EnrichmentEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: Mutex::new(SystemMonitor::new(monitor_enabled)),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting enrichment run...");

        // Extract
        let table = self.pipeline.extract().await?;
        tracing::info!("📥 Read {} records", table.records.len());
        self.monitor.lock().await.log_stats("Extract");

        // Transform
        let result = self.pipeline.transform(table).await?;
        let records = result.records.len();
        let failed_lookups = result.failed_lookups();
        let attribute_columns = result.attribute_columns.len();
        tracing::info!(
            "🔎 Enriched {} records ({} lookups failed, {} attribute columns)",
            records,
            failed_lookups,
            attribute_columns
        );
        self.monitor.lock().await.log_stats("Transform");

        // Load
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("📁 Output saved to: {}", output_path);

        let mut monitor = self.monitor.lock().await;
        monitor.log_stats("Load");
        monitor.log_final_stats();

        Ok(RunSummary {
            output_path,
            records,
            failed_lookups,
            attribute_columns,
        })
    }
}
