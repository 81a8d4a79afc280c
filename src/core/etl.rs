use crate::core::Pipeline;
use crate::domain::model::{ErrorPolicy, ExtractionSummary, SequenceCursor};
use crate::utils::error::{ErrorScope, Result};
use crate::utils::monitor::RunMonitor;

/// Drives a pipeline over every input file in order, threading the check
/// numbering from one file to the next.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    /// Ok with a summary when the run got through every file, even if some checks
    /// or files were skipped; Err with the first failure under fail-fast, or when
    /// the failure leaves nothing to continue with.
    pub async fn run(&mut self) -> Result<ExtractionSummary> {
        let policy = self.pipeline.error_policy();
        tracing::info!("🚀 Starting X9 extraction ({:?} on error)", policy);
        self.monitor.log_stats("Extraction started");

        self.pipeline.prepare().await?;

        let mut summary = ExtractionSummary::new(self.pipeline.output_dir());
        let mut cursor = SequenceCursor::start();

        for source in self.pipeline.sources() {
            let file = match self.pipeline.extract(&source).await {
                Ok(file) => file,
                Err(error) => {
                    if policy == ErrorPolicy::FailFast || error.scope() == ErrorScope::Run {
                        return Err(error);
                    }
                    tracing::warn!("⚠️ Skipping {}: {}", source.path, error);
                    summary.record_failed_file(&source, &error);
                    continue;
                }
            };

            tracing::debug!("🔄 Extracted {} checks from {}", file.checks.len(), source.path);
            let transformed = self.pipeline.transform(file, cursor).await?;
            cursor = transformed.cursor;

            let loaded = self.pipeline.load(transformed).await?;
            summary.record_file(&source, loaded.written, &loaded.failures);

            if policy == ErrorPolicy::FailFast {
                if let Some(first) = loaded
                    .failures
                    .into_iter()
                    .min_by_key(|failure| failure.file_seq_no)
                {
                    return Err(first.error);
                }
            }

            self.monitor.log_stats(&format!("Finished {}", source.file_name));
        }

        tracing::info!(
            "Finished extracting {} total checks into directory {}",
            summary.checks_extracted,
            summary.output_dir
        );
        if !summary.is_clean() {
            tracing::warn!(
                "⚠️ {} checks and {} files were skipped",
                summary.checks_failed,
                summary.files_failed
            );
        }
        self.monitor.log_final_stats();

        Ok(summary)
    }
}
