use crate::core::Pipeline;
use crate::domain::model::RunOutcome;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Runs extract, transform and load once. An empty extract ends the run
    /// with `RunOutcome::NoData` before anything is rendered or written.
    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("🚀 Starting supplier map generation");
        self.monitor.log_stage("Start");

        let records = self.pipeline.extract().await?;
        tracing::info!("Fetched {} supplier(s)", records.len());
        self.monitor.log_stage("Extract");

        if records.is_empty() {
            tracing::info!("No suppliers with coordinates, nothing to write");
            self.monitor.log_final_stats();
            return Ok(RunOutcome::NoData);
        }

        let rendered = self.pipeline.transform(records).await?;
        tracing::info!(
            "Rendered {} marker(s) from {} supplier(s), {} service option(s)",
            rendered.marker_count,
            rendered.record_count,
            rendered.service_names.len()
        );
        self.monitor.log_stage("Transform");

        let markers = rendered.marker_count;
        let path = self.pipeline.load(rendered).await?;
        self.monitor.log_stage("Load");
        self.monitor.log_final_stats();

        Ok(RunOutcome::Written { path, markers })
    }
}
