//! Strategy benchmark: times export-then-import under every strategy.
//!
//! Each strategy runs the same copy workload once; export and import
//! durations are captured separately and rendered as an aligned comparison
//! table. A settle delay between strategies gives the OS a chance to finish
//! outstanding I/O before the next measurement.

use std::fmt;
use std::time::Duration;

use tracing::info;

use crate::error::Result;
use crate::store::DocumentStore;
use crate::strategy::Strategy;
use crate::transfer::{Exporter, Importer};

/// Timings for one strategy's export/import pair.
#[derive(Debug, Clone)]
pub struct BenchRow {
    /// Strategy under measurement.
    pub strategy: Strategy,

    /// Export duration.
    pub export: Duration,

    /// Import duration.
    pub import: Duration,
}

impl BenchRow {
    /// Combined export + import duration.
    pub fn total(&self) -> Duration {
        self.export + self.import
    }
}

/// Comparative results for all strategies.
#[derive(Debug, Clone)]
pub struct BenchReport {
    /// One row per strategy, in execution order.
    pub rows: Vec<BenchRow>,
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            writeln!(
                f,
                "{} | {:<22} | Export: {:<10.3} sec | Import: {:<10.3} sec | Total: {:<10.3} sec",
                i,
                row.strategy.to_string(),
                row.export.as_secs_f64(),
                row.import.as_secs_f64(),
                row.total().as_secs_f64()
            )?;
        }
        Ok(())
    }
}

/// Runs the same copy workload once per strategy and collects timings.
pub struct BenchRunner<S, T> {
    exporter: Exporter<S>,
    importer: Importer<T>,
    prefix: String,
    settle: Duration,
}

impl<S: DocumentStore, T: DocumentStore> BenchRunner<S, T> {
    /// Create a benchmark runner over an exporter/importer pair.
    ///
    /// Exporter and importer should share path information so the importer
    /// reads the files the exporter just wrote.
    pub fn new(exporter: Exporter<S>, importer: Importer<T>, prefix: impl Into<String>) -> Self {
        Self {
            exporter,
            importer,
            prefix: prefix.into(),
            settle: Duration::from_secs(5),
        }
    }

    /// Set the delay between strategies (default 5 seconds).
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Run export-then-import for every strategy and report timings.
    pub async fn run(&self) -> Result<BenchReport> {
        let mut rows = Vec::with_capacity(Strategy::ALL.len());

        for (i, strategy) in Strategy::ALL.into_iter().enumerate() {
            if i > 0 && !self.settle.is_zero() {
                info!("Waiting {:?} before next strategy", self.settle);
                tokio::time::sleep(self.settle).await;
            }

            let export = self.exporter.export(&self.prefix, strategy).await?;
            info!(
                "{} export ended in {:.3} seconds",
                strategy,
                export.elapsed.as_secs_f64()
            );

            let import = self.importer.import(&self.prefix, strategy).await?;
            info!(
                "{} import ended in {:.3} seconds",
                strategy,
                import.elapsed.as_secs_f64()
            );

            rows.push(BenchRow {
                strategy,
                export: export.elapsed,
                import: import.elapsed,
            });
        }

        Ok(BenchReport { rows })
    }
}
