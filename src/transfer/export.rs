//! Exporter: document store → directory of JSON Lines files.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use futures::TryStreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

use crate::codec::LineCodec;
use crate::error::Result;
use crate::paths::{NameFilter, PathInfo};
use crate::progress::{NoopReporter, ProgressReporter};
use crate::store::DocumentStore;
use crate::strategy::{Batching, Strategy};

use super::TransferSummary;

/// Exports matching collections to one file per collection.
///
/// The working directory is `<root>/<dirName>[ <prefix>]`; each matching
/// collection becomes `<dir>/<name>.<ext>` with one encoded document per
/// line, in cursor read order.
pub struct Exporter<S> {
    store: Option<Arc<S>>,
    path_info: PathInfo,
    reporter: Arc<dyn ProgressReporter>,
    strict: bool,
}

impl<S: DocumentStore> Exporter<S> {
    /// Create an exporter over a connected store.
    pub fn new(store: S, path_info: PathInfo) -> Self {
        Self {
            store: Some(Arc::new(store)),
            path_info,
            reporter: Arc::new(NoopReporter),
            strict: false,
        }
    }

    /// Create an exporter with no store handle.
    ///
    /// Running it is a silent no-op unless strict mode is enabled.
    pub fn disconnected(path_info: PathInfo) -> Self {
        Self {
            store: None,
            path_info,
            reporter: Arc::new(NoopReporter),
            strict: false,
        }
    }

    /// Attach a progress reporter (default: no-op).
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Turn missing preconditions into errors instead of silent skips.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Export every collection whose name starts with `prefix`.
    ///
    /// Regardless of strategy, the resulting file set and per-file line sets
    /// are identical; strategies differ in fan-out, write granularity, and
    /// peak memory usage.
    pub async fn export(&self, prefix: &str, strategy: Strategy) -> Result<TransferSummary> {
        let started = Instant::now();

        let Some(store) = self.store.clone() else {
            if self.strict {
                return Err(crate::error::ImexError::Precondition(
                    "export requires a connected document store".to_string(),
                ));
            }
            info!("No store handle; export skipped");
            return Ok(TransferSummary::skipped());
        };

        let dir = self.path_info.working_dir(prefix);
        self.reporter.start(&format!(
            "Start exporting collections matching '{}' to {}",
            prefix,
            dir.display()
        ));

        // Race-safe under concurrent creation; failure is fatal to the run.
        tokio::fs::create_dir_all(&dir).await?;
        self.reporter
            .report(&format!("{} was created", dir.display()));

        let filter = NameFilter::new(prefix);
        let names = store.collection_names(&filter).await?;
        info!("Exporting {} collections with {}", names.len(), strategy);

        let ctx = Arc::new(ExportContext {
            store,
            path_info: self.path_info.clone(),
            dir,
            reporter: self.reporter.clone(),
            codec: LineCodec::new(),
            batching: strategy.batching(),
            records: AtomicU64::new(0),
        });

        let units = names.len() as u64;
        let handler_ctx = ctx.clone();
        strategy
            .run_units(names, move |name| {
                let ctx = handler_ctx.clone();
                async move { ctx.export_collection(&name).await }
            })
            .await?;

        self.reporter.end("Export complete");

        Ok(TransferSummary {
            units,
            records: ctx.records.load(Ordering::Relaxed),
            elapsed: started.elapsed(),
            skipped: false,
        })
    }
}

/// Shared per-run state captured by every unit handler.
struct ExportContext<S> {
    store: Arc<S>,
    path_info: PathInfo,
    dir: std::path::PathBuf,
    reporter: Arc<dyn ProgressReporter>,
    codec: LineCodec,
    batching: Batching,
    records: AtomicU64,
}

impl<S: DocumentStore> ExportContext<S> {
    async fn export_collection(&self, name: &str) -> Result<()> {
        self.reporter.report(&format!("Saving {}", name));

        let path = self.path_info.file_path(&self.dir, name);
        let mut stream = self.store.find_all(name).await?;
        let mut written = 0u64;

        match self.batching {
            Batching::Materialized => {
                // Full line sequence in memory, file written once.
                let mut contents = String::new();
                while let Some(doc) = stream.try_next().await? {
                    contents.push_str(&self.codec.encode(&doc)?);
                    contents.push('\n');
                    written += 1;
                }
                tokio::fs::write(&path, contents).await?;
            }
            Batching::Pipelined => {
                // Lazy per-document serialization into a buffered writer.
                let mut writer = BufWriter::new(File::create(&path).await?);
                while let Some(doc) = stream.try_next().await? {
                    let line = self.codec.encode(&doc)?;
                    writer.write_all(line.as_bytes()).await?;
                    writer.write_all(b"\n").await?;
                    written += 1;
                }
                writer.flush().await?;
            }
            Batching::PerRecord => {
                // Each line hits the file as soon as its document is read.
                let mut file = File::create(&path).await?;
                while let Some(doc) = stream.try_next().await? {
                    let line = self.codec.encode(&doc)?;
                    file.write_all(line.as_bytes()).await?;
                    file.write_all(b"\n").await?;
                    file.flush().await?;
                    written += 1;
                }
            }
        }

        self.records.fetch_add(written, Ordering::Relaxed);
        debug!("Wrote {} lines to {}", written, path.display());
        self.reporter.report(&format!("Complete {}", name));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use bson::doc;
    use std::collections::BTreeSet;

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.seed(
            "abcUsers",
            vec![
                doc! { "name": "Alice", "age": 30 },
                doc! { "name": "Bob", "age": 25 },
            ],
        );
        store.seed("abcOrders", vec![doc! { "item": "book", "qty": 2 }]);
        store.seed("xOther", vec![doc! { "ignored": true }]);
        store
    }

    fn line_set(path: &std::path::Path) -> BTreeSet<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_export_writes_one_file_per_matching_collection() {
        for strategy in Strategy::ALL {
            let root = tempfile::tempdir().unwrap();
            let info = PathInfo::new(root.path(), "Export", "json");
            let exporter = Exporter::new(seeded_store(), info.clone());

            let summary = exporter.export("abc", strategy).await.unwrap();

            let dir = info.working_dir("abc");
            assert!(dir.join("abcUsers.json").exists(), "{}", strategy);
            assert!(dir.join("abcOrders.json").exists(), "{}", strategy);
            assert!(!dir.join("xOther.json").exists(), "{}", strategy);
            assert_eq!(summary.units, 2);
            assert_eq!(summary.records, 3);
            assert!(!summary.skipped);
        }
    }

    #[tokio::test]
    async fn test_export_preserves_read_order_within_file() {
        let root = tempfile::tempdir().unwrap();
        let info = PathInfo::new(root.path(), "Export", "json");
        let store = MemoryStore::new();
        store.seed(
            "seq",
            (0..50).map(|i| doc! { "n": i }).collect(),
        );
        let exporter = Exporter::new(store, info.clone());

        exporter
            .export("", Strategy::SequentialPipelined)
            .await
            .unwrap();

        let contents =
            std::fs::read_to_string(info.working_dir("").join("seq.json")).unwrap();
        let codec = LineCodec::new();
        for (i, line) in contents.lines().enumerate() {
            assert_eq!(codec.decode(line).unwrap(), doc! { "n": i as i32 });
        }
    }

    #[tokio::test]
    async fn test_export_strategies_produce_identical_file_sets() {
        let mut outputs = Vec::new();
        for strategy in Strategy::ALL {
            let root = tempfile::tempdir().unwrap();
            let info = PathInfo::new(root.path(), "Export", "json");
            let exporter = Exporter::new(seeded_store(), info.clone());
            exporter.export("abc", strategy).await.unwrap();

            let dir = info.working_dir("abc");
            let mut files: Vec<(String, BTreeSet<String>)> = std::fs::read_dir(&dir)
                .unwrap()
                .map(|e| {
                    let e = e.unwrap();
                    (
                        e.file_name().to_string_lossy().into_owned(),
                        line_set(&e.path()),
                    )
                })
                .collect();
            files.sort();
            outputs.push(files);
        }

        assert_eq!(outputs[0], outputs[1]);
        assert_eq!(outputs[1], outputs[2]);
    }

    #[tokio::test]
    async fn test_export_without_store_is_silent_noop() {
        let root = tempfile::tempdir().unwrap();
        let info = PathInfo::new(root.path(), "Export", "json");
        let exporter = Exporter::<MemoryStore>::disconnected(info.clone());

        let summary = exporter.export("", Strategy::Concurrent).await.unwrap();

        assert!(summary.skipped);
        assert!(!info.working_dir("").exists());
    }

    #[tokio::test]
    async fn test_export_without_store_errors_in_strict_mode() {
        let root = tempfile::tempdir().unwrap();
        let info = PathInfo::new(root.path(), "Export", "json");
        let exporter = Exporter::<MemoryStore>::disconnected(info).with_strict(true);

        let result = exporter.export("", Strategy::Concurrent).await;
        assert!(matches!(
            result,
            Err(crate::error::ImexError::Precondition(_))
        ));
    }

    #[tokio::test]
    async fn test_export_empty_collection_yields_empty_file() {
        let root = tempfile::tempdir().unwrap();
        let info = PathInfo::new(root.path(), "Export", "json");
        let store = MemoryStore::new();
        store.seed("empty", vec![]);
        let exporter = Exporter::new(store, info.clone());

        let summary = exporter.export("", Strategy::Concurrent).await.unwrap();

        assert_eq!(summary.records, 0);
        let contents =
            std::fs::read_to_string(info.working_dir("").join("empty.json")).unwrap();
        assert!(contents.is_empty());
    }
}
