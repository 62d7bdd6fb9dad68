//! Importer: directory of JSON Lines files → document store.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::codec::LineCodec;
use crate::error::Result;
use crate::paths::{FileUnit, NameFilter, PathInfo, list_file_units};
use crate::progress::{NoopReporter, ProgressReporter};
use crate::store::DocumentStore;
use crate::strategy::{Batching, Strategy};

use super::TransferSummary;

/// Imports matching files as recreated collections.
///
/// Each file's base name becomes the destination collection name. The
/// destination is dropped before any insert for that unit, so a run always
/// starts from an empty collection.
pub struct Importer<S> {
    store: Option<Arc<S>>,
    path_info: PathInfo,
    reporter: Arc<dyn ProgressReporter>,
    strict: bool,
}

impl<S: DocumentStore> Importer<S> {
    /// Create an importer over a connected store.
    pub fn new(store: S, path_info: PathInfo) -> Self {
        Self {
            store: Some(Arc::new(store)),
            path_info,
            reporter: Arc::new(NoopReporter),
            strict: false,
        }
    }

    /// Create an importer with no store handle.
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

    /// Import every file in the working directory whose extension matches
    /// and whose base name starts with `prefix`.
    ///
    /// Final collection contents are set-equivalent across strategies; only
    /// fan-out and insert granularity differ.
    pub async fn import(&self, prefix: &str, strategy: Strategy) -> Result<TransferSummary> {
        let started = Instant::now();

        let Some(store) = self.store.clone() else {
            if self.strict {
                return Err(crate::error::ImexError::Precondition(
                    "import requires a connected document store".to_string(),
                ));
            }
            info!("No store handle; import skipped");
            return Ok(TransferSummary::skipped());
        };

        let dir = self.path_info.working_dir(prefix);
        let dir_present = tokio::fs::metadata(&dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !dir_present {
            if self.strict {
                return Err(crate::error::ImexError::Precondition(format!(
                    "import directory does not exist: {}",
                    dir.display()
                )));
            }
            info!("Directory {} does not exist; import skipped", dir.display());
            return Ok(TransferSummary::skipped());
        }

        self.reporter
            .start(&format!("Start importing data from {}", dir.display()));

        let filter = NameFilter::new(prefix);
        let units = list_file_units(&dir, &self.path_info.file_extension, &filter).await?;
        info!("Importing {} files with {}", units.len(), strategy);

        let ctx = Arc::new(ImportContext {
            store,
            reporter: self.reporter.clone(),
            codec: LineCodec::new(),
            batching: strategy.batching(),
            records: AtomicU64::new(0),
        });

        let unit_count = units.len() as u64;
        let handler_ctx = ctx.clone();
        strategy
            .run_units(units, move |unit| {
                let ctx = handler_ctx.clone();
                async move { ctx.import_file(&unit).await }
            })
            .await?;

        self.reporter
            .end(&format!("All data from {} was loaded", dir.display()));

        Ok(TransferSummary {
            units: unit_count,
            records: ctx.records.load(Ordering::Relaxed),
            elapsed: started.elapsed(),
            skipped: false,
        })
    }
}

/// Shared per-run state captured by every unit handler.
struct ImportContext<S> {
    store: Arc<S>,
    reporter: Arc<dyn ProgressReporter>,
    codec: LineCodec,
    batching: Batching,
    records: AtomicU64,
}

impl<S: DocumentStore> ImportContext<S> {
    async fn import_file(&self, unit: &FileUnit) -> Result<()> {
        self.reporter.report(&format!("Loading {}", unit.name));

        // Destination must be empty before the first insert of this run.
        self.store.drop_collection(&unit.name).await?;

        let inserted = match self.batching {
            Batching::Materialized => {
                // Whole file decoded up front, one bulk insert.
                let contents = tokio::fs::read_to_string(&unit.path).await?;
                let documents = contents
                    .lines()
                    .map(|line| self.codec.decode(line))
                    .collect::<Result<Vec<_>>>()?;
                self.store.insert_many(&unit.name, documents).await?
            }
            Batching::Pipelined => {
                // Lines decoded lazily, still one bulk insert per file.
                let mut lines = BufReader::new(File::open(&unit.path).await?).lines();
                let mut documents = Vec::new();
                while let Some(line) = lines.next_line().await? {
                    documents.push(self.codec.decode(&line)?);
                }
                self.store.insert_many(&unit.name, documents).await?
            }
            Batching::PerRecord => {
                // One single-record insert call per decoded line.
                let mut lines = BufReader::new(File::open(&unit.path).await?).lines();
                let mut count = 0u64;
                while let Some(line) = lines.next_line().await? {
                    let document = self.codec.decode(&line)?;
                    self.store.insert_one(&unit.name, document).await?;
                    count += 1;
                }
                count
            }
        };

        self.records.fetch_add(inserted, Ordering::Relaxed);
        debug!("Inserted {} records into '{}'", inserted, unit.name);
        self.reporter.report(&format!("Complete {}", unit.name));
        Ok(())
    }
}
