//! Full resync of the configured sources
//!
//! Sources are fetched and decoded concurrently (bounded by
//! `max_concurrent`). Once every download has settled, tables are replaced
//! one at a time in configured order. A failing source is recorded in the
//! report and never stops the others.

use futures::stream::{self, StreamExt};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{info, warn};

use jcr_common::config::{SourceSpec, SyncConfig};
use jcr_common::db::{metadata, TableStore};

use crate::decode::{parse_csv, ParsedTable};
use crate::error::{SyncError, SyncResult};
use crate::fetcher::Fetcher;

/// Per-run switches
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Restrict the run to these tables (all configured sources when empty)
    pub tables: Vec<String>,
    /// Leave a table alone when the downloaded file hash matches the last load
    pub skip_unchanged: bool,
}

/// What happened to one source
#[derive(Debug)]
pub enum SourceOutcome {
    Loaded {
        records: i64,
        encoding: &'static str,
        file_hash: String,
    },
    Unchanged {
        file_hash: String,
    },
    Failed(SyncError),
}

impl SourceOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, SourceOutcome::Failed(_))
    }
}

#[derive(Debug)]
pub struct SourceResult {
    pub table: String,
    pub location: String,
    pub outcome: SourceOutcome,
}

/// Outcome of every attempted source, in configured order
#[derive(Debug, Default)]
pub struct SyncReport {
    pub results: Vec<SourceResult>,
}

impl SyncReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn get(&self, table: &str) -> Option<&SourceResult> {
        self.results.iter().find(|r| r.table == table)
    }

    /// Table name → success
    pub fn success_map(&self) -> BTreeMap<String, bool> {
        self.results
            .iter()
            .map(|r| (r.table.clone(), r.outcome.is_success()))
            .collect()
    }
}

struct Download {
    file_hash: String,
    table: ParsedTable,
}

/// Ingestion orchestrator
pub struct Syncer<F: Fetcher> {
    store: TableStore,
    fetcher: F,
    config: SyncConfig,
}

impl<F: Fetcher> Syncer<F> {
    pub fn new(store: TableStore, fetcher: F, config: SyncConfig) -> Self {
        Self {
            store,
            fetcher,
            config,
        }
    }

    /// Fetch, decode and replace every selected source
    pub async fn sync(&self, options: &SyncOptions) -> SyncReport {
        let sources: Vec<&SourceSpec> = self
            .config
            .sources
            .iter()
            .filter(|s| options.tables.is_empty() || options.tables.contains(&s.table))
            .collect();

        info!(
            sources = sources.len(),
            max_concurrent = self.config.max_concurrent,
            "Starting sync"
        );

        let mut downloads: Vec<(usize, String, SyncResult<Download>)> =
            stream::iter(sources.iter().enumerate().map(|(index, source)| {
                let location = self.config.source_url(source);
                async move {
                    let result = self.download(&location).await;
                    (index, location, result)
                }
            }))
            .buffer_unordered(self.config.max_concurrent.max(1))
            .collect()
            .await;
        downloads.sort_by_key(|(index, _, _)| *index);

        let mut results = Vec::with_capacity(sources.len());
        for (index, location, download) in downloads {
            let source = sources[index];
            let outcome = match download {
                Ok(download) => self.load(&source.table, download, options).await,
                Err(e) => SourceOutcome::Failed(e),
            };

            match &outcome {
                SourceOutcome::Loaded {
                    records, encoding, ..
                } => info!(table = %source.table, records, encoding, "✓ Table replaced"),
                SourceOutcome::Unchanged { .. } => {
                    info!(table = %source.table, "Source unchanged, table kept")
                }
                SourceOutcome::Failed(e) => {
                    warn!(table = %source.table, location = %location, error = %e, "Source failed")
                }
            }

            results.push(SourceResult {
                table: source.table.clone(),
                location,
                outcome,
            });
        }

        let report = SyncReport { results };

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Sync complete"
        );
        report
    }

    async fn download(&self, location: &str) -> SyncResult<Download> {
        let bytes = self.fetcher.fetch(location).await?;
        let file_hash = format!("{:x}", Sha256::digest(&bytes));
        let table = parse_csv(&bytes)?;
        Ok(Download { file_hash, table })
    }

    async fn load(&self, table: &str, download: Download, options: &SyncOptions) -> SourceOutcome {
        match self.replace(table, download, options).await {
            Ok(outcome) => outcome,
            Err(e) => SourceOutcome::Failed(e),
        }
    }

    async fn replace(
        &self,
        table: &str,
        download: Download,
        options: &SyncOptions,
    ) -> SyncResult<SourceOutcome> {
        if options.skip_unchanged {
            let previous = metadata::get(self.store.pool(), table).await?;
            let unchanged = previous
                .map(|m| m.file_hash == download.file_hash)
                .unwrap_or(false);
            if unchanged && self.store.table_exists(table).await? {
                return Ok(SourceOutcome::Unchanged {
                    file_hash: download.file_hash,
                });
            }
        }

        let records = self
            .store
            .bulk_load(
                table,
                &download.table.columns,
                &download.table.rows,
                &download.file_hash,
            )
            .await?;

        Ok(SourceOutcome::Loaded {
            records,
            encoding: download.table.encoding,
            file_hash: download.file_hash,
        })
    }
}
