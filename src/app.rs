use std::thread;
use std::time::{Duration, Instant};

use camino::Utf8Path;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{EntryId, ExperimentalMethod};
use crate::error::FetchError;
use crate::metadata::{MetadataRecord, extract_metadata};
use crate::organism::OrganismResolver;
use crate::output::JsonOutput;
use crate::rcsb::RcsbClient;
use crate::search::{DEFAULT_PAGE_SIZE, IdentifierLister};

pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub page_size: usize,
    pub delay: Duration,
    pub methods: Vec<ExperimentalMethod>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            delay: DEFAULT_DELAY,
            methods: ExperimentalMethod::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub requested: usize,
    pub listed: usize,
    pub records: Vec<MetadataRecord>,
    pub skipped: Vec<SkippedEntry>,
}

impl RunResult {
    pub fn summary(&self, output: &str) -> RunSummary {
        RunSummary {
            output: output.to_string(),
            requested: self.requested,
            listed: self.listed,
            saved: self.records.len(),
            skipped: self.skipped.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub output: String,
    pub requested: usize,
    pub listed: usize,
    pub saved: usize,
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub pdb_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub pdb_id: String,
    pub organism: String,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// Waits out the delay between identifiers.
pub type Pacer = Box<dyn Fn(Duration)>;

pub struct App<R: RcsbClient> {
    rcsb: R,
    options: RunOptions,
    pacer: Pacer,
}

impl<R: RcsbClient> App<R> {
    pub fn new(rcsb: R, options: RunOptions) -> Self {
        Self {
            rcsb,
            options,
            pacer: Box::new(thread::sleep),
        }
    }

    /// Replaces `thread::sleep` as the pacing step.
    pub fn with_pacer(mut self, pacer: impl Fn(Duration) + 'static) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn client(&self) -> &R {
        &self.rcsb
    }

    /// Creates the output directory, runs the batch, then writes the records to
    /// `output`. Nothing is fetched when the directory cannot be created.
    pub fn run_to_file(
        &self,
        target_count: usize,
        output: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<RunResult, FetchError> {
        JsonOutput::prepare(output)?;
        info!(%output, target = target_count, "starting run");

        let result = self.run(target_count, sink);
        JsonOutput::write_records(&result.records, output)?;
        Ok(result)
    }

    /// Lists up to `target_count` entries and summarizes each of them in order.
    /// Individual failures are reported and skipped.
    pub fn run(&self, target_count: usize, sink: &dyn ProgressSink) -> RunResult {
        sink.event(ProgressEvent {
            message: format!("Starting to fetch metadata for ~{target_count} PDB entries..."),
            elapsed: None,
        });

        let started = Instant::now();
        let lister =
            IdentifierLister::new(&self.rcsb, &self.options.methods, self.options.page_size);
        let ids = lister.list_identifiers(target_count);
        sink.event(ProgressEvent {
            message: format!(
                "Found {} PDB IDs. Fetching detailed metadata...",
                ids.len()
            ),
            elapsed: Some(started.elapsed()),
        });

        let (records, skipped) = self.fetch_detailed_metadata(&ids, sink);
        info!(
            listed = ids.len(),
            records = records.len(),
            skipped = skipped.len(),
            "batch finished"
        );
        RunResult {
            requested: target_count,
            listed: ids.len(),
            records,
            skipped,
        }
    }

    pub fn fetch_detailed_metadata(
        &self,
        ids: &[EntryId],
        sink: &dyn ProgressSink,
    ) -> (Vec<MetadataRecord>, Vec<SkippedEntry>) {
        let mut records = Vec::with_capacity(ids.len());
        let mut skipped = Vec::new();

        for (index, id) in ids.iter().enumerate() {
            let started = Instant::now();
            sink.event(ProgressEvent {
                message: format!(
                    "Fetching detailed metadata for {id} ({}/{})...",
                    index + 1,
                    ids.len()
                ),
                elapsed: None,
            });

            match self.summarize(id) {
                Ok(record) => {
                    sink.event(ProgressEvent {
                        message: format!(
                            "✓ Successfully processed {id} - Organism: {}",
                            record.organism
                        ),
                        elapsed: Some(started.elapsed()),
                    });
                    records.push(record);
                }
                Err(err) => {
                    warn!(%id, error = %err, "skipping entry");
                    sink.event(ProgressEvent {
                        message: format!("✗ Skipped {id}: {err}"),
                        elapsed: Some(started.elapsed()),
                    });
                    skipped.push(SkippedEntry {
                        pdb_id: id.to_string(),
                        reason: err.to_string(),
                    });
                }
            }

            self.pace();
        }

        (records, skipped)
    }

    /// Resolves organisms only, without touching the output file.
    pub fn probe_organisms(&self, ids: &[EntryId], sink: &dyn ProgressSink) -> Vec<ProbeResult> {
        let resolver = OrganismResolver::new(&self.rcsb);
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            let started = Instant::now();
            let organism = resolver.resolve(id);
            sink.event(ProgressEvent {
                message: format!("{id}: {organism}"),
                elapsed: Some(started.elapsed()),
            });
            results.push(ProbeResult {
                pdb_id: id.to_string(),
                organism,
            });
            self.pace();
        }
        results
    }

    fn summarize(&self, id: &EntryId) -> Result<MetadataRecord, FetchError> {
        let entry = self.rcsb.entry(id)?;
        let organism = OrganismResolver::new(&self.rcsb).resolve(id);
        extract_metadata(&entry, &organism)
    }

    fn pace(&self) {
        if !self.options.delay.is_zero() {
            (self.pacer)(self.options.delay);
        }
    }
}
