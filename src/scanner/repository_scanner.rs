use std::sync::Arc;
use std::time::{Instant, SystemTime};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::error::ScannerError;
use crate::file_types::PathPatterns;
use crate::maven::managed_repo::ManagedRepositoryContent;
use crate::scanner::consumer::{InvalidContentConsumer, KnownContentConsumer};
use crate::scanner::summary::{ScanMode, ScanSummary};
use crate::storage::{RepositoryStorage, StorageEntry};

/// Walks a repository depth first, in lexicographic order within each directory, and hands every
///  file to the matching consumers. Files are processed one at a time, consumers never see
///  concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct RepositoryScanner {
    cancellation: CancellationToken,
}

impl RepositoryScanner {
    pub fn new() -> RepositoryScanner {
        RepositoryScanner::default()
    }

    /// A cancelled token stops the walk before the next entry; consumers still get `complete_scan`.
    pub fn with_cancellation(cancellation: CancellationToken) -> RepositoryScanner {
        RepositoryScanner { cancellation }
    }

    pub async fn scan(
        &self,
        repository: &ManagedRepositoryContent,
        known: &mut [&mut dyn KnownContentConsumer],
        invalid: &mut [&mut dyn InvalidContentConsumer],
        exclusions: &[String],
        mode: ScanMode,
    ) -> Result<ScanSummary, ScannerError> {
        let storage = repository.storage();
        if !storage.exists("").await? {
            return Err(ScannerError::MissingRoot(storage.location().to_string()));
        }
        if !storage.is_container("").await? {
            return Err(ScannerError::RootNotDirectory(storage.location().to_string()));
        }

        let exclusions = PathPatterns::new(exclusions)?;
        let mut known_slots = Vec::with_capacity(known.len());
        for consumer in known.iter() {
            known_slots.push(KnownSlot {
                id: consumer.id().to_string(),
                includes: PathPatterns::new(&consumer.includes())?,
                excludes: PathPatterns::new(&consumer.excludes())?,
                active: true,
            });
        }
        let invalid_slots = invalid.iter()
            .map(|c| InvalidSlot { id: c.id().to_string(), active: true })
            .collect();

        let root_entries = storage.list("").await?;

        let started = SystemTime::now();
        info!("starting {:?} scan of {:?} repository {} at {}", mode, repository.layout(), repository.id(), storage.location());

        let mut session = ScanSession {
            repository,
            storage: storage.clone(),
            known,
            known_slots,
            invalid,
            invalid_slots,
            exclusions,
            mode,
            summary: ScanSummary::new(repository.id(), mode, started),
        };

        session.begin(started).await;
        let clock = Instant::now();
        session.walk(root_entries, &self.cancellation).await;
        session.summary.elapsed = clock.elapsed();
        session.complete().await;

        let summary = session.summary;
        info!("finished scan of repository {}: {} visited, {} consumed, {} rejected, {} skipped, {} unchanged in {:?}{}",
            summary.repository_id,
            summary.files_visited,
            summary.files_consumed,
            summary.files_rejected,
            summary.files_skipped,
            summary.files_unchanged,
            summary.elapsed,
            if summary.cancelled { " (cancelled)" } else { "" },
        );
        Ok(summary)
    }
}

struct KnownSlot {
    id: String,
    includes: PathPatterns,
    excludes: PathPatterns,
    active: bool,
}
impl KnownSlot {
    fn wants(&self, path: &str) -> bool {
        self.active && self.includes.matches(path) && !self.excludes.matches(path)
    }
}

struct InvalidSlot {
    id: String,
    active: bool,
}

struct ScanSession<'s, 'k, 'i> {
    repository: &'s ManagedRepositoryContent,
    storage: Arc<dyn RepositoryStorage>,
    known: &'s mut [&'k mut dyn KnownContentConsumer],
    known_slots: Vec<KnownSlot>,
    invalid: &'s mut [&'i mut dyn InvalidContentConsumer],
    invalid_slots: Vec<InvalidSlot>,
    exclusions: PathPatterns,
    mode: ScanMode,
    summary: ScanSummary,
}

impl ScanSession<'_, '_, '_> {
    async fn begin(&mut self, started: SystemTime) {
        for (slot, consumer) in self.known_slots.iter_mut().zip(self.known.iter_mut()) {
            let stats = self.summary.consumer_mut(&slot.id);
            if let Err(e) = consumer.begin_scan(self.repository, started).await {
                warn!("consumer {} failed to start, skipping it for this scan: {:#}", slot.id, e);
                stats.errors += 1;
                slot.active = false;
            }
        }
        for (slot, consumer) in self.invalid_slots.iter_mut().zip(self.invalid.iter_mut()) {
            let stats = self.summary.consumer_mut(&slot.id);
            if let Err(e) = consumer.begin_scan(self.repository, started).await {
                warn!("consumer {} failed to start, skipping it for this scan: {:#}", slot.id, e);
                stats.errors += 1;
                slot.active = false;
            }
        }
    }

    async fn complete(&mut self) {
        let mut failed = Vec::new();
        for (slot, consumer) in self.known_slots.iter().zip(self.known.iter_mut()) {
            if let Err(e) = consumer.complete_scan(&self.summary).await {
                warn!("consumer {} failed to complete scan: {:#}", slot.id, e);
                failed.push(slot.id.clone());
            }
        }
        for (slot, consumer) in self.invalid_slots.iter().zip(self.invalid.iter_mut()) {
            if let Err(e) = consumer.complete_scan(&self.summary).await {
                warn!("consumer {} failed to complete scan: {:#}", slot.id, e);
                failed.push(slot.id.clone());
            }
        }
        for id in failed {
            self.summary.consumer_mut(&id).errors += 1;
        }
    }

    /// Pre-order walk with an explicit stack. Children are pushed in reverse so they pop in
    ///  sorted order.
    async fn walk(&mut self, root_entries: Vec<StorageEntry>, cancellation: &CancellationToken) {
        let mut pending = sorted_reversed(root_entries);

        while let Some(entry) = pending.pop() {
            if cancellation.is_cancelled() {
                info!("scan of repository {} cancelled", self.repository.id());
                self.summary.cancelled = true;
                break;
            }

            if entry.is_container {
                match self.storage.list(&entry.path).await {
                    Ok(children) => pending.extend(sorted_reversed(children)),
                    Err(e) => {
                        warn!("unable to list directory {} in repository {}: {}", entry.path, self.repository.id(), e);
                        self.summary.directories_unreadable += 1;
                    }
                }
            }
            else {
                self.visit_file(&entry.path).await;
            }
        }
    }

    async fn visit_file(&mut self, path: &str) {
        if self.exclusions.matches(path) || self.repository.file_types().matches_default_exclusions(path) {
            trace!("skipping excluded file {}", path);
            self.summary.files_skipped += 1;
            return;
        }

        if let ScanMode::Incremental { since } = self.mode {
            match self.storage.last_modified(path).await {
                Ok(modified) if modified <= since => {
                    trace!("skipping unchanged file {}", path);
                    self.summary.files_unchanged += 1;
                    return;
                }
                Ok(_) => {}
                Err(e) => warn!("unable to determine modification time of {}, scanning it anyway: {}", path, e),
            }
        }

        self.summary.files_visited += 1;

        match self.repository.parse_relative(path) {
            Ok(coordinate) => {
                debug!("{} -> {}", path, coordinate);
                self.summary.files_consumed += 1;
                for (slot, consumer) in self.known_slots.iter().zip(self.known.iter_mut()) {
                    if !slot.wants(path) {
                        continue;
                    }
                    let result = consumer.process_file(path).await;
                    let stats = self.summary.consumer_mut(&slot.id);
                    stats.processed += 1;
                    if let Err(e) = result {
                        warn!("consumer {} failed to process {}: {:#}", slot.id, path, e);
                        stats.errors += 1;
                    }
                }
            }
            Err(reason) => {
                debug!("{}", reason);
                self.summary.files_rejected += 1;
                for (slot, consumer) in self.invalid_slots.iter().zip(self.invalid.iter_mut()) {
                    if !slot.active {
                        continue;
                    }
                    let result = consumer.process_file(path, &reason).await;
                    let stats = self.summary.consumer_mut(&slot.id);
                    stats.processed += 1;
                    if let Err(e) = result {
                        warn!("consumer {} failed to process invalid file {}: {:#}", slot.id, path, e);
                        stats.errors += 1;
                    }
                }
            }
        }
    }
}

fn sorted_reversed(mut entries: Vec<StorageEntry>) -> Vec<StorageEntry> {
    entries.sort_by(|a, b| b.path.cmp(&a.path));
    entries
}
