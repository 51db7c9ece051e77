use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// every file is visited
    Fresh,
    /// only files modified after `since` are visited
    Incremental { since: SystemTime },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsumerStats {
    /// number of files handed to the consumer
    pub processed: u64,
    /// failed calls, including `begin_scan` and `complete_scan`
    pub errors: u64,
}

/// Statistics of one completed traversal
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub repository_id: String,
    pub mode: ScanMode,
    pub started: SystemTime,
    pub elapsed: Duration,
    /// files that were classified, i.e. consumed + rejected
    pub files_visited: u64,
    /// files that parsed as artifacts and were offered to the known consumers
    pub files_consumed: u64,
    /// files that did not parse, offered to the invalid consumers
    pub files_rejected: u64,
    /// files matching an exclusion pattern
    pub files_skipped: u64,
    /// files not modified since the cutoff of an incremental scan
    pub files_unchanged: u64,
    pub directories_unreadable: u64,
    /// the scan was cancelled and the counts are partial
    pub cancelled: bool,
    pub consumers: BTreeMap<String, ConsumerStats>,
}

impl ScanSummary {
    pub fn new(repository_id: &str, mode: ScanMode, started: SystemTime) -> ScanSummary {
        ScanSummary {
            repository_id: repository_id.to_string(),
            mode,
            started,
            elapsed: Duration::ZERO,
            files_visited: 0,
            files_consumed: 0,
            files_rejected: 0,
            files_skipped: 0,
            files_unchanged: 0,
            directories_unreadable: 0,
            cancelled: false,
            consumers: BTreeMap::new(),
        }
    }

    pub fn consumer(&self, id: &str) -> Option<&ConsumerStats> {
        self.consumers.get(id)
    }

    pub(crate) fn consumer_mut(&mut self, id: &str) -> &mut ConsumerStats {
        self.consumers.entry(id.to_string()).or_default()
    }

    pub fn consumer_errors(&self) -> u64 {
        self.consumers.values().map(|s| s.errors).sum()
    }
}
