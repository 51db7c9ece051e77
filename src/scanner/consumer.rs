use std::time::SystemTime;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::MalformedPathError;
use crate::maven::managed_repo::ManagedRepositoryContent;
use crate::scanner::summary::ScanSummary;

/// Lifecycle shared by all consumers. A failing `begin_scan` takes the consumer out of the rest
///  of the scan.
#[async_trait]
pub trait ConsumerLifecycle: Send {
    /// unique within a scan, used as the key of the consumer's statistics
    fn id(&self) -> &str;

    async fn begin_scan(&mut self, _repository: &ManagedRepositoryContent, _started: SystemTime) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once at the end of every scan that started, including cancelled ones
    async fn complete_scan(&mut self, _summary: &ScanSummary) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Receives relative paths that parsed as artifact coordinates
#[async_trait]
pub trait KnownContentConsumer: ConsumerLifecycle {
    /// globs over relative paths; the consumer only sees paths matching one of them
    fn includes(&self) -> Vec<String>;

    fn excludes(&self) -> Vec<String> {
        vec![]
    }

    async fn process_file(&mut self, path: &str) -> anyhow::Result<()>;
}

/// Receives relative paths that could not be parsed, together with the reason
#[async_trait]
pub trait InvalidContentConsumer: ConsumerLifecycle {
    async fn process_file(&mut self, path: &str, reason: &MalformedPathError) -> anyhow::Result<()>;
}

/// Logs every artifact it is offered
#[derive(Debug)]
pub struct LoggingContentConsumer {
    includes: Vec<String>,
    processed: u64,
}
impl LoggingContentConsumer {
    pub const ID: &'static str = "log-known-content";

    pub fn new(includes: Vec<String>) -> LoggingContentConsumer {
        LoggingContentConsumer {
            includes,
            processed: 0,
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }
}

#[async_trait]
impl ConsumerLifecycle for LoggingContentConsumer {
    fn id(&self) -> &str {
        LoggingContentConsumer::ID
    }

    async fn begin_scan(&mut self, repository: &ManagedRepositoryContent, _started: SystemTime) -> anyhow::Result<()> {
        self.processed = 0;
        info!("logging artifacts of repository {}", repository.id());
        Ok(())
    }

    async fn complete_scan(&mut self, summary: &ScanSummary) -> anyhow::Result<()> {
        info!("{} artifact(s) found in repository {}", self.processed, summary.repository_id);
        Ok(())
    }
}

#[async_trait]
impl KnownContentConsumer for LoggingContentConsumer {
    fn includes(&self) -> Vec<String> {
        self.includes.clone()
    }

    async fn process_file(&mut self, path: &str) -> anyhow::Result<()> {
        info!("artifact: {}", path);
        self.processed += 1;
        Ok(())
    }
}

/// Warns about every file that is not a valid artifact and keeps the list
#[derive(Debug, Default)]
pub struct InvalidContentLogger {
    rejected: Vec<(String, String)>,
}
impl InvalidContentLogger {
    pub const ID: &'static str = "log-invalid-content";

    pub fn new() -> InvalidContentLogger {
        InvalidContentLogger::default()
    }

    /// (path, reason)
    pub fn rejected(&self) -> &[(String, String)] {
        &self.rejected
    }
}

#[async_trait]
impl ConsumerLifecycle for InvalidContentLogger {
    fn id(&self) -> &str {
        InvalidContentLogger::ID
    }

    async fn begin_scan(&mut self, _repository: &ManagedRepositoryContent, _started: SystemTime) -> anyhow::Result<()> {
        self.rejected.clear();
        Ok(())
    }
}

#[async_trait]
impl InvalidContentConsumer for InvalidContentLogger {
    async fn process_file(&mut self, path: &str, reason: &MalformedPathError) -> anyhow::Result<()> {
        warn!("invalid content {}: {}", path, reason.reason);
        self.rejected.push((path.to_string(), reason.reason.clone()));
        Ok(())
    }
}
