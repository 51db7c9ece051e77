pub mod consumer;
pub mod repository_scanner;
pub mod summary;

pub use consumer::{ConsumerLifecycle, InvalidContentConsumer, InvalidContentLogger, KnownContentConsumer, LoggingContentConsumer};
pub use repository_scanner::RepositoryScanner;
pub use summary::{ConsumerStats, ScanMode, ScanSummary};
