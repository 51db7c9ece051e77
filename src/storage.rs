pub mod fs_storage;
pub mod repository_storage;
pub mod transient_storage;

pub use fs_storage::FsStorage;
pub use repository_storage::{byte_stream, read_to_bytes, ByteStream, RepositoryStorage, StorageEntry};
pub use transient_storage::TransientStorage;
