pub mod engine;
pub mod error;
pub mod manifest;
pub mod remote;
pub mod transfer;

pub use engine::{SyncEngine, SyncReport, Synchronizer};
pub use error::SyncError;
pub use manifest::LocalManifest;
pub use remote::{Book, BookLister, Downloader, RemoteError};
pub use transfer::HttpDownloader;
