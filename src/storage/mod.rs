pub mod draft_store;
pub mod kv_store;

pub use draft_store::DraftStore;
pub use kv_store::{FileStore, KeyValueStore, MemoryStore};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stored video blob is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("storage lock poisoned")]
    Poisoned,
}
