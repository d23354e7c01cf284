mod error;
mod handle;
mod id;
mod info;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use handle::BlobStoreHandle;
pub use id::BlobId;
pub use info::{BlobInfo, BlobMetadata, NewBlob, display_name};
pub use traits::{BlobStore, BoxReader};
