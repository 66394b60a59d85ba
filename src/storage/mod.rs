// file: src/storage/mod.rs
// description: blob storage client exports

pub mod auth;
pub mod blob;

pub use auth::StorageAccount;
pub use blob::{BlobClient, UploadStats};
