pub mod config;
pub mod error;
pub mod path;
pub mod store;


pub use config::StorageConfig;
pub use error::StoreError;
pub use path::{content_type, media_key, validate_key};
pub use store::{ByteStream, MediaStore};
