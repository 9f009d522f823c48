//! Storage Adapter - 文件对象存储与签名链接

mod file_storage;
mod signer;

pub use file_storage::{validate_object_path, FileObjectStorage};
pub use signer::{UrlSigner, MEDIA_ROUTE_PREFIX};
