//! Request extraction helpers.

pub mod upload;

pub use upload::{UploadForm, receive_upload};
