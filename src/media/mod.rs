pub mod form;
pub mod services;

pub use form::MultipartForm;
pub use services::{remove_upload, store_upload, MediaKind, UploadedFile};
