//! Image handling for uploaded math problems.
//!
//! This module turns a file received from the upload widget into the
//! `{mime_type, data}` record the Gemini API takes as inline data. It also
//! holds the accepted formats and MIME sniffing used by the upload filter.
//!
//! # Submodules
//!
//! - `models`: Upload and packaged-image types, accepted formats.
//! - `packager`: Packaging and MIME type resolution.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod models;
pub mod packager;

pub use models::{ImageFormat, ImagePart, UploadedImage, MAX_IMAGE_SIZE_BYTES};
pub use packager::{detect_mime_type, prepare_image, resolve_mime_type};
