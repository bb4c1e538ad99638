// Image packaging for the Gemini request
// Author: kelexine (https://github.com/kelexine)

use super::models::{ImageFormat, ImagePart, UploadedImage};

/// Package an uploaded file as the single image record sent to the model.
///
/// Bytes and MIME type are passed through untouched; nothing is validated
/// here. `None` in means `None` out.
pub fn prepare_image(upload: Option<&UploadedImage>) -> Option<Vec<ImagePart>> {
    let upload = upload?;
    Some(vec![ImagePart {
        mime_type: upload.mime_type.clone(),
        data: upload.bytes.clone(),
    }])
}

/// Detect MIME type from magic bytes at start of image data
pub fn detect_mime_type(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(b"\xFF\xD8\xFF") {
        Some(ImageFormat::Jpeg.mime_type())
    } else if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some(ImageFormat::Png.mime_type())
    } else {
        None
    }
}

/// Pick the MIME type for an upload.
///
/// Browsers sometimes send `application/octet-stream` or nothing; in that
/// case fall back to the magic bytes, then to the file extension.
pub fn resolve_mime_type(declared: Option<&str>, file_name: Option<&str>, data: &[u8]) -> String {
    if let Some(mime) = declared.filter(|m| m.starts_with("image/")) {
        return mime.to_string();
    }
    detect_mime_type(data)
        .or_else(|| file_name.and_then(ImageFormat::from_file_name).map(|f| f.mime_type()))
        .unwrap_or("application/octet-stream")
        .to_string()
}
