// src/services/image_input.rs
use crate::errors::FloraError;
use actix_multipart::Multipart;
use base64::{Engine as _, engine::general_purpose};
use bytes::BytesMut;
use futures_util::TryStreamExt;
use image::ImageFormat;
use std::fmt;

const FALLBACK_MIME: &str = "application/octet-stream";

/// A `data:<mime>;base64,<payload>` string built from one selected image.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageDataUri(String);

impl ImageDataUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(';'))
            .map(|(mime, _)| mime)
    }
}

// Payloads are megabytes of base64; keep logs readable.
impl fmt::Debug for ImageDataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageDataUri")
            .field("mime", &self.mime_type())
            .field("len", &self.0.len())
            .finish()
    }
}

pub struct ImageInput;

impl ImageInput {
    pub fn new() -> Self {
        Self
    }

    /// Encodes raw bytes as a data URI. Size, dimensions and orientation are
    /// not checked; whatever was selected is passed on unchanged.
    pub fn encode(&self, data: &[u8], declared_type: Option<&str>) -> ImageDataUri {
        let mime = declared_type
            .map(str::trim)
            .filter(|ct| ct.starts_with("image/"))
            .map(str::to_string)
            .or_else(|| sniff_mime(data).map(str::to_string))
            .unwrap_or_else(|| FALLBACK_MIME.to_string());

        ImageDataUri(format!(
            "data:{};base64,{}",
            mime,
            general_purpose::STANDARD.encode(data)
        ))
    }

    /// Reads the first file field of a multipart upload. Later fields are
    /// drained and ignored.
    pub async fn from_multipart(&self, mut payload: Multipart) -> Result<ImageDataUri, FloraError> {
        let mut selected: Option<ImageDataUri> = None;

        while let Some(mut field) = payload
            .try_next()
            .await
            .map_err(|e| FloraError::ImageInput(format!("Broken upload stream: {}", e)))?
        {
            let is_file = field.content_disposition().get_filename().is_some();
            let content_type = field.content_type().map(|ct| ct.to_string());

            let mut buffer = BytesMut::new();
            while let Some(chunk) = field
                .try_next()
                .await
                .map_err(|e| FloraError::ImageInput(format!("Failed to read upload: {}", e)))?
            {
                buffer.extend_from_slice(&chunk);
            }

            if selected.is_none() && is_file && !buffer.is_empty() {
                selected = Some(self.encode(&buffer, content_type.as_deref()));
            }
        }

        selected.ok_or_else(|| FloraError::ImageInput("No image file was selected".to_string()))
    }
}

impl Default for ImageInput {
    fn default() -> Self {
        Self::new()
    }
}

fn sniff_mime(data: &[u8]) -> Option<&'static str> {
    let format = image::guess_format(data).ok()?;
    let mime = match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Avif => "image/avif",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analysis_client::strip_data_uri_header;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    #[test]
    fn declared_image_type_wins() {
        let uri = ImageInput::new().encode(b"abc", Some("image/webp"));
        assert_eq!(uri.as_str(), "data:image/webp;base64,YWJj");
        assert_eq!(uri.mime_type(), Some("image/webp"));
        assert_eq!(strip_data_uri_header(uri.as_str()), "YWJj");
    }

    #[test]
    fn sniffs_type_when_declared_type_is_generic() {
        let uri = ImageInput::new().encode(PNG_MAGIC, Some("application/octet-stream"));
        assert_eq!(uri.mime_type(), Some("image/png"));
    }

    #[test]
    fn unknown_bytes_pass_through_unchanged() {
        let data = b"definitely not an image";
        let uri = ImageInput::new().encode(data, None);
        assert_eq!(uri.mime_type(), Some(FALLBACK_MIME));
        let decoded = general_purpose::STANDARD
            .decode(strip_data_uri_header(uri.as_str()))
            .unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn debug_does_not_dump_payload() {
        let uri = ImageInput::new().encode(&[7u8; 512], Some("image/jpeg"));
        let rendered = format!("{:?}", uri);
        assert!(rendered.contains("image/jpeg"));
        assert!(!rendered.contains(strip_data_uri_header(uri.as_str())));
    }
}
