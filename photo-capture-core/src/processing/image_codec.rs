//! Snapshot encoding and gallery file validation.

use image::{ImageFormat, RgbaImage};

use crate::models::config::CaptureConfiguration;
use crate::models::error::CaptureError;
use crate::models::frame::{CaptureSource, CapturedFrame, RawFrame};
use crate::processing::data_url;
use crate::traits::file_picker::PickedFile;

/// Encode an RGBA snapshot as a JPEG `CapturedFrame`.
///
/// Rejects zero-sized frames (the stream has not produced video yet) and
/// buffers whose length does not match the stated dimensions.
pub fn encode_snapshot(raw: &RawFrame, quality: u8) -> Result<CapturedFrame, CaptureError> {
    if raw.is_empty() {
        return Err(CaptureError::InvalidFrame(format!(
            "preview surface reports {}x{}",
            raw.width, raw.height
        )));
    }
    if raw.rgba.len() != raw.expected_len() {
        return Err(CaptureError::InvalidFrame(format!(
            "expected {} bytes for {}x{} RGBA, got {}",
            raw.expected_len(),
            raw.width,
            raw.height,
            raw.rgba.len()
        )));
    }

    let rgba = RgbaImage::from_raw(raw.width, raw.height, raw.rgba.clone())
        .ok_or_else(|| CaptureError::InvalidFrame("pixel buffer rejected".into()))?;
    // JPEG has no alpha channel.
    let rgb = image::DynamicImage::ImageRgba8(rgba).into_rgb8();

    let mut buffer = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| CaptureError::InvalidFrame(format!("JPEG encoding failed: {}", e)))?;

    Ok(CapturedFrame::new(buffer, "image/jpeg", CaptureSource::Camera))
}

/// Validate a file chosen from the gallery and turn it into a frame.
///
/// Checks, in order: declared MIME type, size limit, that the encoded
/// payload is more than a placeholder, and that the bytes really are an
/// image.
pub fn frame_from_file(
    file: PickedFile,
    config: &CaptureConfiguration,
) -> Result<CapturedFrame, CaptureError> {
    if !file.mime_type.starts_with("image/") {
        return Err(CaptureError::InvalidFileType(format!(
            "{} ({})",
            file.name, file.mime_type
        )));
    }

    let size = file.bytes.len() as u64;
    if size > config.max_file_bytes {
        return Err(CaptureError::FileTooLarge {
            size,
            max: config.max_file_bytes,
        });
    }

    let url = data_url::encode(&file.mime_type, &file.bytes);
    data_url::validate_image(&url, config.min_payload_chars)
        .map_err(|e| CaptureError::FileReadFailure(format!("{}: {}", file.name, e)))?;

    let mime_type = match sniff_mime(&file.bytes) {
        Some(sniffed) => sniffed.to_string(),
        None => {
            return Err(CaptureError::FileReadFailure(format!(
                "{}: not a recognised image encoding",
                file.name
            )))
        }
    };
    if mime_type != file.mime_type {
        log::debug!(
            "{} declared as {} but encoded as {}",
            file.name,
            file.mime_type,
            mime_type
        );
    }

    Ok(CapturedFrame::new(file.bytes, mime_type, CaptureSource::Gallery))
}

/// MIME type of an encoded image, judged from its magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    let format = image::guess_format(bytes).ok()?;
    let mime = match format {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Png => "image/png",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Avif => "image/avif",
        _ => return None,
    };
    Some(mime)
}
