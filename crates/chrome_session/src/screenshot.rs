//! Full-page screenshot capture.

use anyhow::{Result, anyhow};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::page::Page;
use image::load_from_memory;
use log::info;
use std::fs::write;
use std::path::Path;

/// Captures the full page as PNG bytes, including content beyond the
/// viewport.
///
/// # Errors
///
/// Returns an error if the capture command fails or the payload is not
/// valid base64.
pub async fn capture_full_page_png(page: &Page) -> Result<Vec<u8>> {
    let params = CaptureScreenshotParams::builder()
        .format(CaptureScreenshotFormat::Png)
        .from_surface(true)
        .capture_beyond_viewport(true)
        .build();
    let response = page.execute(params).await?;
    let base64_str: &str = response.data.as_ref();
    BASE64_STANDARD
        .decode(base64_str)
        .map_err(|err| anyhow!("Failed to decode screenshot base64: {err}"))
}

/// Writes PNG bytes to `path`, replacing any existing file.
///
/// The bytes are decoded first so a corrupt capture fails loudly instead of
/// leaving a broken artifact on disk.
///
/// # Errors
///
/// Returns an error if the bytes do not decode as an image or the write
/// fails.
pub fn write_png(path: &Path, bytes: &[u8]) -> Result<()> {
    let decoded = load_from_memory(bytes)
        .map_err(|err| anyhow!("Screenshot for {} is not a valid image: {err}", path.display()))?;
    write(path, bytes)
        .map_err(|err| anyhow!("Failed to write screenshot {}: {err}", path.display()))?;
    info!(
        "Wrote {}x{} screenshot to {}",
        decoded.width(),
        decoded.height(),
        path.display()
    );
    Ok(())
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::write_png;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder, RgbaImage};
    use std::fs::read;

    fn encode_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
            .unwrap();
        bytes
    }

    #[test]
    fn write_png_persists_valid_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        let bytes = encode_png(4, 2);

        write_png(&path, &bytes).unwrap();
        assert_eq!(read(&path).unwrap(), bytes);
    }

    #[test]
    fn write_png_replaces_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");

        write_png(&path, &encode_png(4, 2)).unwrap();
        let second = encode_png(8, 8);
        write_png(&path, &second).unwrap();
        assert_eq!(read(&path).unwrap(), second);
    }

    #[test]
    fn write_png_rejects_garbage_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");

        assert!(write_png(&path, b"not a png").is_err());
        assert!(!path.exists());
    }
}
