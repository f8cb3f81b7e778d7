use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

// Large enough for a lightbox view on a retina display
const MAX_WIDTH: u32 = 1600;
const MAX_HEIGHT: u32 = 1600;
const JPEG_QUALITY: u8 = 85;

pub struct ProcessedImage {
    pub data: Vec<u8>,
    pub content_type: &'static str,
    pub extension: &'static str,
}

/// Decode an uploaded artwork photo, shrink it to fit the max box and re-encode it.
pub fn process_image(data: &[u8], original_extension: &str) -> Result<ProcessedImage, String> {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("Failed to read image format: {}", e))?
        .decode()
        .map_err(|e| format!("Failed to decode image: {}", e))?;

    let (width, height) = (img.width(), img.height());

    let processed = if width > MAX_WIDTH || height > MAX_HEIGHT {
        let (new_width, new_height) = fit_within(width, height, MAX_WIDTH, MAX_HEIGHT);

        tracing::info!(
            "Resizing artwork image from {}x{} to {}x{}",
            width,
            height,
            new_width,
            new_height
        );

        img.resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3)
    } else {
        img
    };

    encode_image(&processed, original_extension)
}

/// Largest size with the same aspect ratio that fits in `max_w` x `max_h`.
fn fit_within(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    let ratio = (max_w as f64 / width as f64).min(max_h as f64 / height as f64);
    (
        ((width as f64 * ratio) as u32).max(1),
        ((height as f64 * ratio) as u32).max(1),
    )
}

fn encode_image(img: &DynamicImage, original_extension: &str) -> Result<ProcessedImage, String> {
    let mut buffer = Vec::new();

    match original_extension.to_lowercase().as_str() {
        "webp" | "png" => {
            // image 0.25 encodes WebP lossless only
            img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::WebP)
                .map_err(|e| format!("Failed to encode WebP: {}", e))?;
            Ok(ProcessedImage {
                data: buffer,
                content_type: "image/webp",
                extension: "webp",
            })
        }
        _ => {
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let mut encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
            encoder
                .encode_image(&rgb)
                .map_err(|e| format!("Failed to encode JPEG: {}", e))?;
            Ok(ProcessedImage {
                data: buffer,
                content_type: "image/jpeg",
                extension: "jpg",
            })
        }
    }
}
