//! Image Formats Module
//!
//! Still-image re-encoding through the `image` crate. The decoded pixel buffer
//! is adapted to what the target encoder accepts before writing.

use image::{DynamicImage, ImageFormat};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::codecs::requires_opaque_rgb;
use crate::errors::Result;

fn is_8bit_rgb(img: &DynamicImage) -> bool {
    matches!(img, DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_))
}

/// Convert the color model of `img` into one the encoder for `ext` can write.
///
/// - jpg/jpeg: opaque 8-bit RGB, alpha is dropped
/// - gif/webp/bmp: 8-bit RGB or RGBA, alpha kept when present
/// - png/tiff: float buffers become 16-bit RGBA
/// - tiff: gray+alpha becomes RGBA of the same depth
pub fn prepare_for_target(img: DynamicImage, ext: &str) -> DynamicImage {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();

    if requires_opaque_rgb(&ext) {
        return match img {
            DynamicImage::ImageRgb8(_) => img,
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        };
    }

    match ext.as_str() {
        "gif" | "webp" | "bmp" if !is_8bit_rgb(&img) => {
            if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            }
        }
        "png" | "tiff" => match img {
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                DynamicImage::ImageRgba16(img.to_rgba16())
            }
            DynamicImage::ImageLumaA8(_) if ext == "tiff" => {
                DynamicImage::ImageRgba8(img.to_rgba8())
            }
            DynamicImage::ImageLumaA16(_) if ext == "tiff" => {
                DynamicImage::ImageRgba16(img.to_rgba16())
            }
            other => other,
        },
        _ => img,
    }
}

/// Decode `source` and encode it to `dest`, format chosen by the extension of `dest`.
///
/// `dest` is created with create-new semantics; an existing file is never replaced.
pub fn encode_image(source: &Path, dest: &Path) -> Result<()> {
    let format = ImageFormat::from_path(dest)?;
    let ext = dest
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    let img = image::ImageReader::open(source)?
        .with_guessed_format()?
        .decode()?;
    let source_color = img.color();
    let img = prepare_for_target(img, ext);
    debug!(
        source = %source.display(),
        from = ?source_color,
        to = ?img.color(),
        "Encoding image"
    );

    let file = OpenOptions::new().write(true).create_new(true).open(dest)?;
    let mut writer = BufWriter::new(file);
    img.write_to(&mut writer, format)?;
    writer.flush()?;
    Ok(())
}
