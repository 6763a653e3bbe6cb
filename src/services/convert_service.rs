use crate::error::AppError;
use crate::models::job_types::{EncodeOptions, Rgb};
use crate::services::exif_service::{apply_orientation, get_orientation};
use crate::services::fs_service::partial_path;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageReader, RgbImage};
use jpeg_encoder::{ColorType, Encoder};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

/// Convert one PNG into a JPEG at `dest`.
///
/// The oriented image is flattened onto `options.background` when it has
/// transparency. Output goes to a temporary file next to `dest` and is
/// renamed into place only after a successful encode.
pub fn convert_file(source: &Path, dest: &Path, options: &EncodeOptions) -> Result<(), AppError> {
    let start = Instant::now();

    let decoded = decode_oriented(source)?;
    let rgb = if has_transparency(decoded.source_color, &decoded.image) {
        flatten(&decoded.image, options.background)
    } else {
        decoded.image.into_rgb8()
    };
    encode_jpeg(&rgb, dest, options)?;

    tracing::debug!(
        "Converted {} in {:.1}ms",
        source.display(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

/// Decoded pixels plus the color type stored in the file.
pub struct DecodedSource {
    pub image: DynamicImage,
    pub source_color: ExtendedColorType,
}

/// Full decode plus EXIF orientation correction.
pub fn decode_oriented(path: &Path) -> Result<DecodedSource, AppError> {
    let decoder = ImageReader::open(path)
        .map_err(|e| AppError::from(format!("Failed to open image {}: {}", path.display(), e)))?
        .with_guessed_format()?
        .into_decoder()?;
    let source_color = decoder.original_color_type();
    let img = DynamicImage::from_decoder(decoder)?;

    let orientation = get_orientation(path);
    if orientation != 1 {
        tracing::debug!("Applying EXIF orientation {} to {}", orientation, path.display());
    }
    Ok(DecodedSource {
        image: apply_orientation(img, orientation),
        source_color,
    })
}

/// True when the source stores alpha, or is a palette image with a
/// transparent index.
///
/// The PNG decoder expands every `tRNS` chunk into an alpha channel. For
/// gray and RGB sources that chunk is a color key, which is dropped rather
/// than composited. Palette sources carry no fixed layout in `source`, so
/// the decoded alpha decides for them.
pub fn has_transparency(source: ExtendedColorType, decoded: &DynamicImage) -> bool {
    use ExtendedColorType::*;
    match source {
        A8 | La1 | La2 | La4 | La8 | La16 | Rgba1 | Rgba2 | Rgba4 | Rgba8 | Rgba16 | Rgba32F => true,
        L1 | L2 | L4 | L8 | L16 | Rgb1 | Rgb2 | Rgb4 | Rgb8 | Rgb16 | Rgb32F => false,
        _ => decoded.color().has_alpha(),
    }
}

/// Composite `img` over an opaque canvas filled with `background`.
pub fn flatten(img: &DynamicImage, background: Rgb) -> RgbImage {
    let rgba = img.to_rgba8();
    let bg = background.channels();
    let mut canvas = RgbImage::new(rgba.width(), rgba.height());

    for (dst, src) in canvas.pixels_mut().zip(rgba.pixels()) {
        let alpha = src[3] as u32;
        for c in 0..3 {
            dst[c] = blend(src[c], bg[c], alpha);
        }
    }
    canvas
}

fn blend(fg: u8, bg: u8, alpha: u32) -> u8 {
    ((fg as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8
}

/// Encode `img` as JPEG into `dest` through a temporary sibling file.
pub fn encode_jpeg(img: &RgbImage, dest: &Path, options: &EncodeOptions) -> Result<(), AppError> {
    let (width, height) = (jpeg_dimension(img.width())?, jpeg_dimension(img.height())?);
    let partial = partial_path(dest);

    let result = write_jpeg(img, &partial, width, height, options)
        .and_then(|_| fs::rename(&partial, dest).map_err(AppError::from));
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

fn write_jpeg(
    img: &RgbImage,
    path: &Path,
    width: u16,
    height: u16,
    options: &EncodeOptions,
) -> Result<(), AppError> {
    let mut writer = BufWriter::new(File::create(path)?);
    let mut encoder = Encoder::new(&mut writer, options.quality.get());
    encoder.set_progressive(options.progressive);
    encoder.set_optimized_huffman_tables(options.optimize);
    encoder.encode(img.as_raw(), width, height, ColorType::Rgb)?;
    writer.flush()?;
    Ok(())
}

fn jpeg_dimension(value: u32) -> Result<u16, AppError> {
    match u16::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(format!("Image dimension {} is outside the JPEG limit of 1..=65535", value).into()),
    }
}
