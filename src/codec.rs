//! Image decode/encode boundary.
//!
//! The batch core only talks to the [`Codec`] trait; [`ImageCodec`] is the
//! production implementation built on `image` and `oxipng`.

use crate::constants::{
    GIF_BEST_SPEED, GIF_FASTEST_SPEED, LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL,
    OXIPNG_PRESET, PNG_HIGH_QUALITY, PNG_ZOPFLI_QUALITY, ZOPFLI_ITERATIONS,
};
use crate::error::{Result, ShrinkError};
use image::codecs::gif::{GifDecoder, GifEncoder};
use image::codecs::jpeg::JpegEncoder;
use image::{AnimationDecoder, ColorType, DynamicImage, Frame, ImageError, ImageFormat, ImageReader};
use oxipng::{Deflaters, Options};
use std::fmt;
use std::io::{Cursor, Write};
use std::num::NonZeroU8;

/// Formats the batch knows how to recompress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
}

impl ImageKind {
    pub fn from_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            ImageFormat::Png => Some(ImageKind::Png),
            ImageFormat::Gif => Some(ImageKind::Gif),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Gif => "image/gif",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageKind::Jpeg => "JPEG",
            ImageKind::Png => "PNG",
            ImageKind::Gif => "GIF",
        };
        write!(f, "{}", name)
    }
}

pub trait Codec: Sync {
    /// Decodes `bytes`, recognizing the format from the content itself.
    fn decode(&self, bytes: &[u8]) -> Result<(DynamicImage, ImageKind)>;

    /// Writes `image` as `kind` at `quality` (0-100) into `out`.
    fn encode(
        &self,
        image: &DynamicImage,
        kind: ImageKind,
        quality: u8,
        out: &mut dyn Write,
    ) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl Codec for ImageCodec {
    fn decode(&self, bytes: &[u8]) -> Result<(DynamicImage, ImageKind)> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ShrinkError::Decode(ImageError::IoError(e)))?;

        let kind = match reader.format() {
            Some(format) => ImageKind::from_format(format)
                .ok_or_else(|| ShrinkError::UnsupportedFormat(format!("{:?}", format)))?,
            None => {
                return Err(ShrinkError::UnsupportedFormat(
                    "unrecognized image content".to_string(),
                ))
            }
        };

        // re-encoding keeps a single frame, so animations are left untouched
        if kind == ImageKind::Gif && is_animated_gif(bytes)? {
            return Err(ShrinkError::UnsupportedFormat("animated GIF".to_string()));
        }

        let image = reader.decode().map_err(ShrinkError::Decode)?;
        Ok((image, kind))
    }

    fn encode(
        &self,
        image: &DynamicImage,
        kind: ImageKind,
        quality: u8,
        out: &mut dyn Write,
    ) -> Result<()> {
        match kind {
            ImageKind::Jpeg => encode_jpeg(image, quality, out),
            ImageKind::Png => encode_png(image, quality, out),
            ImageKind::Gif => encode_gif(image, quality, out),
        }
    }
}

fn is_animated_gif(bytes: &[u8]) -> Result<bool> {
    let decoder = GifDecoder::new(Cursor::new(bytes)).map_err(ShrinkError::Decode)?;
    Ok(decoder.into_frames().take(2).count() > 1)
}

fn encode_jpeg(image: &DynamicImage, quality: u8, out: &mut dyn Write) -> Result<()> {
    // the encoder's scale starts at 1
    let encoder = JpegEncoder::new_with_quality(out, quality.clamp(1, 100));
    match image.color() {
        ColorType::L8 | ColorType::Rgb8 => image.write_with_encoder(encoder),
        _ => DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder),
    }
    .map_err(ShrinkError::Encode)
}

fn encode_png(image: &DynamicImage, quality: u8, out: &mut dyn Write) -> Result<()> {
    let mut raw = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut raw), ImageFormat::Png)
        .map_err(ShrinkError::Encode)?;

    let optimized = oxipng::optimize_from_memory(&raw, &png_options(quality))
        .map_err(|e| ShrinkError::PngOptimization(e.to_string()))?;

    out.write_all(&optimized)
        .map_err(|e| ShrinkError::Encode(ImageError::IoError(e)))
}

fn encode_gif(image: &DynamicImage, quality: u8, out: &mut dyn Write) -> Result<()> {
    let mut encoder = GifEncoder::new_with_speed(out, gif_speed(quality));
    encoder
        .encode_frame(Frame::new(image.to_rgba8()))
        .map_err(ShrinkError::Encode)
}

/// PNG is lossless, so quality picks how hard oxipng works instead.
pub fn png_options(quality: u8) -> Options {
    let mut options = Options::from_preset(OXIPNG_PRESET);
    options.force = true;
    options.deflate = if quality >= PNG_ZOPFLI_QUALITY {
        Deflaters::Zopfli {
            iterations: NonZeroU8::new(ZOPFLI_ITERATIONS).unwrap_or(NonZeroU8::MIN),
        }
    } else if quality >= PNG_HIGH_QUALITY {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        }
    } else {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        }
    };
    options
}

/// Maps quality 100 to the slowest, best palette search and 0 to the fastest.
pub fn gif_speed(quality: u8) -> i32 {
    let quality = i32::from(quality.min(100));
    GIF_FASTEST_SPEED - quality * (GIF_FASTEST_SPEED - GIF_BEST_SPEED) / 100
}
