//! Binary PPM (P6) reading and writing.
//!
//! Channel values are normalized to `[0, 1]` on read and clamped back into
//! that range on write. 8-bit and 16-bit pixmaps are supported.
//!
//! 8-bit images go through the `image` PNM encoder. Its pixmap encoder only
//! takes 8-bit samples, so deeper images are written with a hand-built P6
//! header and big-endian samples.

use std::io::Cursor;
use std::path::Path;
use std::time::{Instant, SystemTime};

use ::image as image_lib;
use image_lib::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image_lib::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};

use super::{ImageError, ImageInfo, Rgb, RgbImage};

const U8_MAX: f32 = u8::MAX as f32;
const U16_MAX: f32 = u16::MAX as f32;

/// Read a binary PPM file into an [`RgbImage`].
///
/// The format is forced to PNM so files without a `.ppm` extension load too.
/// The image's bit depth is the max value declared in the file header.
pub fn read_ppm<P: AsRef<Path>>(path: P) -> Result<RgbImage, ImageError> {
    let path = path.as_ref();
    let read_at = SystemTime::now();
    let start = Instant::now();

    let bytes = std::fs::read(path).map_err(|source| ImageError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = ImageReader::new(Cursor::new(bytes.as_slice()));
    reader.set_format(ImageFormat::Pnm);
    let decoded = reader.decode().map_err(|source| ImageError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let width = decoded.width() as usize;
    let height = decoded.height() as usize;

    // The decoder rescales to 8 or 16 bits, so the header max is read separately.
    let (pixels, decoded_depth): (Vec<Rgb>, u32) = match decoded {
        DynamicImage::ImageRgb8(buffer) => (
            buffer
                .as_raw()
                .chunks_exact(3)
                .map(|p| Rgb::new(p[0] as f32 / U8_MAX, p[1] as f32 / U8_MAX, p[2] as f32 / U8_MAX))
                .collect(),
            u8::MAX as u32,
        ),
        DynamicImage::ImageRgb16(buffer) => (
            buffer
                .as_raw()
                .chunks_exact(3)
                .map(|p| Rgb::new(p[0] as f32 / U16_MAX, p[1] as f32 / U16_MAX, p[2] as f32 / U16_MAX))
                .collect(),
            u16::MAX as u32,
        ),
        other => {
            return Err(ImageError::UnsupportedColor {
                path: path.to_path_buf(),
                color: format!("{:?}", other.color()),
            });
        }
    };

    let bit_depth = header_max_value(&bytes)
        .filter(|&max| max > 0)
        .unwrap_or(decoded_depth);

    let info = ImageInfo {
        name: Some(path.display().to_string()),
        read_at: Some(read_at),
        read_duration: Some(start.elapsed()),
    };

    let image = RgbImage::from_pixels(width, height, pixels)?
        .with_bit_depth(bit_depth)
        .with_info(info);

    tracing::debug!(
        path = %path.display(),
        width,
        height,
        bit_depth,
        "Read PPM image"
    );

    Ok(image)
}

/// Write an [`RgbImage`] as a binary PPM file.
///
/// Images with a bit depth above 255 are written with 16-bit samples scaled to
/// that depth (capped at 65535). Empty images are refused.
pub fn write_ppm<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<(), ImageError> {
    let path = path.as_ref();

    if image.dimensions().is_empty() {
        return Err(ImageError::EmptyImage {
            path: path.to_path_buf(),
        });
    }

    let too_large = || ImageError::TooLarge {
        width: image.width(),
        height: image.height(),
    };
    let width = u32::try_from(image.width()).map_err(|_| too_large())?;
    let height = u32::try_from(image.height()).map_err(|_| too_large())?;

    let encoded = if image.bit_depth() <= u8::MAX as u32 {
        encode_8bit(image, width, height).map_err(|source| ImageError::Encode {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        encode_16bit(image, width, height)
    };

    std::fs::write(path, &encoded).map_err(|source| ImageError::Create {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), width, height, "Image written");

    Ok(())
}

fn encode_8bit(image: &RgbImage, width: u32, height: u32) -> image_lib::ImageResult<Vec<u8>> {
    let samples: Vec<u8> = samples(image)
        .map(|v| quantize(v, U8_MAX) as u8)
        .collect();

    let mut encoded = Vec::new();
    PnmEncoder::new(&mut encoded)
        .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary))
        .write_image(&samples, width, height, ExtendedColorType::Rgb8)?;
    Ok(encoded)
}

/// P6 with a max value above 255: two bytes per sample, most significant first.
fn encode_16bit(image: &RgbImage, width: u32, height: u32) -> Vec<u8> {
    let max_value = image.bit_depth().min(u16::MAX as u32);
    let samples: Vec<[u8; 2]> = samples(image)
        .map(|v| (quantize(v, max_value as f32) as u16).to_be_bytes())
        .collect();

    let header = format!("P6\n{} {}\n{}\n", width, height, max_value);
    let mut encoded = Vec::with_capacity(header.len() + samples.len() * 2);
    encoded.extend_from_slice(header.as_bytes());
    encoded.extend_from_slice(bytemuck::cast_slice(&samples));
    encoded
}

/// Max value declared in a P3/P6 header. Comments (`#` to end of line) are
/// skipped. `None` if the header is not a pixmap header.
fn header_max_value(bytes: &[u8]) -> Option<u32> {
    let mut tokens: Vec<&[u8]> = Vec::with_capacity(4);
    let mut i = 0;

    while tokens.len() < 4 && i < bytes.len() {
        match bytes[i] {
            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                let token_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'#' {
                    i += 1;
                }
                tokens.push(&bytes[token_start..i]);
            }
        }
    }

    let [magic, _, _, max_value] = tokens.as_slice() else {
        return None;
    };
    if *magic != b"P6" && *magic != b"P3" {
        return None;
    }

    std::str::from_utf8(max_value).ok()?.parse().ok()
}

fn samples(image: &RgbImage) -> impl Iterator<Item = f32> + '_ {
    image.pixels().iter().flat_map(|p| p.to_array())
}

/// Clamp to `[0, 1]` and scale to `max`, rounding to the nearest level.
#[inline]
fn quantize(value: f32, max: f32) -> f32 {
    (value.clamp(0.0, 1.0) * max).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_clamps() {
        assert_eq!(quantize(1.5, U8_MAX), 255.0);
        assert_eq!(quantize(-0.2, U8_MAX), 0.0);
        assert_eq!(quantize(0.5, U8_MAX), 128.0);
    }

    #[test]
    fn test_write_then_read_8bit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pair.ppm");

        let mut image = RgbImage::new(2, 1);
        image.set(0, Rgb::new(0.2, 0.4, 0.6));
        image.set(1, Rgb::new(1.7, -1.0, 1.0));
        write_ppm(&image, &path).unwrap();

        let read = read_ppm(&path).unwrap();
        assert_eq!(read.width(), 2);
        assert_eq!(read.height(), 1);
        assert_eq!(read.bit_depth(), 255);

        let first = read.get(0);
        assert!((first.r - 0.2).abs() < 1.0 / 255.0);
        assert!((first.g - 0.4).abs() < 1.0 / 255.0);
        assert!((first.b - 0.6).abs() < 1.0 / 255.0);

        // Out-of-range values are clamped on write.
        assert_eq!(read.get(1), Rgb::new(1.0, 0.0, 1.0));

        let info = read.info();
        assert!(info.name.as_deref().unwrap().ends_with("pair.ppm"));
        assert!(info.read_at.is_some());
        assert!(info.read_duration.is_some());
    }

    #[test]
    fn test_write_then_read_16bit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep.ppm");

        let image = RgbImage::filled(3, 2, Rgb::new(0.25, 0.5, 0.75)).with_bit_depth(65535);
        write_ppm(&image, &path).unwrap();

        let read = read_ppm(&path).unwrap();
        assert_eq!(read.bit_depth(), 65535);
        assert_eq!(read.pixel_count(), 6);
        for p in read.pixels() {
            assert!((p.r - 0.25).abs() < 1e-4);
            assert!((p.g - 0.5).abs() < 1e-4);
            assert!((p.b - 0.75).abs() < 1e-4);
        }
    }

    #[test]
    fn test_write_then_read_10bit_keeps_depth() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ten_bit.ppm");

        let image = RgbImage::filled(3, 2, Rgb::new(0.0, 0.5, 1.0)).with_bit_depth(1023);
        write_ppm(&image, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"P6\n3 2\n1023\n"));
        // 0.5 * 1023 rounds to 512 = 0x0200, stored big-endian.
        let body = &bytes[b"P6\n3 2\n1023\n".len()..];
        assert_eq!(&body[..6], &[0x00, 0x00, 0x02, 0x00, 0x03, 0xFF]);

        let read = read_ppm(&path).unwrap();
        assert_eq!(read.bit_depth(), 1023);
        let p = read.get(5);
        assert_eq!(p.r, 0.0);
        assert!((p.g - 0.5).abs() < 1e-3);
        assert!((p.b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_read_keeps_header_max_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep.ppm");
        let mut bytes = b"P6\n1 1\n1023\n".to_vec();
        bytes.extend_from_slice(&[0x03, 0xFF, 0x01, 0xFF, 0x00, 0x00]);
        std::fs::write(&path, &bytes).unwrap();

        let read = read_ppm(&path).unwrap();
        assert_eq!(read.bit_depth(), 1023);
        let p = read.get(0);
        assert!((p.r - 1.0).abs() < 1e-6);
        assert!((p.g - 511.0 / 1023.0).abs() < 1e-3);
        assert_eq!(p.b, 0.0);
    }

    #[test]
    fn test_header_max_value_parsing() {
        assert_eq!(header_max_value(b"P6\n2 1\n255\n\x00"), Some(255));
        assert_eq!(header_max_value(b"P6 # c\n 4\t3 # more\n65535\n"), Some(65535));
        assert_eq!(header_max_value(b"P5\n2 1\n255\n"), None);
        assert_eq!(header_max_value(b"P6\n2 1"), None);
    }

    #[test]
    fn test_header_is_binary_p6() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("header.ppm");
        write_ppm(&RgbImage::filled(4, 3, Rgb::WHITE), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"P6"));
        assert!(bytes.ends_with(&[255u8; 36]));
    }

    #[test]
    fn test_write_empty_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.ppm");
        let result = write_ppm(&RgbImage::new(0, 0), &path);
        assert!(matches!(result, Err(ImageError::EmptyImage { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.ppm");
        let result = write_ppm(&RgbImage::new(1, 1), &path);
        assert!(matches!(result, Err(ImageError::Create { .. })));
    }

    #[test]
    fn test_read_missing_file_fails() {
        let result = read_ppm("/nonexistent/frame.ppm");
        match result {
            Err(ImageError::Open { path, .. }) => {
                assert!(path.to_string_lossy().contains("nonexistent"));
            }
            other => panic!("Expected Open error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_grayscale_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.ppm");
        std::fs::write(&path, b"P5\n2 1\n255\n\x00\xff").unwrap();

        let result = read_ppm(&path);
        assert!(matches!(result, Err(ImageError::UnsupportedColor { .. })));
    }
}
