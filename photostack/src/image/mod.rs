mod error;
pub(crate) mod ppm;
mod report;

pub use error::ImageError;
pub use ppm::{read_ppm, write_ppm};
pub use report::{ImageReport, ImageSummary};

use std::ops::{Add, Div, Index, IndexMut, Mul, Sub};
use std::time::{Duration, SystemTime};

use strum_macros::{Display, EnumIter};

/// Max sample value written to the PPM header when nothing else is known.
pub const DEFAULT_BIT_DEPTH: u32 = 255;

/// One color component of an [`Rgb`] pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

/// A pixel with three independent channels, nominally in `[0, 1]`.
///
/// Values are not clamped; the codec clamps on write.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::splat(0.0);
    pub const WHITE: Rgb = Rgb::splat(1.0);
    pub const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);
    pub const GREEN: Rgb = Rgb::new(0.0, 1.0, 0.0);
    pub const BLUE: Rgb = Rgb::new(0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn splat(value: f32) -> Self {
        Self::new(value, value, value)
    }

    pub fn channel(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Red => self.r,
            Channel::Green => self.g,
            Channel::Blue => self.b,
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[f32; 3]> for Rgb {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl Add for Rgb {
    type Output = Rgb;

    fn add(self, rhs: Rgb) -> Rgb {
        Rgb::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl Sub for Rgb {
    type Output = Rgb;

    fn sub(self, rhs: Rgb) -> Rgb {
        Rgb::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}

impl Div for Rgb {
    type Output = Rgb;

    fn div(self, rhs: Rgb) -> Rgb {
        Rgb::new(self.r / rhs.r, self.g / rhs.g, self.b / rhs.b)
    }
}

impl Mul<f32> for Rgb {
    type Output = Rgb;

    fn mul(self, rhs: f32) -> Rgb {
        Rgb::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

/// Image dimensions: width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ImageDimensions {
    pub width: usize,
    pub height: usize,
}

impl ImageDimensions {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Total number of pixels (width * height).
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }
}

/// Where an image came from and how long it took to load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageInfo {
    /// File name the image was read from.
    pub name: Option<String>,
    /// Wall-clock time the read started.
    pub read_at: Option<SystemTime>,
    /// Time spent decoding the file.
    pub read_duration: Option<Duration>,
}

/// Owned RGB raster, row-major.
///
/// The pixel buffer always holds exactly `width * height` pixels. Cloning
/// deep-copies the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbImage {
    dimensions: ImageDimensions,
    bit_depth: u32,
    pixels: Vec<Rgb>,
    info: ImageInfo,
}

impl RgbImage {
    /// Black image of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Rgb::BLACK)
    }

    pub fn filled(width: usize, height: usize, color: Rgb) -> Self {
        let dimensions = ImageDimensions::new(width, height);
        Self {
            dimensions,
            bit_depth: DEFAULT_BIT_DEPTH,
            pixels: vec![color; dimensions.pixel_count()],
            info: ImageInfo::default(),
        }
    }

    /// Wrap an existing pixel buffer. Fails if its length is not `width * height`.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Rgb>) -> Result<Self, ImageError> {
        let dimensions = ImageDimensions::new(width, height);
        if pixels.len() != dimensions.pixel_count() {
            return Err(ImageError::PixelCountMismatch {
                expected: dimensions.pixel_count(),
                actual: pixels.len(),
            });
        }

        Ok(Self {
            dimensions,
            bit_depth: DEFAULT_BIT_DEPTH,
            pixels,
            info: ImageInfo::default(),
        })
    }

    pub fn with_bit_depth(mut self, bit_depth: u32) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    pub fn with_info(mut self, info: ImageInfo) -> Self {
        self.info = info;
        self
    }

    pub fn dimensions(&self) -> ImageDimensions {
        self.dimensions
    }

    pub fn width(&self) -> usize {
        self.dimensions.width
    }

    pub fn height(&self) -> usize {
        self.dimensions.height
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    pub fn info(&self) -> &ImageInfo {
        &self.info
    }

    pub fn get(&self, index: usize) -> Rgb {
        self.pixels[index]
    }

    pub fn set(&mut self, index: usize, color: Rgb) {
        self.pixels[index] = color;
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }
}

impl Index<usize> for RgbImage {
    type Output = Rgb;

    fn index(&self, index: usize) -> &Rgb {
        &self.pixels[index]
    }
}

impl IndexMut<usize> for RgbImage {
    fn index_mut(&mut self, index: usize) -> &mut Rgb {
        &mut self.pixels[index]
    }
}
