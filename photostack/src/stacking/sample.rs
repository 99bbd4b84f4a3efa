//! Per-pixel sample sets gathered across all input frames.

use crate::image::{Channel, RgbImage};

/// The values of one pixel position across every frame, split by channel.
///
/// Each channel holds one value per frame in frame order. The buffers are
/// reused between pixels; [`gather`](Self::gather) always starts from empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelSamples {
    pub red: Vec<f32>,
    pub green: Vec<f32>,
    pub blue: Vec<f32>,
}

impl ChannelSamples {
    pub fn with_capacity(frame_count: usize) -> Self {
        Self {
            red: Vec::with_capacity(frame_count),
            green: Vec::with_capacity(frame_count),
            blue: Vec::with_capacity(frame_count),
        }
    }

    /// Refill the sample sets with pixel `index` of every frame.
    ///
    /// All frames must have at least `index + 1` pixels.
    pub fn gather(&mut self, frames: &[RgbImage], index: usize) {
        self.red.clear();
        self.green.clear();
        self.blue.clear();

        for frame in frames {
            let pixel = frame.get(index);
            self.red.push(pixel.r);
            self.green.push(pixel.g);
            self.blue.push(pixel.b);
        }
    }

    pub fn channel(&self, channel: Channel) -> &[f32] {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }

    /// Mutable access to the three sets in red, green, blue order.
    pub fn channels_mut(&mut self) -> [&mut Vec<f32>; 3] {
        [&mut self.red, &mut self.green, &mut self.blue]
    }
}
