// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Raw colour storage and its layout.
//!
//! The carver never moves colour data.  It holds the caller's buffer
//! as-is, in whichever encoding it arrived, and reads single
//! normalised channel values out of it by original pixel index.

use crate::error::{CarverError, Result};
use num_traits::{NumCast, ToPrimitive};
use serde::{Deserialize, Serialize};

/// The encoding of one channel sample.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorDepth {
    U8,
    U16,
    F32,
    F64,
}

impl ColorDepth {
    pub fn bits(self) -> u32 {
        match self {
            ColorDepth::U8 => 8,
            ColorDepth::U16 => 16,
            ColorDepth::F32 => 32,
            ColorDepth::F64 => 64,
        }
    }
}

/// Map one sample into `[0, 1]` (integers) or pass it through (floats).
///
/// A sample that cannot be represented as an `f64` cannot come from any
/// of the four supported encodings; debug builds stop right there,
/// release builds read it as `0.0`.
#[inline]
pub fn normalize<S: ToPrimitive>(sample: S, depth: ColorDepth) -> f64 {
    match sample.to_f64() {
        Some(v) => match depth {
            ColorDepth::U8 => v / 255.0,
            ColorDepth::U16 => v / 65535.0,
            ColorDepth::F32 | ColorDepth::F64 => v,
        },
        None => {
            debug_assert!(false, "sample not representable as f64");
            0.0
        }
    }
}

/// The sample types a carver can be built from.
pub trait Sample: Copy + Default + ToPrimitive + NumCast + Send + Sync + 'static {
    const DEPTH: ColorDepth;

    fn wrap(samples: Vec<Self>) -> PixelData;

    fn view(data: &PixelData) -> Option<&[Self]>;
}

macro_rules! sample_impl {
    ($t: ty, $depth: ident) => {
        impl Sample for $t {
            const DEPTH: ColorDepth = ColorDepth::$depth;

            fn wrap(samples: Vec<Self>) -> PixelData {
                PixelData::$depth(samples)
            }

            fn view(data: &PixelData) -> Option<&[Self]> {
                match data {
                    PixelData::$depth(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

sample_impl!(u8, U8);
sample_impl!(u16, U16);
sample_impl!(f32, F32);
sample_impl!(f64, F64);

/// The caller's interleaved, row-major colour buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl PixelData {
    pub fn depth(&self) -> ColorDepth {
        match self {
            PixelData::U8(_) => ColorDepth::U8,
            PixelData::U16(_) => ColorDepth::U16,
            PixelData::F32(_) => ColorDepth::F32,
            PixelData::F64(_) => ColorDepth::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PixelData::U8(v) => v.len(),
            PixelData::U16(v) => v.len(),
            PixelData::F32(v) => v.len(),
            PixelData::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The normalised value of the sample at `offset`.
    #[inline]
    pub fn norm(&self, offset: usize) -> f64 {
        match self {
            PixelData::U8(v) => normalize(v[offset], ColorDepth::U8),
            PixelData::U16(v) => normalize(v[offset], ColorDepth::U16),
            PixelData::F32(v) => normalize(v[offset], ColorDepth::F32),
            PixelData::F64(v) => normalize(v[offset], ColorDepth::F64),
        }
    }
}

/// The image families the read functions know how to compose.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageType {
    Grey,
    GreyA,
    Rgb,
    Rgba,
    Cmy,
    Cmyk,
    Cmyka,
    Custom,
}

impl ImageType {
    /// Channel count and (alpha, black) roles of the standard types.
    fn standard_roles(self) -> Option<(usize, Option<usize>, Option<usize>)> {
        match self {
            ImageType::Grey => Some((1, None, None)),
            ImageType::GreyA => Some((2, Some(1), None)),
            ImageType::Rgb => Some((3, None, None)),
            ImageType::Rgba => Some((4, Some(3), None)),
            ImageType::Cmy => Some((3, None, None)),
            ImageType::Cmyk => Some((4, None, Some(3))),
            ImageType::Cmyka => Some((5, Some(4), Some(3))),
            ImageType::Custom => None,
        }
    }
}

/// How the channels of one pixel are laid out and what they mean.
/// Fixed for the lifetime of a carver.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelLayout {
    image_type: ImageType,
    channels: usize,
    alpha_channel: Option<usize>,
    black_channel: Option<usize>,
}

impl PixelLayout {
    /// The layout of one of the standard image types.  `Custom` needs
    /// explicit roles; use [`PixelLayout::custom`].
    pub fn new(image_type: ImageType) -> Result<Self> {
        let (channels, alpha_channel, black_channel) =
            image_type.standard_roles().ok_or_else(|| {
                CarverError::Configuration(
                    "custom image types need explicit channel roles".to_string(),
                )
            })?;
        Ok(PixelLayout {
            image_type,
            channels,
            alpha_channel,
            black_channel,
        })
    }

    /// A custom layout.  Roles must be distinct, inside the pixel, and
    /// leave at least one colour channel.
    pub fn custom(
        channels: usize,
        alpha_channel: Option<usize>,
        black_channel: Option<usize>,
    ) -> Result<Self> {
        let role_count = alpha_channel.iter().count() + black_channel.iter().count();
        if channels <= role_count {
            return Err(CarverError::Configuration(format!(
                "{} channels leave no colour channel after {} role(s)",
                channels, role_count
            )));
        }
        for role in alpha_channel.iter().chain(black_channel.iter()) {
            if *role >= channels {
                return Err(CarverError::Configuration(format!(
                    "channel role {} outside a {}-channel pixel",
                    role, channels
                )));
            }
        }
        if alpha_channel.is_some() && alpha_channel == black_channel {
            return Err(CarverError::Configuration(
                "alpha and black cannot share a channel".to_string(),
            ));
        }
        Ok(PixelLayout {
            image_type: ImageType::Custom,
            channels,
            alpha_channel,
            black_channel,
        })
    }

    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn alpha_channel(&self) -> Option<usize> {
        self.alpha_channel
    }

    pub fn black_channel(&self) -> Option<usize> {
        self.black_channel
    }

    /// Channels that carry colour, i.e. neither alpha nor black.
    pub(crate) fn color_channels(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.channels)
            .filter(move |k| Some(*k) != self.alpha_channel && Some(*k) != self.black_channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_per_depth() {
        assert_eq!(normalize(255u8, ColorDepth::U8), 1.0);
        assert_eq!(normalize(0u8, ColorDepth::U8), 0.0);
        assert_eq!(normalize(65535u16, ColorDepth::U16), 1.0);
        assert_eq!(normalize(0.25f32, ColorDepth::F32), 0.25);
        assert_eq!(normalize(0.75f64, ColorDepth::F64), 0.75);
    }

    #[test]
    fn pixel_data_reads_by_offset() {
        let data = u16::wrap(vec![0, 65535]);
        assert_eq!(data.depth(), ColorDepth::U16);
        assert_eq!(data.norm(1), 1.0);
        assert!(u8::view(&data).is_none());
        assert_eq!(u16::view(&data).unwrap(), &[0, 65535]);
    }

    #[test]
    fn standard_layouts_carry_roles() {
        let cmyka = PixelLayout::new(ImageType::Cmyka).unwrap();
        assert_eq!(cmyka.channels(), 5);
        assert_eq!(cmyka.alpha_channel(), Some(4));
        assert_eq!(cmyka.black_channel(), Some(3));
        assert_eq!(cmyka.color_channels().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(PixelLayout::new(ImageType::Custom).is_err());
    }

    #[test]
    fn custom_layouts_are_validated() {
        assert!(PixelLayout::custom(2, Some(0), None).is_ok());
        assert!(PixelLayout::custom(2, Some(0), Some(1)).is_err());
        assert!(PixelLayout::custom(3, Some(1), Some(1)).is_err());
        assert!(PixelLayout::custom(3, Some(3), None).is_err());
        let layout = PixelLayout::custom(3, Some(0), None).unwrap();
        assert_eq!(layout.color_channels().collect::<Vec<_>>(), vec![1, 2]);
    }
}
