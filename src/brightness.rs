// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Read a pixel as a single intensity
//!
//! Before any gradient can be taken, every pixel has to be reduced to
//! one scalar in `[0, 1]`.  Two readings are provided: plain
//! brightness, the unweighted mean of the colour channels, and luma,
//! the ITU-R BT.709 weighting.  Both understand the subtractive
//! families (CMY, CMYK) and premultiply by alpha when there is one.

use crate::pixel::{ImageType, PixelData, PixelLayout};
use serde::{Deserialize, Serialize};

const LUMA_RED: f64 = 0.2126;
const LUMA_GREEN: f64 = 0.7152;
const LUMA_BLUE: f64 = 0.0722;

/// Pixel -> intensity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadFunction {
    Brightness,
    Luma,
}

impl ReadFunction {
    /// Read the pixel whose first channel sits at `index * channels`.
    #[inline]
    pub fn read(self, data: &PixelData, layout: &PixelLayout, index: usize) -> f64 {
        let base = index * layout.channels();
        let value = match layout.image_type() {
            ImageType::Grey | ImageType::GreyA => data.norm(base),
            ImageType::Rgb
            | ImageType::Rgba
            | ImageType::Cmy
            | ImageType::Cmyk
            | ImageType::Cmyka => {
                let (r, g, b) = (
                    rgb_channel(data, layout, base, 0),
                    rgb_channel(data, layout, base, 1),
                    rgb_channel(data, layout, base, 2),
                );
                match self {
                    ReadFunction::Brightness => (r + g + b) / 3.0,
                    ReadFunction::Luma => LUMA_RED * r + LUMA_GREEN * g + LUMA_BLUE * b,
                }
            }
            ImageType::Custom => custom_brightness(data, layout, base),
        };

        match layout.alpha_channel() {
            Some(alpha) => value * data.norm(base + alpha),
            None => value,
        }
    }
}

// One colour channel of an RGB-family pixel, as additive light.
#[inline]
fn rgb_channel(data: &PixelData, layout: &PixelLayout, base: usize, channel: usize) -> f64 {
    let col = data.norm(base + channel);
    match (layout.image_type(), layout.black_channel()) {
        (ImageType::Cmy, _) => 1.0 - col,
        (ImageType::Cmyk, Some(black)) | (ImageType::Cmyka, Some(black)) => {
            let key = data.norm(base + black);
            1.0 - (1.0 - (1.0 - col) * (1.0 - key))
        }
        _ => col,
    }
}

fn custom_brightness(data: &PixelData, layout: &PixelLayout, base: usize) -> f64 {
    let key = layout
        .black_channel()
        .map_or(0.0, |black| data.norm(base + black));

    let (sum, count) = layout
        .color_channels()
        .map(|k| 1.0 - (1.0 - data.norm(base + k)) * (1.0 - key))
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    let mean = sum / count as f64;

    cq!(layout.black_channel().is_some(), 1.0 - mean, mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Sample;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn grey_reads_directly() {
        let layout = PixelLayout::new(ImageType::Grey).unwrap();
        let data = u8::wrap(vec![0, 51, 255]);
        assert!(close(ReadFunction::Brightness.read(&data, &layout, 1), 0.2));
        assert!(close(ReadFunction::Luma.read(&data, &layout, 2), 1.0));
    }

    #[test]
    fn rgb_brightness_and_luma() {
        let layout = PixelLayout::new(ImageType::Rgb).unwrap();
        let data = f64::wrap(vec![1.0, 0.0, 0.0]);
        assert!(close(ReadFunction::Brightness.read(&data, &layout, 0), 1.0 / 3.0));
        assert!(close(ReadFunction::Luma.read(&data, &layout, 0), 0.2126));
    }

    #[test]
    fn cmy_is_inverted() {
        let layout = PixelLayout::new(ImageType::Cmy).unwrap();
        let data = u8::wrap(vec![0, 0, 0, 255, 255, 255]);
        assert!(close(ReadFunction::Brightness.read(&data, &layout, 0), 1.0));
        assert!(close(ReadFunction::Brightness.read(&data, &layout, 1), 0.0));
    }

    #[test]
    fn cmyk_key_darkens() {
        let layout = PixelLayout::new(ImageType::Cmyk).unwrap();
        let data = f64::wrap(vec![0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 1.0]);
        assert!(close(ReadFunction::Brightness.read(&data, &layout, 0), 0.5));
        assert!(close(ReadFunction::Luma.read(&data, &layout, 1), 0.0));
    }

    #[test]
    fn alpha_premultiplies() {
        let layout = PixelLayout::new(ImageType::Rgba).unwrap();
        let data = f64::wrap(vec![1.0, 1.0, 1.0, 0.25]);
        assert!(close(ReadFunction::Brightness.read(&data, &layout, 0), 0.25));
    }

    #[test]
    fn custom_with_alpha_at_channel_zero() {
        let layout = PixelLayout::custom(3, Some(0), None).unwrap();
        let data = f64::wrap(vec![0.5, 0.2, 0.4]);
        assert!(close(ReadFunction::Brightness.read(&data, &layout, 0), 0.15));
    }

    #[test]
    fn custom_with_black_is_complemented() {
        let layout = PixelLayout::custom(3, None, Some(2)).unwrap();
        let data = f64::wrap(vec![0.0, 0.0, 0.0]);
        assert!(close(ReadFunction::Luma.read(&data, &layout, 0), 1.0));
        let data = f64::wrap(vec![1.0, 1.0, 0.0]);
        assert!(close(ReadFunction::Luma.read(&data, &layout, 0), 0.0));
    }
}
