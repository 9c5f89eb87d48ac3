// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rigidity mask
//!
//! A per-pixel additive bias on top of the computed energy.  Positive
//! values protect a region from the seams, negative values offer it up
//! first.  Overlays accumulate, so the order in which they are added
//! never matters.
//!
//! The mask is laid out over the *original* image and looked up by
//! original pixel index, so it travels with the pixels as they are
//! carved around.

use crate::brightness::ReadFunction;
use crate::error::{try_buffer, CarverError, Result};
use crate::pixel::{ImageType, PixelData, PixelLayout};
use crate::twodmap::TwoDimensionalMap;

#[derive(Debug, Clone, PartialEq)]
pub struct RigidityMask {
    map: TwoDimensionalMap<f64>,
}

impl RigidityMask {
    /// A neutral (all zero) mask over a `width` × `height` image.
    pub fn new(width: usize, height: usize) -> Self {
        RigidityMask {
            map: TwoDimensionalMap::new(width, height),
        }
    }

    pub(crate) fn try_new(width: usize, height: usize) -> Result<Self> {
        let mut buffer = try_buffer(width * height, "rigidity mask")?;
        buffer.resize(width * height, 0.0);
        let map = TwoDimensionalMap::from_vec(width, height, buffer).ok_or_else(|| {
            CarverError::Allocation("rigidity mask buffer size mismatch".to_string())
        })?;
        Ok(RigidityMask { map })
    }

    pub fn width(&self) -> usize {
        self.map.width()
    }

    pub fn height(&self) -> usize {
        self.map.height()
    }

    /// The accumulated bias at an original-image position.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        self.map.get(x, y)
    }

    #[inline]
    pub(crate) fn at_index(&self, index: usize) -> f64 {
        self.map.as_slice()[index]
    }

    /// True when nothing but zeros has been accumulated.
    pub fn is_neutral(&self) -> bool {
        self.map.as_slice().iter().all(|v| *v == 0.0)
    }

    /// Back to neutral.
    pub fn clear(&mut self) {
        let (width, height) = self.map.dimensions();
        self.map = TwoDimensionalMap::new(width, height);
    }

    // Everything is checked before the first cell is touched, so a bad
    // overlay never half-applies.
    fn check_area(
        &self,
        len: usize,
        per_pixel: usize,
        width: usize,
        height: usize,
        x_off: usize,
        y_off: usize,
    ) -> Result<()> {
        let fits = |offset: usize, size: usize, limit: usize| {
            offset.checked_add(size).map_or(false, |end| end <= limit)
        };
        if !fits(x_off, width, self.width()) || !fits(y_off, height, self.height()) {
            return Err(CarverError::Bounds(format!(
                "overlay {}x{} at ({}, {}) exceeds the {}x{} image",
                width,
                height,
                x_off,
                y_off,
                self.width(),
                self.height()
            )));
        }
        if len != width * height * per_pixel {
            return Err(CarverError::Bounds(format!(
                "overlay buffer holds {} values, {}x{}x{} expected",
                len, width, height, per_pixel
            )));
        }
        Ok(())
    }

    fn accumulate<F>(&mut self, width: usize, height: usize, x_off: usize, y_off: usize, value: F)
    where
        F: Fn(usize) -> f64,
    {
        for y in 0..height {
            for x in 0..width {
                self.map[(x_off + x, y_off + y)] += value(y * width + x);
            }
        }
    }

    /// Add a rectangle of raw bias values at `(x_off, y_off)`.
    pub fn add_area(
        &mut self,
        buffer: &[f64],
        width: usize,
        height: usize,
        x_off: usize,
        y_off: usize,
    ) -> Result<()> {
        self.check_area(buffer.len(), 1, width, height, x_off, y_off)?;
        self.accumulate(width, height, x_off, y_off, |i| buffer[i]);
        Ok(())
    }

    /// Add a whole-image layer of raw bias values.
    pub fn add(&mut self, buffer: &[f64]) -> Result<()> {
        let (width, height) = self.map.dimensions();
        self.add_area(buffer, width, height, 0, 0)
    }

    /// Add a rectangle of 8-bit pixels, read as brightness.  One to
    /// four channels are understood as grey, grey + alpha, RGB, and
    /// RGBA.
    pub fn add_rgb_area(
        &mut self,
        buffer: &[u8],
        channels: usize,
        width: usize,
        height: usize,
        x_off: usize,
        y_off: usize,
    ) -> Result<()> {
        let image_type = match channels {
            1 => ImageType::Grey,
            2 => ImageType::GreyA,
            3 => ImageType::Rgb,
            4 => ImageType::Rgba,
            _ => {
                return Err(CarverError::Configuration(format!(
                    "rigidity overlays take 1 to 4 channels, not {}",
                    channels
                )))
            }
        };
        self.check_area(buffer.len(), channels, width, height, x_off, y_off)?;
        let layout = PixelLayout::new(image_type)?;
        let data = PixelData::U8(buffer.to_vec());
        self.accumulate(width, height, x_off, y_off, |i| {
            ReadFunction::Brightness.read(&data, &layout, i)
        });
        Ok(())
    }

    /// Add a whole-image layer of 8-bit pixels, read as brightness.
    pub fn add_rgb(&mut self, buffer: &[u8], channels: usize) -> Result<()> {
        let (width, height) = self.map.dimensions();
        self.add_rgb_area(buffer, channels, width, height, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlays_accumulate_in_any_order() {
        let patch = [1.0, 2.0, 3.0, 4.0];
        let mut forward = RigidityMask::new(4, 3);
        forward.add_area(&patch, 2, 2, 0, 0).unwrap();
        forward.add_area(&patch, 2, 2, 1, 1).unwrap();
        let mut backward = RigidityMask::new(4, 3);
        backward.add_area(&patch, 2, 2, 1, 1).unwrap();
        backward.add_area(&patch, 2, 2, 0, 0).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.get(1, 1), Some(5.0));
        assert_eq!(forward.get(2, 2), Some(4.0));
        assert_eq!(forward.get(3, 0), Some(0.0));
    }

    #[test]
    fn out_of_bounds_overlay_applies_nothing() {
        let mut mask = RigidityMask::new(4, 3);
        let err = mask.add_area(&[1.0; 4], 2, 2, 3, 0).unwrap_err();
        assert!(matches!(err, CarverError::Bounds(_)));
        assert!(mask.is_neutral());
        let err = mask.add_area(&[1.0; 3], 2, 2, 0, 0).unwrap_err();
        assert!(matches!(err, CarverError::Bounds(_)));
        assert!(mask.is_neutral());
        assert!(mask.add_area(&[1.0], 1, 1, usize::MAX, 0).is_err());
    }

    #[test]
    fn rgb_overlays_are_read_as_brightness() {
        let mut mask = RigidityMask::new(2, 1);
        mask.add_rgb(&[255, 255, 255, 255, 0, 0, 0, 255], 4).unwrap();
        assert_eq!(mask.get(0, 0), Some(1.0));
        assert_eq!(mask.get(1, 0), Some(0.0));
        assert!(mask.add_rgb(&[0; 10], 5).is_err());
    }

    #[test]
    fn clear_restores_neutrality() {
        let mut mask = RigidityMask::new(2, 2);
        mask.add(&[-1.0, 0.0, 0.0, 2.0]).unwrap();
        assert!(!mask.is_neutral());
        mask.clear();
        assert!(mask.is_neutral());
    }
}
