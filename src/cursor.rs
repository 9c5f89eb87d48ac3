// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A read cursor over the visible image.
//!
//! Callers walk the image at whatever size it currently is, in
//! row-major order, without knowing how many passes stand between it
//! and the original.  Each step resolves the visible position to the
//! original pixel it shows.

use crate::pixel::{PixelData, Sample};
use crate::seamcarver::Carver;
use num_traits::NumCast;

pub struct Cursor<'a> {
    carver: &'a Carver,
    next: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(carver: &'a Carver) -> Self {
        Cursor { carver, next: 0 }
    }

    fn total(&self) -> usize {
        self.carver.width() * self.carver.height()
    }
}

/// One visible pixel.
#[derive(Debug, Copy, Clone)]
pub struct PixelRef<'a> {
    x: usize,
    y: usize,
    index: usize,
    channels: usize,
    pixels: &'a PixelData,
}

impl<'a> PixelRef<'a> {
    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    /// The pixel's index in the original image.
    pub fn index(&self) -> usize {
        self.index
    }

    /// One channel, normalised the way the energy functions see it.
    pub fn channel(&self, channel: usize) -> Option<f64> {
        cq!(
            channel < self.channels,
            Some(self.pixels.norm(self.index * self.channels + channel)),
            None
        )
    }

    /// The raw samples of the pixel, if they are of type `S`.
    pub fn samples<S: Sample>(&self) -> Option<&'a [S]> {
        let start = self.index * self.channels;
        S::view(self.pixels).map(|all| &all[start..start + self.channels])
    }

    /// One raw sample converted to `T`, if it fits.
    pub fn sample_as<T: NumCast>(&self, channel: usize) -> Option<T> {
        if channel >= self.channels {
            return None;
        }
        let offset = self.index * self.channels + channel;
        match self.pixels {
            PixelData::U8(v) => T::from(v[offset]),
            PixelData::U16(v) => T::from(v[offset]),
            PixelData::F32(v) => T::from(v[offset]),
            PixelData::F64(v) => T::from(v[offset]),
        }
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = PixelRef<'a>;

    fn next(&mut self) -> Option<PixelRef<'a>> {
        let width = self.carver.width();
        let (x, y) = (self.next % width, self.next / width);
        let index = self.carver.pixel_index(x, y)?;
        self.next += 1;
        Some(PixelRef {
            x,
            y,
            index,
            channels: self.carver.layout().channels(),
            pixels: self.carver.pixels(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total().saturating_sub(self.next);
        (left, Some(left))
    }
}

impl<'a> ExactSizeIterator for Cursor<'a> {}

#[cfg(test)]
mod tests {
    use crate::energy::EnergyFunction;
    use crate::pixel::{ImageType, PixelLayout};
    use crate::seamcarver::Carver;

    fn rgb_carver() -> Carver {
        let data: Vec<u8> = (0..4 * 2 * 3).map(|v| v as u8 * 10).collect();
        Carver::new(data, 4, 2, PixelLayout::new(ImageType::Rgb).unwrap()).unwrap()
    }

    #[test]
    fn walks_the_original_in_row_major_order() {
        let carver = rgb_carver();
        let cursor = carver.cursor();
        assert_eq!(cursor.len(), 8);
        let positions: Vec<(usize, usize, usize)> =
            cursor.map(|p| (p.x(), p.y(), p.index())).collect();
        assert_eq!(positions[0], (0, 0, 0));
        assert_eq!(positions[5], (1, 1, 5));
        assert_eq!(positions.len(), 8);
    }

    #[test]
    fn follows_the_carved_size() {
        let mut carver = rgb_carver();
        carver.set_energy_function(EnergyFunction::Null).unwrap();
        carver.resize_width(3).unwrap();
        let pixels: Vec<_> = carver.cursor().collect();
        assert_eq!(pixels.len(), 6);
        // The null energy takes the leftmost column.
        assert_eq!(pixels[0].index(), 1);
        assert_eq!(pixels[0].samples::<u8>(), Some(&[30u8, 40, 50][..]));
        assert_eq!(pixels[0].sample_as::<u32>(2), Some(50));
        assert_eq!(pixels[0].channel(0), Some(30.0 / 255.0));
        assert_eq!(pixels[0].channel(3), None);
        assert!(pixels[0].samples::<f32>().is_none());
    }
}
