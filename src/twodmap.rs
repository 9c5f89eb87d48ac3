// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A dense, row-major, two-dimensional field.
//!
//! Everything the carver keeps per pixel lives in one of these: the
//! index buffer that maps visible positions to original pixels, the
//! energy field, the dynamic-programming table of the seam search, the
//! rigidity mask, and the rank buffers of the visibility maps.

use std::ops::{Index, IndexMut};

/// Defines the basic map: an addressable two-dimensional field
/// containing whatever the current stage of processing needs: an
/// `f64` for energies and costs, a `usize` for pixel indices, or a
/// cost + parent address for the seam digraph.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoDimensionalMap<P: Default + Copy> {
    width: usize,
    height: usize,
    data: Vec<P>,
}

impl<P: Default + Copy> TwoDimensionalMap<P> {
    /// Define a new map filled with the content type's default.
    pub fn new(width: usize, height: usize) -> Self {
        TwoDimensionalMap {
            width,
            height,
            data: vec![P::default(); width * height],
        }
    }

    /// Wrap an existing row-major buffer.  Returns `None` if the buffer
    /// length doesn't match the dimensions.
    pub fn from_vec(width: usize, height: usize, data: Vec<P>) -> Option<Self> {
        cq!(
            data.len() == width * height,
            Some(TwoDimensionalMap {
                width,
                height,
                data
            }),
            None
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    // Absolutely, the number one name of this game is keep the index
    // math in a singular location and never, ever mess with it.  This
    // particular variant is the same one used in image.rs.
    fn get_index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    /// Bounds-checked read of a single cell.
    pub fn get(&self, x: usize, y: usize) -> Option<P> {
        cq!(
            x < self.width && y < self.height,
            Some(self.data[self.get_index(x, y)]),
            None
        )
    }

    /// One full row of the map.
    pub fn row(&self, y: usize) -> &[P] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// Mutable bands of `rows` whole rows each, top to bottom.  Bands
    /// are disjoint, which is what lets the threaded energy computation
    /// hand each worker its own.
    pub fn bands_mut(&mut self, rows: usize) -> std::slice::ChunksMut<'_, P> {
        self.data.chunks_mut((rows * self.width).max(1))
    }

    pub fn as_slice(&self) -> &[P] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<P> {
        self.data
    }

    /// The same field with x and y exchanged.  Horizontal seams are
    /// found by searching for vertical seams in the transposed field,
    /// so that every seam search walks contiguous rows.
    pub fn transposed(&self) -> Self {
        let mut flipped = TwoDimensionalMap::new(self.height, self.width);
        for y in 0..self.height {
            for x in 0..self.width {
                flipped[(y, x)] = self[(x, y)];
            }
        }
        flipped
    }
}

impl<P: Default + Copy> Index<(usize, usize)> for TwoDimensionalMap<P> {
    type Output = P;

    /// A convenience addressing mode for getting values.
    fn index(&self, (x, y): (usize, usize)) -> &P {
        let index = self.get_index(x, y);
        &self.data[index]
    }
}

impl<P: Default + Copy> IndexMut<(usize, usize)> for TwoDimensionalMap<P> {
    /// A convenience addressing mode for setting values.
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut P {
        let index = self.get_index(x, y);
        &mut self.data[index]
    }
}

/// One cell of the seam digraph: the accumulated cost of the cheapest
/// path reaching this pixel, and the column it came from.
#[derive(Default, Debug, Copy, Clone)]
pub(crate) struct EnergyAndBackPointer<P: Default + Copy> {
    pub energy: P,
    pub parent: usize,
}

impl<P: Default + Copy> EnergyAndBackPointer<P> {
    pub fn new(energy: P, parent: usize) -> Self {
        EnergyAndBackPointer { energy, parent }
    }
}
