// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Find the cheapest seam through a cost field.
//!
//! The classic dynamic program: every cell accumulates its own cost
//! plus the cheapest of the cells it can be reached from in the row
//! above, remembering which one that was.  The seam ends at the
//! cheapest cell of the last row and is read back through the parent
//! pointers.  Ties always go to the lowest column, so the same field
//! always yields the same seam.

use crate::twodmap::{EnergyAndBackPointer, TwoDimensionalMap};
use itertools::Itertools;
use std::cmp::Ordering;
use std::ops::RangeInclusive;

/// This trait defines how we will return seams from a cost field.
pub trait SeamFinder {
    /// Request a top-to-bottom seam: one x-coordinate per row.  A seam
    /// may move at most `step` columns between adjacent rows.
    fn find_vertical_seam(&self, step: usize) -> Vec<usize>;

    /// Request a left-to-right seam: one y-coordinate per column.
    fn find_horizontal_seam(&self, step: usize) -> Vec<usize>;
}

fn cmp_cost(a: &f64, b: &f64) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

// The columns of the previous row a cell at `x` may descend from.
fn parents(x: usize, step: usize, maxwidth: usize) -> RangeInclusive<usize> {
    x.saturating_sub(step)..=(x + step).min(maxwidth)
}

impl SeamFinder for TwoDimensionalMap<f64> {
    fn find_vertical_seam(&self, step: usize) -> Vec<usize> {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 {
            return Vec::new();
        }
        let step = step.max(1);
        let mut target: TwoDimensionalMap<EnergyAndBackPointer<f64>> =
            TwoDimensionalMap::new(width, height);

        // Populate the first row with their native costs.
        for x in 0..width {
            target[(x, 0)].energy = self[(x, 0)];
        }

        let maxwidth = width - 1;
        // For every subsequent row, populate the target cell with the sum
        // of the *lowest reachable upper cost* and the *x coordinate of
        // that cost*.
        for y in 1..height {
            for x in 0..width {
                let range = parents(x, step, maxwidth);
                let first = *range.start();
                let parent_x = first
                    + range
                        .map(|px| target[(px, y - 1)].energy)
                        .position_min_by(cmp_cost)
                        .unwrap_or(0);
                let parent = target[(parent_x, y - 1)];
                target[(x, y)] = EnergyAndBackPointer::new(self[(x, y)] + parent.energy, parent_x);
            }
        }

        // Find the x coordinate of the bottommost cell with the least
        // cost; position_min_by keeps the first of equals.
        let mut seam_col = (0..width)
            .map(|x| target[(x, height - 1)].energy)
            .position_min_by(cmp_cost)
            .unwrap_or(0);

        // Working backwards, generate the x coordinates of the seam,
        // reverse and return.
        let mut seam = Vec::with_capacity(height);
        for y in (0..height).rev() {
            seam.push(seam_col);
            seam_col = target[(seam_col, y)].parent;
        }
        seam.reverse();
        seam
    }

    fn find_horizontal_seam(&self, step: usize) -> Vec<usize> {
        self.transposed().find_vertical_seam(step)
    }
}
