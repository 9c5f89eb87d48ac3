// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calculate the energy of an image
//!
//! The energy of a visible pixel is a gradient function applied to the
//! finite differences of a read function, both taken over the image at
//! its *current* size: neighbours are whatever is visible next to the
//! pixel now, not what was next to it in the original.
//!
//! Energy functions are a closed set of (read, gradient) pairs plus a
//! null function that makes every pixel cost nothing, for when only
//! the rigidity mask should steer the seams.

use crate::brightness::ReadFunction;
use crate::error::{CarverError, Result};
use crate::gradient::GradientFunction;
use crate::pixel::{PixelData, PixelLayout};
use crate::twodmap::TwoDimensionalMap;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnergyFunction {
    GradNorm,
    GradSumAbs,
    GradXAbs,
    LumaGradNorm,
    LumaGradSumAbs,
    LumaGradXAbs,
    Null,
    GradMaxAbs,
    LumaGradMaxAbs,
}

// Numeric identifiers are the position in this table; names match the
// serde spelling.
const ENERGY_FUNCTIONS: [(EnergyFunction, &str); 9] = [
    (EnergyFunction::GradNorm, "grad-norm"),
    (EnergyFunction::GradSumAbs, "grad-sum-abs"),
    (EnergyFunction::GradXAbs, "grad-x-abs"),
    (EnergyFunction::LumaGradNorm, "luma-grad-norm"),
    (EnergyFunction::LumaGradSumAbs, "luma-grad-sum-abs"),
    (EnergyFunction::LumaGradXAbs, "luma-grad-x-abs"),
    (EnergyFunction::Null, "null"),
    (EnergyFunction::GradMaxAbs, "grad-max-abs"),
    (EnergyFunction::LumaGradMaxAbs, "luma-grad-max-abs"),
];

impl EnergyFunction {
    /// The read and gradient functions this energy is made of, or
    /// `None` for the null energy.
    pub fn parts(self) -> Option<(ReadFunction, GradientFunction)> {
        use EnergyFunction::*;
        use GradientFunction::*;
        match self {
            GradNorm => Some((ReadFunction::Brightness, Norm)),
            GradSumAbs => Some((ReadFunction::Brightness, SumAbs)),
            GradXAbs => Some((ReadFunction::Brightness, XAbs)),
            GradMaxAbs => Some((ReadFunction::Brightness, MaxAbs)),
            LumaGradNorm => Some((ReadFunction::Luma, Norm)),
            LumaGradSumAbs => Some((ReadFunction::Luma, SumAbs)),
            LumaGradXAbs => Some((ReadFunction::Luma, XAbs)),
            LumaGradMaxAbs => Some((ReadFunction::Luma, MaxAbs)),
            Null => None,
        }
    }

    pub fn id(self) -> u32 {
        ENERGY_FUNCTIONS
            .iter()
            .position(|(f, _)| *f == self)
            .unwrap_or_default() as u32
    }

    pub fn name(self) -> &'static str {
        ENERGY_FUNCTIONS
            .iter()
            .find(|(f, _)| *f == self)
            .map_or("null", |(_, name)| name)
    }
}

impl Default for EnergyFunction {
    fn default() -> Self {
        EnergyFunction::GradXAbs
    }
}

impl TryFrom<u32> for EnergyFunction {
    type Error = CarverError;

    fn try_from(id: u32) -> Result<Self> {
        ENERGY_FUNCTIONS
            .get(id as usize)
            .map(|(f, _)| *f)
            .ok_or_else(|| CarverError::Configuration(format!("unknown energy function id {}", id)))
    }
}

impl FromStr for EnergyFunction {
    type Err = CarverError;

    fn from_str(name: &str) -> Result<Self> {
        ENERGY_FUNCTIONS
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(f, _)| *f)
            .ok_or_else(|| {
                CarverError::Configuration(format!("unknown energy function {:?}", name))
            })
    }
}

impl fmt::Display for EnergyFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Centred difference inside, one-sided at both ends, nothing along an
// axis only one pixel long.
#[inline]
fn derivative<F: Fn(usize) -> f64>(len: usize, pos: usize, at: F) -> f64 {
    match pos {
        _ if len < 2 => 0.0,
        0 => at(1) - at(0),
        p if p == len - 1 => at(p) - at(p - 1),
        p => (at(p + 1) - at(p - 1)) / 2.0,
    }
}

#[cfg(not(feature = "threaded"))]
fn fill_rows<F>(target: &mut TwoDimensionalMap<f64>, fill: F)
where
    F: Fn(usize, &mut [f64]) + Sync,
{
    for (y, row) in target.bands_mut(1).enumerate() {
        fill(y, row);
    }
}

// Each worker gets a contiguous band of rows.  Rows never depend on
// each other here, so the result is the same as the sequential fill.
#[cfg(feature = "threaded")]
fn fill_rows<F>(target: &mut TwoDimensionalMap<f64>, fill: F)
where
    F: Fn(usize, &mut [f64]) + Sync,
{
    let (width, height) = target.dimensions();
    let workers = num_cpus::get().max(1);
    let band = (height + workers - 1) / workers;
    let fill = &fill;
    let outcome = crossbeam::scope(|scope| {
        for (b, chunk) in target.bands_mut(band).enumerate() {
            scope.spawn(move |_| {
                for (i, row) in chunk.chunks_mut(width).enumerate() {
                    fill(b * band + i, row);
                }
            });
        }
    });
    if let Err(panic) = outcome {
        std::panic::resume_unwind(panic);
    }
}

/// Compute the energy of every visible pixel.  `visible` maps each
/// visible position to its original pixel index.
pub fn calculate_energy(
    function: EnergyFunction,
    visible: &TwoDimensionalMap<usize>,
    data: &PixelData,
    layout: &PixelLayout,
) -> TwoDimensionalMap<f64> {
    let (width, height) = visible.dimensions();
    let mut energy = TwoDimensionalMap::new(width, height);
    let (read, gradient) = match function.parts() {
        Some(parts) => parts,
        None => return energy,
    };

    let mut intensity = TwoDimensionalMap::new(width, height);
    fill_rows(&mut intensity, |y, row| {
        for (x, cell) in row.iter_mut().enumerate() {
            *cell = read.read(data, layout, visible[(x, y)]);
        }
    });

    let intensity = &intensity;
    fill_rows(&mut energy, |y, row| {
        for (x, cell) in row.iter_mut().enumerate() {
            let gx = derivative(width, x, |x| intensity[(x, y)]);
            let gy = derivative(height, y, |y| intensity[(x, y)]);
            *cell = gradient.apply(gx, gy);
        }
    });
    energy
}
