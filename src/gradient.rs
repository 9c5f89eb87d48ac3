// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Combine the two directional derivatives of the intensity into one
//! non-negative energy.

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradientFunction {
    /// `sqrt(gx² + gy²)`
    Norm,
    /// `|gx| + |gy|`
    SumAbs,
    /// `|gx|`, the derivative across the seam direction only.
    XAbs,
    /// `max(|gx|, |gy|)`
    MaxAbs,
}

impl GradientFunction {
    #[inline]
    pub fn apply(self, gx: f64, gy: f64) -> f64 {
        match self {
            GradientFunction::Norm => (gx * gx + gy * gy).sqrt(),
            GradientFunction::SumAbs => gx.abs() + gy.abs(),
            GradientFunction::XAbs => gx.abs(),
            GradientFunction::MaxAbs => gx.abs().max(gy.abs()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_functions() {
        assert_eq!(GradientFunction::Norm.apply(3.0, -4.0), 5.0);
        assert_eq!(GradientFunction::SumAbs.apply(3.0, -4.0), 7.0);
        assert_eq!(GradientFunction::XAbs.apply(3.0, -4.0), 3.0);
        assert_eq!(GradientFunction::MaxAbs.apply(3.0, -4.0), 4.0);
        assert_eq!(GradientFunction::Norm.apply(0.0, 0.0), 0.0);
    }
}
