// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Multi-size seam carving.
//!
//! A [`Carver`] owns an image and carves it, seam by seam, to any
//! smaller size (or enlarges it by up to a configured factor per pass)
//! without ever touching the colour data.  Every pass is recorded as a
//! [`VMap`], which can be dumped, loaded into another carver over the
//! same image, or rewound.

#[macro_use]
mod ternary;

pub mod brightness;
pub mod config;
pub mod cursor;
pub mod dynimage;
pub mod energy;
pub mod error;
pub mod gradient;
pub mod pixel;
pub mod rigmask;
pub mod seamcarver;
pub mod seamfinder;
pub mod twodmap;
pub mod vmap;
pub mod vmaplist;

pub use brightness::ReadFunction;
pub use config::{load_config, CarverConfig, ResizeOrder};
pub use cursor::{Cursor, PixelRef};
pub use energy::EnergyFunction;
pub use error::{CarverError, Result};
pub use gradient::GradientFunction;
pub use pixel::{ColorDepth, ImageType, PixelData, PixelLayout, Sample};
pub use rigmask::RigidityMask;
pub use seamcarver::{Carver, CarverState};
pub use seamfinder::SeamFinder;
pub use twodmap::TwoDimensionalMap;
pub use vmap::{Orientation, VMap};
pub use vmaplist::VMapList;
