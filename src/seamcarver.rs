// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seamcarve - The carver engine
//!
//! A carver owns one image and never touches its colour data.  What it
//! carves is the index buffer: a grid the size of the *visible* image
//! in which every cell names the original pixel shown there.  Removing
//! a seam drops one cell per row; inserting one doubles one cell per
//! row.
//!
//! Every pass runs in two halves.  The first searches for all the
//! seams of the pass, one after the other on a scratch copy of the
//! grid, and ranks every pixel by the seam that took it.  The second
//! applies those ranks to the real grid.  The ranks are kept as the
//! pass's visibility map, so the second half can be replayed later
//! (to load a saved pass, or to rewind) without repeating the first.
//!
//! Horizontal passes run on the transposed grid, so the seam search
//! only ever deals with vertical seams.

use crate::config::{CarverConfig, ResizeOrder};
use crate::cursor::Cursor;
use crate::energy::{calculate_energy, EnergyFunction};
use crate::error::{try_buffer, CarverError, Result};
use crate::pixel::{ColorDepth, PixelData, PixelLayout, Sample};
use crate::rigmask::RigidityMask;
use crate::seamfinder::SeamFinder;
use crate::twodmap::TwoDimensionalMap;
use crate::vmap::{Orientation, VMap};
use crate::vmaplist::VMapList;
use itertools::iproduct;
use std::convert::TryFrom;
use tracing::{debug, trace, warn};

/// Where a carver is in its life.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CarverState {
    /// Built, nothing carved yet (or everything rewound).
    Initial,
    /// At rest after at least one pass.
    Ready,
    /// A pass is running.  A carver found in this state outside a pass
    /// was abandoned mid-pass by a panic and refuses further work.
    Carving,
}

#[derive(Debug, Clone)]
pub struct Carver {
    pixels: PixelData,
    layout: PixelLayout,
    original_width: usize,
    original_height: usize,
    visible: TwoDimensionalMap<usize>,
    rigidity: RigidityMask,
    config: CarverConfig,
    history: VMapList,
    state: CarverState,
}

// The map of a fresh image: every position shows its own pixel.
fn identity_grid(width: usize, height: usize) -> Result<TwoDimensionalMap<usize>> {
    let mut buffer = try_buffer(width * height, "index buffer")?;
    buffer.extend(0..width * height);
    TwoDimensionalMap::from_vec(width, height, buffer)
        .ok_or_else(|| CarverError::Allocation("index buffer size mismatch".to_string()))
}

// Drop the cell at `seam[y]` from every row.
fn remove_vertical_seam<P: Default + Copy>(
    map: &TwoDimensionalMap<P>,
    seam: &[usize],
) -> TwoDimensionalMap<P> {
    let (width, height) = map.dimensions();
    let mut data = Vec::with_capacity((width - 1) * height);
    for (y, cut) in seam.iter().enumerate().take(height) {
        let row = map.row(y);
        data.extend_from_slice(&row[..*cut]);
        data.extend_from_slice(&row[cut + 1..]);
    }
    TwoDimensionalMap::from_vec(width - 1, height, data)
        .unwrap_or_else(|| TwoDimensionalMap::new(width - 1, height))
}

/// Apply a pass's ranks to a grid in the same orientation.  Shrinking
/// keeps every cell ranked at or above the seam count; enlarging
/// doubles every cell ranked below it.  Each row must hold exactly one
/// cell per seam below the seam count, or the rows would come out
/// ragged.
fn apply_ranks(
    grid: &TwoDimensionalMap<usize>,
    ranks: &TwoDimensionalMap<u32>,
    delta: i32,
) -> Result<TwoDimensionalMap<usize>> {
    let (width, height) = grid.dimensions();
    if ranks.dimensions() != (width, height) {
        return Err(CarverError::Bounds(format!(
            "ranks of a {}x{} pass cannot apply to a {}x{} grid",
            ranks.width(),
            ranks.height(),
            width,
            height
        )));
    }
    let seams = delta.unsigned_abs();
    for y in 0..height {
        let hits = ranks.row(y).iter().filter(|rank| **rank < seams).count();
        if hits != seams as usize {
            return Err(CarverError::Configuration(format!(
                "row {} is crossed by {} seams, {} expected",
                y, hits, seams
            )));
        }
    }

    let new_width = cq!(
        delta < 0,
        width - seams as usize,
        width + seams as usize
    );
    let mut data = try_buffer(new_width * height, "index buffer")?;
    for y in 0..height {
        for (index, rank) in grid.row(y).iter().zip(ranks.row(y)) {
            match (delta < 0, *rank < seams) {
                (true, true) => {}
                (true, false) | (false, false) => data.push(*index),
                (false, true) => {
                    data.push(*index);
                    data.push(*index);
                }
            }
        }
    }
    TwoDimensionalMap::from_vec(new_width, height, data)
        .ok_or_else(|| CarverError::Bounds("carved rows came out ragged".to_string()))
}

fn orient<P: Default + Copy>(map: TwoDimensionalMap<P>, orientation: Orientation) -> TwoDimensionalMap<P> {
    match orientation {
        Orientation::Vertical => map,
        Orientation::Horizontal => map.transposed(),
    }
}

impl Carver {
    /// Build a carver over a caller's interleaved, row-major buffer of
    /// `width * height * layout.channels()` samples.
    pub fn new<S: Sample>(
        buffer: Vec<S>,
        width: usize,
        height: usize,
        layout: PixelLayout,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CarverError::Bounds(format!(
                "a {}x{} image has no pixels to carve",
                width, height
            )));
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(layout.channels()))
            .ok_or_else(|| CarverError::Bounds("image dimensions overflow".to_string()))?;
        if buffer.len() != expected {
            return Err(CarverError::Bounds(format!(
                "buffer holds {} samples, {}x{}x{} expected",
                buffer.len(),
                width,
                height,
                layout.channels()
            )));
        }

        debug!(width, height, ?layout, "new carver");
        Ok(Carver {
            pixels: S::wrap(buffer),
            layout,
            original_width: width,
            original_height: height,
            visible: identity_grid(width, height)?,
            rigidity: RigidityMask::try_new(width, height)?,
            config: CarverConfig::default(),
            history: VMapList::new(),
            state: CarverState::Initial,
        })
    }

    /// Replace every tunable at once.
    pub fn with_config(mut self, config: CarverConfig) -> Result<Self> {
        self.set_config(config)?;
        Ok(self)
    }

    fn ready(&self) -> Result<()> {
        if self.state == CarverState::Carving {
            warn!("carver abandoned mid-pass");
            return Err(CarverError::State(
                "a previous pass never completed".to_string(),
            ));
        }
        Ok(())
    }

    pub fn state(&self) -> CarverState {
        self.state
    }

    pub fn width(&self) -> usize {
        self.visible.width()
    }

    pub fn height(&self) -> usize {
        self.visible.height()
    }

    pub fn original_width(&self) -> usize {
        self.original_width
    }

    pub fn original_height(&self) -> usize {
        self.original_height
    }

    pub fn layout(&self) -> &PixelLayout {
        &self.layout
    }

    pub fn depth(&self) -> ColorDepth {
        self.pixels.depth()
    }

    /// The caller's colour buffer, exactly as it was handed over.
    pub fn pixels(&self) -> &PixelData {
        &self.pixels
    }

    pub fn config(&self) -> &CarverConfig {
        &self.config
    }

    pub fn vmaps(&self) -> &VMapList {
        &self.history
    }

    pub fn rigidity(&self) -> &RigidityMask {
        &self.rigidity
    }

    /// The original pixel index shown at a visible position.
    pub fn pixel_index(&self, x: usize, y: usize) -> Option<usize> {
        self.visible.get(x, y)
    }

    /// Walk the visible image in row-major order.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(self)
    }

    pub fn set_config(&mut self, config: CarverConfig) -> Result<()> {
        self.ready()?;
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_energy_function(&mut self, function: EnergyFunction) -> Result<()> {
        self.ready()?;
        self.config.energy_function = function;
        Ok(())
    }

    /// Select an energy function by its numeric identifier.
    pub fn set_energy_function_id(&mut self, id: u32) -> Result<()> {
        let function = EnergyFunction::try_from(id)?;
        self.set_energy_function(function)
    }

    pub fn set_rigidity_coefficient(&mut self, coefficient: f64) -> Result<()> {
        self.set_config(CarverConfig {
            rigidity_coefficient: coefficient,
            ..self.config.clone()
        })
    }

    pub fn set_enlargement_step(&mut self, step: f64) -> Result<()> {
        self.set_config(CarverConfig {
            enlargement_step: step,
            ..self.config.clone()
        })
    }

    pub fn set_seam_step(&mut self, step: usize) -> Result<()> {
        self.set_config(CarverConfig {
            seam_step: step,
            ..self.config.clone()
        })
    }

    pub fn set_resize_order(&mut self, order: ResizeOrder) -> Result<()> {
        self.set_config(CarverConfig {
            resize_order: order,
            ..self.config.clone()
        })
    }

    /// Add a rectangle of raw bias values to the rigidity mask, in
    /// original-image coordinates.
    pub fn add_rigidity_area(
        &mut self,
        buffer: &[f64],
        width: usize,
        height: usize,
        x_off: usize,
        y_off: usize,
    ) -> Result<()> {
        self.ready()?;
        self.rigidity.add_area(buffer, width, height, x_off, y_off)
    }

    pub fn add_rigidity(&mut self, buffer: &[f64]) -> Result<()> {
        self.ready()?;
        self.rigidity.add(buffer)
    }

    /// Add a rectangle of 8-bit pixels to the rigidity mask, read as
    /// brightness.
    pub fn add_rigidity_rgb_area(
        &mut self,
        buffer: &[u8],
        channels: usize,
        width: usize,
        height: usize,
        x_off: usize,
        y_off: usize,
    ) -> Result<()> {
        self.ready()?;
        self.rigidity
            .add_rgb_area(buffer, channels, width, height, x_off, y_off)
    }

    pub fn add_rigidity_rgb(&mut self, buffer: &[u8], channels: usize) -> Result<()> {
        self.ready()?;
        self.rigidity.add_rgb(buffer, channels)
    }

    pub fn clear_rigidity(&mut self) -> Result<()> {
        self.ready()?;
        self.rigidity.clear();
        Ok(())
    }

    fn extent(&self, orientation: Orientation) -> usize {
        match orientation {
            Orientation::Vertical => self.width(),
            Orientation::Horizontal => self.height(),
        }
    }

    // The signed seam count that takes `orientation`'s axis to
    // `target`, if that is allowed.
    fn check_target(&self, orientation: Orientation, target: usize) -> Result<i32> {
        let current = self.extent(orientation);
        if target == 0 {
            return Err(CarverError::Bounds(format!(
                "cannot carve a {:?} pass below one pixel",
                orientation
            )));
        }
        if target > current {
            let growth = target - current;
            let limit = ((self.config.enlargement_step - 1.0) * current as f64).floor() as usize;
            let limit = limit.min(current - 1);
            if growth > limit {
                return Err(CarverError::Bounds(format!(
                    "cannot enlarge {} pixels by {} in one pass (limit {})",
                    current, growth, limit
                )));
            }
        }
        let delta = target as i64 - current as i64;
        i32::try_from(delta)
            .map_err(|_| CarverError::Bounds(format!("a pass of {} seams is too large", delta)))
    }

    /// Carve (or enlarge) both axes, in the configured order.  Both
    /// targets are checked before either pass starts.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        self.ready()?;
        let passes = [
            (Orientation::Vertical, self.check_target(Orientation::Vertical, width)?),
            (Orientation::Horizontal, self.check_target(Orientation::Horizontal, height)?),
        ];
        let order = match self.config.resize_order {
            ResizeOrder::WidthFirst => [passes[0], passes[1]],
            ResizeOrder::HeightFirst => [passes[1], passes[0]],
        };
        for (orientation, delta) in order.iter() {
            self.carve(*orientation, *delta)?;
        }
        Ok(())
    }

    pub fn resize_width(&mut self, width: usize) -> Result<()> {
        self.ready()?;
        let delta = self.check_target(Orientation::Vertical, width)?;
        self.carve(Orientation::Vertical, delta)
    }

    pub fn resize_height(&mut self, height: usize) -> Result<()> {
        self.ready()?;
        let delta = self.check_target(Orientation::Horizontal, height)?;
        self.carve(Orientation::Horizontal, delta)
    }

    /// The energy of every visible pixel under the current energy
    /// function, before the rigidity mask is added.
    pub fn energy(&self) -> TwoDimensionalMap<f64> {
        calculate_energy(self.config.energy_function, &self.visible, &self.pixels, &self.layout)
    }

    // Energy plus scaled rigidity, over a grid in working orientation.
    fn cost_field(&self, grid: &TwoDimensionalMap<usize>) -> TwoDimensionalMap<f64> {
        let mut costs = calculate_energy(self.config.energy_function, grid, &self.pixels, &self.layout);
        let coefficient = self.config.rigidity_coefficient;
        if coefficient != 0.0 {
            let (width, height) = grid.dimensions();
            for (y, x) in iproduct!(0..height, 0..width) {
                costs[(x, y)] += self.rigidity.at_index(grid[(x, y)]) * coefficient;
            }
        }
        costs
    }

    // The first half of a pass: find `seams` vertical seams, one after
    // another, and rank every cell of `working` by the seam that took
    // it.  Cells no seam touches keep rank `seams`.
    fn seam_ranks(&self, working: &TwoDimensionalMap<usize>, seams: u32) -> TwoDimensionalMap<u32> {
        let (width, height) = working.dimensions();
        let mut ranks = TwoDimensionalMap::from_vec(width, height, vec![seams; width * height])
            .unwrap_or_else(|| TwoDimensionalMap::new(width, height));

        let mut grid = working.clone();
        // Where each surviving cell sat when the pass began.
        let mut columns =
            TwoDimensionalMap::from_vec(width, height, iproduct!(0..height, 0..width).map(|(_, x)| x).collect())
                .unwrap_or_else(|| TwoDimensionalMap::new(width, height));

        for rank in 0..seams {
            let seam = self.cost_field(&grid).find_vertical_seam(self.config.seam_step);
            trace!(rank, ?seam, "seam");
            for (y, x) in seam.iter().enumerate() {
                ranks[(columns[(*x, y)], y)] = rank;
            }
            grid = remove_vertical_seam(&grid, &seam);
            columns = remove_vertical_seam(&columns, &seam);
        }
        ranks
    }

    // Everything a pass needs, computed without touching the carver.
    fn prepare_pass<F>(
        &self,
        orientation: Orientation,
        delta: i32,
        ranks: F,
    ) -> Result<(TwoDimensionalMap<usize>, VMap)>
    where
        F: FnOnce(&Self, &TwoDimensionalMap<usize>) -> Result<(TwoDimensionalMap<u32>, VMap)>,
    {
        let working = orient(self.visible.clone(), orientation);
        let (working_ranks, vmap) = ranks(self, &working)?;
        let next = apply_ranks(&working, &working_ranks, delta)?;
        Ok((orient(next, orientation), vmap))
    }

    // Run one pass given how to obtain its ranks.  Nothing is committed
    // unless every step succeeds.
    fn run_pass<F>(&mut self, orientation: Orientation, delta: i32, ranks: F) -> Result<VMap>
    where
        F: FnOnce(&Self, &TwoDimensionalMap<usize>) -> Result<(TwoDimensionalMap<u32>, VMap)>,
    {
        let previous = self.state;
        self.state = CarverState::Carving;

        match self.prepare_pass(orientation, delta, ranks) {
            Ok((visible, vmap)) => {
                self.visible = visible;
                self.state = CarverState::Ready;
                debug!(
                    ?orientation,
                    delta,
                    width = self.width(),
                    height = self.height(),
                    "pass complete"
                );
                Ok(vmap)
            }
            Err(err) => {
                self.state = previous;
                warn!(?orientation, delta, %err, "pass rejected");
                Err(err)
            }
        }
    }

    // A fresh pass: search the seams, then apply them.
    fn carve(&mut self, orientation: Orientation, delta: i32) -> Result<()> {
        if delta == 0 {
            return Ok(());
        }
        let vmap = self.run_pass(orientation, delta, |carver, working| {
            let ranks = carver.seam_ranks(working, delta.unsigned_abs());
            let vmap = VMap::from_ranks(orient(ranks.clone(), orientation), orientation, delta);
            Ok((ranks, vmap))
        })?;
        self.history.append(vmap);
        Ok(())
    }

    /// Replay a saved pass on the visible image, without any seam
    /// search.  The map must have been made on an image of exactly the
    /// current visible size.
    pub fn load_vmap(&mut self, vmap: &VMap) -> Result<()> {
        self.ready()?;
        if (vmap.width(), vmap.height()) != (self.width(), self.height()) {
            return Err(CarverError::Bounds(format!(
                "a {}x{} vmap cannot load into a {}x{} image",
                vmap.width(),
                vmap.height(),
                self.width(),
                self.height()
            )));
        }
        let orientation = vmap.orientation();
        let target = self.extent(orientation) as i64 + i64::from(vmap.delta());
        let target = usize::try_from(target).unwrap_or(0);
        self.check_target(orientation, target)?;

        let loaded = self.run_pass(orientation, vmap.delta(), |_, _| {
            Ok((orient(vmap.ranks(), orientation), vmap.clone()))
        })?;
        self.history.append(loaded);
        Ok(())
    }

    /// The visibility map of the most recent pass.
    pub fn dump_vmap(&self) -> Option<&VMap> {
        self.history.last()
    }

    /// Undo the last `passes` passes.  The visible image is rebuilt by
    /// replaying the remaining history from the original, so no seam
    /// is searched for again.
    pub fn rewind(&mut self, passes: usize) -> Result<()> {
        self.ready()?;
        if passes > self.history.len() {
            return Err(CarverError::Bounds(format!(
                "cannot rewind {} passes of a {}-pass history",
                passes,
                self.history.len()
            )));
        }
        let keep = self.history.len() - passes;
        let mut visible = identity_grid(self.original_width, self.original_height)?;
        for vmap in self.history.iter().take(keep) {
            let working = orient(visible, vmap.orientation());
            let next = apply_ranks(&working, &orient(vmap.ranks(), vmap.orientation()), vmap.delta())?;
            visible = orient(next, vmap.orientation());
        }

        self.visible = visible;
        self.history.truncate(keep);
        self.state = cq!(keep == 0, CarverState::Initial, CarverState::Ready);
        debug!(passes, width = self.width(), height = self.height(), "rewound");
        Ok(())
    }

    /// Copy the visible image into `out`, in the encoding the carver
    /// was built with.
    pub fn write_into<S: Sample>(&self, out: &mut [S]) -> Result<()> {
        let source = S::view(&self.pixels).ok_or_else(|| {
            CarverError::Configuration(format!(
                "cannot write {:?} samples from a {:?} image",
                S::DEPTH,
                self.depth()
            ))
        })?;
        let channels = self.layout.channels();
        let needed = self.width() * self.height() * channels;
        if out.len() < needed {
            return Err(CarverError::Bounds(format!(
                "output holds {} samples, {} needed",
                out.len(),
                needed
            )));
        }
        for (target, index) in out.chunks_exact_mut(channels).zip(self.visible.as_slice()) {
            let start = index * channels;
            target.copy_from_slice(&source[start..start + channels]);
        }
        Ok(())
    }

    /// The visible image as a fresh buffer.
    pub fn to_vec<S: Sample>(&self) -> Result<Vec<S>> {
        let needed = self.width() * self.height() * self.layout.channels();
        let mut out = try_buffer(needed, "output buffer")?;
        out.resize(needed, S::default());
        self.write_into(&mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::ImageType;

    const DIMPLE: [u8; 12] = [10, 10, 10, 10, 10, 0, 0, 10, 10, 10, 10, 10];

    fn grey(data: Vec<u8>, width: usize, height: usize) -> Carver {
        Carver::new(data, width, height, PixelLayout::new(ImageType::Grey).unwrap()).unwrap()
    }

    fn ramp(width: usize, height: usize) -> Carver {
        grey((0..width * height).map(|v| (v * 7 % 251) as u8).collect(), width, height)
    }

    #[test]
    fn construction_checks_the_buffer() {
        let layout = PixelLayout::new(ImageType::Rgb).unwrap();
        assert!(matches!(
            Carver::new(vec![0u8; 11], 2, 2, layout),
            Err(CarverError::Bounds(_))
        ));
        assert!(matches!(
            Carver::new(Vec::<u8>::new(), 0, 2, layout),
            Err(CarverError::Bounds(_))
        ));
        let carver = Carver::new(vec![0u8; 12], 2, 2, layout).unwrap();
        assert_eq!(carver.state(), CarverState::Initial);
        assert_eq!((carver.width(), carver.height()), (2, 2));
    }

    #[test]
    fn dimple_loses_a_seam_through_its_middle() {
        let mut carver = grey(DIMPLE.to_vec(), 4, 3);
        carver.set_energy_function(EnergyFunction::GradSumAbs).unwrap();
        carver.resize_width(3).unwrap();
        assert_eq!(carver.state(), CarverState::Ready);
        assert_eq!(carver.to_vec::<u8>().unwrap(), vec![10, 10, 10, 10, 0, 10, 10, 10, 10]);
        let vmap = carver.dump_vmap().unwrap();
        assert_eq!(vmap.data(), &[0, 1, 1, 1, 1, 0, 1, 1, 0, 1, 1, 1]);
        assert_eq!(vmap.delta(), -1);
    }

    #[test]
    fn ranks_follow_the_seam_order() {
        let mut carver = grey(vec![0; 12], 4, 3);
        carver.set_energy_function(EnergyFunction::Null).unwrap();
        carver.resize_width(2).unwrap();
        let vmap = carver.dump_vmap().unwrap();
        assert_eq!(vmap.data(), &[0, 1, 2, 2, 0, 1, 2, 2, 0, 1, 2, 2]);
        assert_eq!(carver.pixel_index(0, 1), Some(6));
    }

    #[test]
    fn horizontal_passes_take_rows() {
        let mut carver = ramp(5, 4);
        carver.resize_height(2).unwrap();
        assert_eq!((carver.width(), carver.height()), (5, 2));
        let vmap = carver.dump_vmap().unwrap();
        assert_eq!(vmap.orientation(), Orientation::Horizontal);
        assert_eq!((vmap.width(), vmap.height()), (5, 4));
        // Every column lost exactly two pixels.
        for x in 0..5 {
            let gone = (0..4).filter(|y| vmap.rank(x, *y).unwrap() < 2).count();
            assert_eq!(gone, 2);
        }
    }

    #[test]
    fn enlargement_doubles_the_cheapest_seams() {
        let mut carver = grey(vec![0; 12], 4, 3);
        carver.set_energy_function(EnergyFunction::Null).unwrap();
        carver.resize_width(6).unwrap();
        assert_eq!(carver.width(), 6);
        assert_eq!(carver.visible.row(0), &[0, 0, 1, 1, 2, 3]);
        assert_eq!(carver.dump_vmap().unwrap().delta(), 2);
    }

    #[test]
    fn enlargement_is_bounded_by_the_step() {
        let mut carver = ramp(4, 3);
        assert!(matches!(carver.resize_width(8), Err(CarverError::Bounds(_))));
        carver.set_enlargement_step(1.5).unwrap();
        assert!(matches!(carver.resize_width(7), Err(CarverError::Bounds(_))));
        carver.resize_width(6).unwrap();
        assert_eq!(carver.width(), 6);
        assert!(carver.set_enlargement_step(2.5).is_err());
    }

    #[test]
    fn failed_resize_changes_nothing() {
        let mut carver = ramp(4, 3);
        assert!(carver.resize(3, 0).is_err());
        assert_eq!((carver.width(), carver.height()), (4, 3));
        assert!(carver.vmaps().is_empty());
        assert_eq!(carver.state(), CarverState::Initial);
    }

    #[test]
    fn resize_order_is_honoured() {
        let mut carver = ramp(6, 5);
        carver.set_resize_order(ResizeOrder::HeightFirst).unwrap();
        carver.resize(4, 3).unwrap();
        let orientations: Vec<Orientation> = carver.vmaps().iter().map(VMap::orientation).collect();
        assert_eq!(orientations, vec![Orientation::Horizontal, Orientation::Vertical]);
        assert_eq!((carver.width(), carver.height()), (4, 3));
    }

    #[test]
    fn rewind_replays_the_remaining_history() {
        let mut carver = ramp(8, 6);
        carver.resize_width(6).unwrap();
        let after_first = carver.to_vec::<u8>().unwrap();
        carver.resize_height(4).unwrap();
        carver.resize_width(7).unwrap();
        assert_eq!(carver.vmaps().len(), 3);

        carver.rewind(2).unwrap();
        assert_eq!((carver.width(), carver.height()), (6, 6));
        assert_eq!(carver.to_vec::<u8>().unwrap(), after_first);
        assert_eq!(carver.state(), CarverState::Ready);

        carver.rewind(1).unwrap();
        assert_eq!((carver.width(), carver.height()), (8, 6));
        assert_eq!(carver.state(), CarverState::Initial);
        assert!(carver.rewind(1).is_err());
    }

    #[test]
    fn load_rejects_mismatched_maps() {
        let mut source = ramp(6, 4);
        source.resize_width(5).unwrap();
        let vmap = source.dump_vmap().unwrap().clone();

        let mut other = ramp(6, 5);
        assert!(matches!(other.load_vmap(&vmap), Err(CarverError::Bounds(_))));
        assert!(other.vmaps().is_empty());
    }

    #[test]
    fn load_rejects_ragged_maps() {
        // Row 1 is crossed twice, row 0 not at all.
        let vmap = VMap::new(vec![1, 1, 1, 0, 0, 1], 3, 2, 8, Orientation::Vertical, -1).unwrap();
        let mut carver = ramp(3, 2);
        assert!(matches!(carver.load_vmap(&vmap), Err(CarverError::Configuration(_))));
        assert_eq!(carver.state(), CarverState::Initial);
        assert_eq!(carver.width(), 3);
    }

    #[test]
    fn output_must_match_depth_and_size() {
        let carver = ramp(3, 2);
        let mut wrong_depth = vec![0u16; 6];
        assert!(matches!(
            carver.write_into(&mut wrong_depth),
            Err(CarverError::Configuration(_))
        ));
        let mut too_small = vec![0u8; 5];
        assert!(matches!(carver.write_into(&mut too_small), Err(CarverError::Bounds(_))));
    }

    #[test]
    fn unknown_energy_id_leaves_config_alone() {
        let mut carver = ramp(3, 2);
        carver.set_energy_function(EnergyFunction::LumaGradNorm).unwrap();
        assert!(matches!(
            carver.set_energy_function_id(99),
            Err(CarverError::Configuration(_))
        ));
        assert_eq!(carver.config().energy_function, EnergyFunction::LumaGradNorm);
        carver.set_energy_function_id(6).unwrap();
        assert_eq!(carver.config().energy_function, EnergyFunction::Null);
    }

    #[test]
    fn abandoned_pass_poisons_the_carver() {
        let mut carver = ramp(3, 2);
        carver.state = CarverState::Carving;
        assert!(matches!(carver.resize_width(2), Err(CarverError::State(_))));
        assert!(matches!(carver.add_rigidity(&[0.0; 6]), Err(CarverError::State(_))));
    }
}
