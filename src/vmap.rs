// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Visibility maps
//!
//! A visibility map is the complete record of one carving pass.  For
//! every pixel that was visible when the pass began it holds a rank:
//! `k` if the pixel belonged to the k-th seam of the pass (counting
//! from zero), or the number of seams in the pass if no seam touched
//! it.  A shrinking pass hides every pixel ranked below its seam count;
//! an enlarging pass doubles them.  Given the map, the pass can be
//! repeated on the same image without searching for a single seam.
//!
//! The rank buffer is always row-major in image coordinates, whichever
//! way the seams ran.

use crate::error::{CarverError, Result};
use crate::twodmap::TwoDimensionalMap;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::io::{Read, Write};

const MAGIC: &[u8; 4] = b"LQVM";
const FORMAT_VERSION: u8 = 1;
const HEADER_LEN: usize = 20;

/// Which way the seams of a pass run.  Vertical seams run top to
/// bottom and take the width down; horizontal seams run left to right
/// and take the height down.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

impl Orientation {
    pub fn turn(self) -> Self {
        match self {
            Orientation::Vertical => Orientation::Horizontal,
            Orientation::Horizontal => Orientation::Vertical,
        }
    }

    fn code(self) -> u8 {
        match self {
            Orientation::Vertical => 0,
            Orientation::Horizontal => 1,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Orientation::Vertical),
            1 => Some(Orientation::Horizontal),
            _ => None,
        }
    }
}

/// The narrowest encoding (8, 16 or 32 bits) that holds every rank of
/// a pass of `seams` seams.
pub fn depth_for(seams: u32) -> u32 {
    match seams {
        0..=0xFF => 8,
        0x100..=0xFFFF => 16,
        _ => 32,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VMap {
    buffer: Vec<u32>,
    width: usize,
    height: usize,
    depth: u32,
    orientation: Orientation,
    delta: i32,
}

impl VMap {
    /// Take ownership of a rank buffer.  `delta` is the signed seam
    /// count of the pass: negative for shrinking, positive for
    /// enlarging.
    pub fn new(
        buffer: Vec<u32>,
        width: usize,
        height: usize,
        depth: u32,
        orientation: Orientation,
        delta: i32,
    ) -> Result<Self> {
        if buffer.len() != width * height {
            return Err(CarverError::Bounds(format!(
                "vmap buffer holds {} ranks, {}x{} expected",
                buffer.len(),
                width,
                height
            )));
        }
        if ![8, 16, 32].contains(&depth) {
            return Err(CarverError::Configuration(format!(
                "vmap depth must be 8, 16 or 32 bits, not {}",
                depth
            )));
        }
        let seams = delta.unsigned_abs();
        if depth_for(seams) > depth {
            return Err(CarverError::Configuration(format!(
                "{} seams do not fit in {} bits",
                seams, depth
            )));
        }
        if let Some(rank) = buffer.iter().find(|rank| **rank > seams) {
            return Err(CarverError::Configuration(format!(
                "rank {} in a pass of {} seams",
                rank, seams
            )));
        }
        Ok(VMap {
            buffer,
            width,
            height,
            depth,
            orientation,
            delta,
        })
    }

    // The carver's own passes are correct by construction.
    pub(crate) fn from_ranks(ranks: TwoDimensionalMap<u32>, orientation: Orientation, delta: i32) -> Self {
        let (width, height) = ranks.dimensions();
        VMap {
            buffer: ranks.into_vec(),
            width,
            height,
            depth: depth_for(delta.unsigned_abs()),
            orientation,
            delta,
        }
    }

    pub fn data(&self) -> &[u32] {
        &self.buffer
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn delta(&self) -> i32 {
        self.delta
    }

    /// How many seams the pass carved or inserted.
    pub fn seams(&self) -> u32 {
        self.delta.unsigned_abs()
    }

    pub fn rank(&self, x: usize, y: usize) -> Option<u32> {
        cq!(
            x < self.width && y < self.height,
            Some(self.buffer[y * self.width + x]),
            None
        )
    }

    pub(crate) fn ranks(&self) -> TwoDimensionalMap<u32> {
        TwoDimensionalMap::from_vec(self.width, self.height, self.buffer.clone())
            .unwrap_or_else(|| TwoDimensionalMap::new(self.width, self.height))
    }

    /// Serialise the map: a 20-byte header (magic, version,
    /// orientation, depth, reserved, width, height, delta) followed by
    /// every rank, little-endian, `depth / 8` bytes each.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let dimension = |v: usize| {
            u32::try_from(v).map_err(|_| {
                CarverError::Configuration(format!("dimension {} too large to dump", v))
            })
        };
        let (width, height) = (dimension(self.width)?, dimension(self.height)?);
        let per_rank = (self.depth / 8) as usize;

        let mut out = Vec::with_capacity(HEADER_LEN + self.buffer.len() * per_rank);
        out.extend_from_slice(MAGIC);
        out.push(FORMAT_VERSION);
        out.push(self.orientation.code());
        out.push(self.depth as u8);
        out.push(0);
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend_from_slice(&self.delta.to_le_bytes());
        for rank in &self.buffer {
            out.extend_from_slice(&rank.to_le_bytes()[..per_rank]);
        }
        Ok(out)
    }

    /// Read back what [`VMap::to_bytes`] wrote.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let malformed = |why: &str| CarverError::Configuration(format!("malformed vmap: {}", why));
        if bytes.len() < HEADER_LEN {
            return Err(malformed("truncated header"));
        }
        if &bytes[0..4] != MAGIC {
            return Err(malformed("bad magic"));
        }
        if bytes[4] != FORMAT_VERSION {
            return Err(malformed("unknown format version"));
        }
        let orientation = Orientation::from_code(bytes[5]).ok_or_else(|| malformed("bad orientation"))?;
        let depth = u32::from(bytes[6]);
        if ![8, 16, 32].contains(&depth) {
            return Err(malformed("bad depth"));
        }

        let word = |at: usize| [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]];
        let width = u32::from_le_bytes(word(8)) as usize;
        let height = u32::from_le_bytes(word(12)) as usize;
        let delta = i32::from_le_bytes(word(16));

        let per_rank = (depth / 8) as usize;
        let body = &bytes[HEADER_LEN..];
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(per_rank))
            .ok_or_else(|| malformed("dimensions overflow"))?;
        if body.len() != expected {
            return Err(malformed("rank data does not match the dimensions"));
        }

        let buffer = body
            .chunks_exact(per_rank)
            .map(|chunk| {
                let mut word = [0u8; 4];
                word[..per_rank].copy_from_slice(chunk);
                u32::from_le_bytes(word)
            })
            .collect();
        VMap::new(buffer, width, height, depth, orientation, delta)
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        VMap::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn sample() -> VMap {
        VMap::new(vec![0, 2, 1, 2, 2, 1], 3, 2, 8, Orientation::Vertical, -2).unwrap()
    }

    #[test]
    fn depth_grows_with_seam_count() {
        assert_eq!(depth_for(0), 8);
        assert_eq!(depth_for(255), 8);
        assert_eq!(depth_for(256), 16);
        assert_eq!(depth_for(65536), 32);
    }

    #[test]
    fn construction_is_validated() {
        let bad_len = VMap::new(vec![0; 5], 3, 2, 8, Orientation::Vertical, -1);
        assert!(matches!(bad_len, Err(CarverError::Bounds(_))));
        let bad_depth = VMap::new(vec![0; 6], 3, 2, 12, Orientation::Vertical, -1);
        assert!(matches!(bad_depth, Err(CarverError::Configuration(_))));
        let bad_rank = VMap::new(vec![0, 0, 0, 0, 0, 3], 3, 2, 8, Orientation::Vertical, -2);
        assert!(matches!(bad_rank, Err(CarverError::Configuration(_))));
        let too_many = VMap::new(vec![0; 6], 3, 2, 8, Orientation::Vertical, 300);
        assert!(matches!(too_many, Err(CarverError::Configuration(_))));
    }

    #[test]
    fn accessors() {
        let vmap = sample();
        assert_eq!(vmap.data(), &[0, 2, 1, 2, 2, 1]);
        assert_eq!((vmap.width(), vmap.height()), (3, 2));
        assert_eq!(vmap.depth(), 8);
        assert_eq!(vmap.orientation(), Orientation::Vertical);
        assert_eq!(vmap.delta(), -2);
        assert_eq!(vmap.seams(), 2);
        assert_eq!(vmap.rank(2, 1), Some(1));
        assert_eq!(vmap.rank(3, 1), None);
    }

    #[test]
    fn wide_ranks_survive_the_dump() {
        let ranks: Vec<u32> = (0..=300).collect();
        let vmap = VMap::new(ranks, 301, 1, 16, Orientation::Horizontal, 300).unwrap();
        let bytes = vmap.to_bytes().unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + 301 * 2);
        assert_eq!(VMap::from_bytes(&bytes).unwrap(), vmap);
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        let bytes = sample().to_bytes().unwrap();
        assert!(VMap::from_bytes(&bytes[..10]).is_err());
        assert!(VMap::from_bytes(&bytes[..bytes.len() - 1]).is_err());
        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        assert!(matches!(
            VMap::from_bytes(&bad_magic),
            Err(CarverError::Configuration(_))
        ));
        let mut bad_orientation = bytes;
        bad_orientation[5] = 7;
        assert!(VMap::from_bytes(&bad_orientation).is_err());
    }

    #[test]
    fn dump_to_a_file_and_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pass.vmap");
        sample().write_to(File::create(&path).unwrap()).unwrap();
        let loaded = VMap::read_from(File::open(&path).unwrap()).unwrap();
        assert_eq!(loaded, sample());
    }
}
