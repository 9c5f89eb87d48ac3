// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The carving history: every pass's visibility map, oldest first.

use crate::vmap::VMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VMapList {
    maps: Vec<VMap>,
}

impl VMapList {
    pub fn new() -> Self {
        VMapList { maps: Vec::new() }
    }

    /// Record the next pass.  Insertion order is history order.
    pub fn append(&mut self, vmap: VMap) {
        self.maps.push(vmap);
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&VMap> {
        self.maps.get(index)
    }

    pub fn last(&self) -> Option<&VMap> {
        self.maps.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VMap> {
        self.maps.iter()
    }

    /// Visit every map in history order, stopping at the first visitor
    /// that fails and handing its error back.
    pub fn foreach<F, E>(&self, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&VMap) -> Result<(), E>,
    {
        self.maps.iter().try_for_each(|vmap| visitor(vmap))
    }

    /// Forget every pass after the first `len`.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.maps.truncate(len);
    }
}

impl<'a> IntoIterator for &'a VMapList {
    type Item = &'a VMap;
    type IntoIter = std::slice::Iter<'a, VMap>;

    fn into_iter(self) -> Self::IntoIter {
        self.maps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vmap::Orientation;

    fn vmap(delta: i32) -> VMap {
        let seams = delta.unsigned_abs();
        VMap::new(vec![seams; 4], 2, 2, 8, Orientation::Vertical, delta).unwrap()
    }

    #[test]
    fn append_keeps_arrival_order() {
        let mut list = VMapList::new();
        assert!(list.is_empty());
        list.append(vmap(-1));
        list.append(vmap(2));
        list.append(vmap(-3));
        let deltas: Vec<i32> = list.iter().map(VMap::delta).collect();
        assert_eq!(deltas, vec![-1, 2, -3]);
        assert_eq!(list.last().map(VMap::delta), Some(-3));
    }

    #[test]
    fn foreach_on_empty_list_succeeds() {
        let list = VMapList::new();
        let mut visits = 0;
        let outcome: Result<(), ()> = list.foreach(|_| {
            visits += 1;
            Ok(())
        });
        assert!(outcome.is_ok());
        assert_eq!(visits, 0);
    }

    #[test]
    fn foreach_stops_at_first_failure() {
        let mut list = VMapList::new();
        for delta in &[-1, -2, -3, -4] {
            list.append(vmap(*delta));
        }
        let mut seen = Vec::new();
        let outcome = list.foreach(|vmap| {
            seen.push(vmap.delta());
            cq!(vmap.delta() == -2, Err("stop"), Ok(()))
        });
        assert_eq!(outcome, Err("stop"));
        assert_eq!(seen, vec![-1, -2]);
    }

    #[test]
    fn long_histories_drop_without_recursion() {
        let mut list = VMapList::new();
        for _ in 0..100_000 {
            list.append(vmap(-1));
        }
        assert_eq!(list.len(), 100_000);
        drop(list);
    }
}
