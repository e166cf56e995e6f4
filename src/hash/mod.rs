// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Row hashing for the Count-Min sketch.
//!
//! A sketch with `depth` rows needs `depth` hash functions that behave as if
//! they were independent. Instead of carrying `depth` distinct algorithms, the
//! family re-seeds one MurmurHash3 x64/128 per row:
//!
//! 1. hash the item with the initial seed to get a per-item base seed;
//! 2. for row `d`, hash the item again with `base + d` and reduce the 64-bit
//!    result modulo `width`.
//!
//! Seed arithmetic wraps in 32 bits. Adding a row index is a bijection on
//! the seed space, so distinct rows always hash with distinct seeds.

use std::hash::Hash;

use mur3::Hasher128;

/// Initial seed used when none is configured: `-1` as an unsigned 32-bit value.
pub const DEFAULT_SEED: u32 = u32::MAX;

/// Hashes `item` with MurmurHash3 x64/128 and returns the first 64-bit half.
#[inline]
fn hash_with_seed<T: Hash + ?Sized>(item: &T, seed: u32) -> u64 {
    let mut hasher = Hasher128::with_seed(seed);
    item.hash(&mut hasher);
    let (h1, _) = hasher.finish128();
    h1
}

/// A family of `depth` seeded hash functions mapping items onto a
/// `depth` x `width` counter grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashFamily {
    seed: u32,
    width: usize,
    depth: usize,
}

impl HashFamily {
    /// Creates a family over a grid of `depth` rows and `width` columns.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `depth` is zero.
    pub fn new(seed: u32, width: usize, depth: usize) -> Self {
        assert!(width > 0, "width must be positive");
        assert!(depth > 0, "depth must be positive");
        HashFamily { seed, width, depth }
    }

    /// Returns the initial seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Returns the number of columns per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the global counter index of `item` for every row, in row order.
    ///
    /// Index `d` of the output lies in `[d * width, (d + 1) * width)`.
    pub fn indices<'a, T: Hash + ?Sized>(&self, item: &'a T) -> Indices<'a, T> {
        Indices {
            family: *self,
            item,
            base_seed: self.base_seed(item),
            row: 0,
        }
    }

    /// Returns the column of `item` within `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= depth`.
    pub fn column<T: Hash + ?Sized>(&self, item: &T, row: usize) -> usize {
        assert!(row < self.depth, "row {row} out of range for depth {}", self.depth);
        self.column_with_base(item, self.base_seed(item), row)
    }

    /// Per-item seed that row seeds are offset from.
    #[inline]
    fn base_seed<T: Hash + ?Sized>(&self, item: &T) -> u32 {
        let base = hash_with_seed(item, self.seed);
        (base ^ (base >> 32)) as u32
    }

    #[inline]
    fn column_with_base<T: Hash + ?Sized>(&self, item: &T, base_seed: u32, row: usize) -> usize {
        let row_seed = base_seed.wrapping_add(row as u32);
        let column = (hash_with_seed(item, row_seed) % self.width as u64) as usize;
        debug_assert!(column < self.width);
        column
    }
}

/// Iterator over the global counter indices of one item.
///
/// Created by [`HashFamily::indices`].
#[derive(Debug)]
pub struct Indices<'a, T: ?Sized> {
    family: HashFamily,
    item: &'a T,
    base_seed: u32,
    row: usize,
}

impl<T: Hash + ?Sized> Iterator for Indices<'_, T> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.row >= self.family.depth {
            return None;
        }
        let row = self.row;
        self.row += 1;
        let column = self.family.column_with_base(self.item, self.base_seed, row);
        Some(row * self.family.width + column)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.family.depth - self.row;
        (remaining, Some(remaining))
    }
}

impl<T: Hash + ?Sized> ExactSizeIterator for Indices<'_, T> {}
