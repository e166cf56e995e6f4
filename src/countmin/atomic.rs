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

use std::hash::Hash;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::countmin::CountMinSketch;
use crate::countmin::CountMinSketchBuilder;
use crate::countmin::confidence_for_depth;
use crate::countmin::error_slack;
use crate::countmin::relative_error_for_width;
use crate::error::Error;
use crate::hash::HashFamily;

/// A Count-Min sketch that can be updated from many threads at once.
///
/// Sizing, hashing and estimates match [`CountMinSketch`]; counters are
/// [`AtomicU64`]s so `update` takes `&self` and needs no lock. Each counter
/// increment is atomic, so an estimate never observes a half-written counter.
/// An estimate racing with an update of the same item may see some rows
/// incremented and others not, in which case it reports the older count.
///
/// # Examples
///
/// ```
/// use std::thread;
///
/// use countmin::countmin::AtomicCountMinSketch;
///
/// let sketch = AtomicCountMinSketch::new(0.95, 0.01).unwrap();
/// thread::scope(|s| {
///     for _ in 0..4 {
///         s.spawn(|| {
///             for _ in 0..100 {
///                 sketch.update("hits");
///             }
///         });
///     }
/// });
/// assert!(sketch.estimate("hits") >= 400);
/// ```
#[derive(Debug)]
pub struct AtomicCountMinSketch {
    hashes: HashFamily,
    total_weight: AtomicU64,
    counters: Box<[AtomicU64]>,
}

impl AtomicCountMinSketch {
    /// Creates a sketch sized for the given confidence and error rate.
    pub fn new(confidence: f64, error_rate: f64) -> Result<Self, Error> {
        CountMinSketchBuilder::with_accuracy(confidence, error_rate).build_atomic()
    }

    pub(super) fn with_hash_family(hashes: HashFamily) -> Self {
        let num_counters = hashes.width() * hashes.depth();
        AtomicCountMinSketch {
            hashes,
            total_weight: AtomicU64::new(0),
            counters: (0..num_counters).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// Records one occurrence of `item`.
    pub fn update<T: Hash + ?Sized>(&self, item: &T) {
        self.update_with_weight(item, 1);
    }

    /// Records `weight` occurrences of `item`.
    pub fn update_with_weight<T: Hash + ?Sized>(&self, item: &T, weight: u64) {
        saturating_add(&self.total_weight, weight);
        for idx in self.hashes.indices(item) {
            saturating_add(&self.counters[idx], weight);
        }
    }

    /// Returns the estimated number of occurrences of `item`.
    pub fn estimate<T: Hash + ?Sized>(&self, item: &T) -> u64 {
        self.hashes
            .indices(item)
            .map(|idx| self.counters[idx].load(Ordering::Relaxed))
            .min()
            .unwrap_or(0)
    }

    /// Returns a count the true frequency of `item` is at least, with probability
    /// [`confidence()`](Self::confidence).
    pub fn lower_bound<T: Hash + ?Sized>(&self, item: &T) -> u64 {
        self.estimate(item)
            .saturating_sub(error_slack(self.width(), self.total_weight()))
    }

    /// Returns the sum of all weights added so far.
    pub fn total_weight(&self) -> u64 {
        self.total_weight.load(Ordering::Relaxed)
    }

    /// Returns true if nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.total_weight() == 0
    }

    /// Returns the number of counters per row.
    pub fn width(&self) -> usize {
        self.hashes.width()
    }

    /// Returns the number of rows.
    pub fn depth(&self) -> usize {
        self.hashes.depth()
    }

    /// Returns the initial hash seed.
    pub fn seed(&self) -> u32 {
        self.hashes.seed()
    }

    /// Returns `width * depth`.
    pub fn num_counters(&self) -> usize {
        self.counters.len()
    }

    /// Returns the additive error factor, `2 / width`.
    pub fn relative_error(&self) -> f64 {
        relative_error_for_width(self.width())
    }

    /// Returns the probability that an estimate is within
    /// `relative_error() * total_weight()` of the true count, `1 - 2^-depth`.
    pub fn confidence(&self) -> f64 {
        confidence_for_depth(self.depth())
    }

    /// Consumes the sketch and returns a single-threaded one with the same counts.
    pub fn into_inner(self) -> CountMinSketch {
        let counters = self
            .counters
            .into_vec()
            .into_iter()
            .map(AtomicU64::into_inner)
            .collect();
        CountMinSketch::from_parts(self.hashes, self.total_weight.into_inner(), counters)
    }
}

fn saturating_add(counter: &AtomicU64, weight: u64) {
    // The closure never returns None, so the update always succeeds.
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_add(weight))
    });
}
