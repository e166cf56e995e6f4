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

use crate::countmin::CountMinSketchBuilder;
use crate::countmin::confidence_for_depth;
use crate::countmin::error_slack;
use crate::countmin::relative_error_for_width;
use crate::error::Error;
use crate::hash::HashFamily;

/// A Count-Min sketch over `u64` counters.
///
/// Counters form a `depth` x `width` grid stored row-major in one flat buffer. An
/// update adds to one counter per row; an estimate reads the same counters and
/// returns the smallest.
///
/// Counters saturate at `u64::MAX` rather than wrapping, so an estimate is never
/// below the true count.
#[derive(Debug, PartialEq, Eq)]
pub struct CountMinSketch {
    hashes: HashFamily,
    total_weight: u64,
    counters: Box<[u64]>,
}

impl CountMinSketch {
    /// Creates a sketch sized for the given confidence and error rate.
    ///
    /// See [`CountMinSketchBuilder::with_accuracy`] for the sizing rules.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if
    /// either parameter is outside `(0, 1)` or not finite.
    pub fn new(confidence: f64, error_rate: f64) -> Result<Self, Error> {
        CountMinSketchBuilder::with_accuracy(confidence, error_rate).build()
    }

    /// Returns a builder starting from the default accuracy, 95% confidence and a
    /// 1% error rate.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countmin::countmin::CountMinSketch;
    /// let sketch = CountMinSketch::builder().seed(7).build().unwrap();
    /// assert_eq!((sketch.width(), sketch.depth()), (200, 5));
    /// ```
    pub fn builder() -> CountMinSketchBuilder {
        CountMinSketchBuilder::default()
    }

    pub(super) fn with_hash_family(hashes: HashFamily) -> Self {
        let num_counters = hashes.width() * hashes.depth();
        CountMinSketch {
            hashes,
            total_weight: 0,
            counters: vec![0; num_counters].into_boxed_slice(),
        }
    }

    /// Records one occurrence of `item`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countmin::countmin::CountMinSketch;
    /// let mut sketch = CountMinSketch::new(0.95, 0.01).unwrap();
    /// sketch.update("a");
    /// sketch.update(&42u64);
    /// sketch.update(b"raw bytes".as_slice());
    /// assert_eq!(sketch.total_weight(), 3);
    /// ```
    pub fn update<T: Hash + ?Sized>(&mut self, item: &T) {
        self.update_with_weight(item, 1);
    }

    /// Records `weight` occurrences of `item`.
    pub fn update_with_weight<T: Hash + ?Sized>(&mut self, item: &T, weight: u64) {
        self.total_weight = self.total_weight.saturating_add(weight);
        for idx in self.hashes.indices(item) {
            let counter = &mut self.counters[idx];
            *counter = counter.saturating_add(weight);
        }
    }

    /// Returns the estimated number of occurrences of `item`.
    ///
    /// The estimate is never below the true count, and is zero for an item never
    /// added unless every one of its counters was hit by other items.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countmin::countmin::CountMinSketch;
    /// let mut sketch = CountMinSketch::new(0.95, 0.01).unwrap();
    /// for _ in 0..3 {
    ///     sketch.update("a");
    /// }
    /// sketch.update("b");
    ///
    /// assert!(sketch.estimate("a") >= 3);
    /// assert!(sketch.estimate("b") >= 1);
    /// ```
    pub fn estimate<T: Hash + ?Sized>(&self, item: &T) -> u64 {
        self.hashes
            .indices(item)
            .map(|idx| self.counters[idx])
            .min()
            .unwrap_or(0)
    }

    /// Returns a count the true frequency of `item` is at least, with probability
    /// [`confidence()`](Self::confidence).
    pub fn lower_bound<T: Hash + ?Sized>(&self, item: &T) -> u64 {
        self.estimate(item)
            .saturating_sub(error_slack(self.width(), self.total_weight))
    }

    /// Returns the sum of all weights added so far.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Returns true if nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.total_weight == 0
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

    /// Returns the counters of one row.
    ///
    /// # Panics
    ///
    /// Panics if `row >= depth`.
    pub fn row(&self, row: usize) -> &[u64] {
        let width = self.width();
        &self.counters[row * width..(row + 1) * width]
    }

    pub(super) fn from_parts(hashes: HashFamily, total_weight: u64, counters: Box<[u64]>) -> Self {
        assert_eq!(counters.len(), hashes.width() * hashes.depth());
        CountMinSketch {
            hashes,
            total_weight,
            counters,
        }
    }
}
