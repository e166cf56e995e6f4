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

use std::f64::consts::LN_2;

use log::debug;

use crate::countmin::AtomicCountMinSketch;
use crate::countmin::CountMinSketch;
use crate::error::Error;
use crate::hash::DEFAULT_SEED;
use crate::hash::HashFamily;

/// Row seeds are `base + row` in 32 bits; more rows than this buys nothing.
const MAX_DEPTH: usize = 64;
/// 16 GiB of `u64` counters.
const MAX_NUM_COUNTERS: usize = 1 << 31;

/// Confidence used by [`CountMinSketchBuilder::default`].
pub const DEFAULT_CONFIDENCE: f64 = 0.95;
/// Error rate used by [`CountMinSketchBuilder::default`].
pub const DEFAULT_ERROR_RATE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    Accuracy { confidence: f64, error_rate: f64 },
    Size { width: usize, depth: usize },
}

/// Builder for [`CountMinSketch`] and [`AtomicCountMinSketch`] instances.
///
/// Provides two construction modes:
/// - [`with_accuracy()`](Self::with_accuracy): derive the grid from a confidence and an
///   error rate
/// - [`with_size()`](Self::with_size): give the grid dimensions directly
///
/// [`CountMinSketch::builder()`] starts from the default accuracy
/// ([`DEFAULT_CONFIDENCE`], [`DEFAULT_ERROR_RATE`]); [`accuracy()`](Self::accuracy) and
/// [`size()`](Self::size) switch modes on an existing builder.
///
/// Parameters are validated by [`build()`](Self::build), which reports
/// [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) instead of
/// producing a degenerate sketch.
#[derive(Debug, Clone)]
pub struct CountMinSketchBuilder {
    shape: Shape,
    seed: u32,
}

impl CountMinSketchBuilder {
    /// Sizes the sketch so that estimates overshoot by at most `error_rate` times the
    /// total weight with probability at least `confidence`.
    ///
    /// Both parameters must lie in `(0, 1)`, exclusive.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countmin::countmin::CountMinSketchBuilder;
    /// let sketch = CountMinSketchBuilder::with_accuracy(0.99, 0.001)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(sketch.width(), 2000);
    /// assert_eq!(sketch.depth(), 7);
    /// ```
    pub fn with_accuracy(confidence: f64, error_rate: f64) -> Self {
        CountMinSketchBuilder {
            shape: Shape::Accuracy {
                confidence,
                error_rate,
            },
            seed: DEFAULT_SEED,
        }
    }

    /// Uses an explicit grid of `depth` rows by `width` counters.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countmin::countmin::CountMinSketchBuilder;
    /// let sketch = CountMinSketchBuilder::with_size(1024, 3).build().unwrap();
    /// assert_eq!(sketch.num_counters(), 3072);
    ///
    /// assert!(CountMinSketchBuilder::with_size(0, 3).build().is_err());
    /// ```
    pub fn with_size(width: usize, depth: usize) -> Self {
        CountMinSketchBuilder {
            shape: Shape::Size { width, depth },
            seed: DEFAULT_SEED,
        }
    }

    /// Switches to accuracy mode with the given targets.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countmin::countmin::CountMinSketch;
    /// let sketch = CountMinSketch::builder()
    ///     .accuracy(0.99, 0.1)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!((sketch.width(), sketch.depth()), (20, 7));
    /// ```
    pub fn accuracy(mut self, confidence: f64, error_rate: f64) -> Self {
        self.shape = Shape::Accuracy {
            confidence,
            error_rate,
        };
        self
    }

    /// Switches to an explicit grid of `depth` rows by `width` counters.
    pub fn size(mut self, width: usize, depth: usize) -> Self {
        self.shape = Shape::Size { width, depth };
        self
    }

    /// Sets the initial hash seed (default: `u32::MAX`).
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Builds a single-threaded sketch with all counters at zero.
    pub fn build(self) -> Result<CountMinSketch, Error> {
        self.hash_family().map(CountMinSketch::with_hash_family)
    }

    /// Builds a sketch whose counters can be updated concurrently.
    pub fn build_atomic(self) -> Result<AtomicCountMinSketch, Error> {
        self.hash_family().map(AtomicCountMinSketch::with_hash_family)
    }

    /// Number of counters per row for a target error rate: `ceil(2 / error_rate)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countmin::countmin::CountMinSketchBuilder;
    /// assert_eq!(CountMinSketchBuilder::suggest_width(0.01).unwrap(), 200);
    /// assert!(CountMinSketchBuilder::suggest_width(0.0).is_err());
    /// ```
    pub fn suggest_width(error_rate: f64) -> Result<usize, Error> {
        check_open_unit("error_rate", error_rate)?;
        let width = (2.0 / error_rate).ceil();
        if width > MAX_NUM_COUNTERS as f64 {
            return Err(Error::config_invalid("error_rate is too small")
                .with_context("error_rate", error_rate)
                .with_context("max_width", MAX_NUM_COUNTERS));
        }
        Ok(width as usize)
    }

    /// Number of rows for a target confidence: `ceil(-ln(1 - confidence) / ln(2))`.
    ///
    /// `ln(1 - confidence)` is evaluated with `ln_1p`, so confidences too small to
    /// change `1.0` still give one row.
    ///
    /// Each row independently inflates a given estimate with probability at most 1/2, so
    /// `depth` rows fail together with probability at most `2^-depth`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countmin::countmin::CountMinSketchBuilder;
    /// assert_eq!(CountMinSketchBuilder::suggest_depth(0.95).unwrap(), 5);
    /// assert!(CountMinSketchBuilder::suggest_depth(1.0).is_err());
    /// ```
    pub fn suggest_depth(confidence: f64) -> Result<usize, Error> {
        check_open_unit("confidence", confidence)?;
        let depth = (-(-confidence).ln_1p() / LN_2).ceil();
        // confidence < 1 keeps 1 - confidence >= f64::EPSILON / 2, so depth <= 53;
        // confidence > 0 keeps ln_1p(-confidence) strictly negative.
        assert!(depth >= 1.0, "derived depth {depth} is not positive");
        Ok(depth as usize)
    }

    fn hash_family(&self) -> Result<HashFamily, Error> {
        let (width, depth) = match self.shape {
            Shape::Accuracy {
                confidence,
                error_rate,
            } => (
                Self::suggest_width(error_rate)?,
                Self::suggest_depth(confidence)?,
            ),
            Shape::Size { width, depth } => (width, depth),
        };
        check_dimensions(width, depth)?;

        debug!(
            "building count-min sketch: width={width}, depth={depth}, seed={:#x}, bytes={}",
            self.seed,
            footprint_bytes(width, depth)
        );
        Ok(HashFamily::new(self.seed, width, depth))
    }
}

impl Default for CountMinSketchBuilder {
    fn default() -> Self {
        Self::with_accuracy(DEFAULT_CONFIDENCE, DEFAULT_ERROR_RATE)
    }
}

/// Bytes of counter storage for a `width` x `depth` grid, counted in `u64` so it
/// cannot overflow on 32-bit targets.
fn footprint_bytes(width: usize, depth: usize) -> u64 {
    width as u64 * depth as u64 * size_of::<u64>() as u64
}

fn check_open_unit(name: &'static str, value: f64) -> Result<(), Error> {
    // Also rejects NaN, which fails every comparison.
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(Error::config_invalid(format!("{name} must be in (0, 1), exclusive"))
            .with_context(name, value))
    }
}

fn check_dimensions(width: usize, depth: usize) -> Result<(), Error> {
    if width == 0 {
        return Err(Error::config_invalid("width must be at least 1").with_context("width", width));
    }
    if depth == 0 {
        return Err(Error::config_invalid("depth must be at least 1").with_context("depth", depth));
    }
    if depth > MAX_DEPTH {
        return Err(Error::config_invalid("depth is too large")
            .with_context("depth", depth)
            .with_context("max_depth", MAX_DEPTH));
    }
    match width.checked_mul(depth) {
        Some(n) if n <= MAX_NUM_COUNTERS => Ok(()),
        _ => Err(Error::config_invalid("too many counters")
            .with_context("width", width)
            .with_context("depth", depth)
            .with_context("max_counters", MAX_NUM_COUNTERS)),
    }
}
