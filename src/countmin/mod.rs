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

//! Count-Min sketch implementation for frequency estimation.
//!
//! The Count-Min sketch answers "how many times have I seen X" in fixed memory.
//! Estimates never fall below the true count; they overshoot it by at most
//! `relative_error * total_weight` with probability at least `confidence`.
//!
//! # Usage
//!
//! ```rust
//! use countmin::countmin::CountMinSketch;
//!
//! let mut sketch = CountMinSketch::new(0.95, 0.01).unwrap();
//! assert_eq!(sketch.width(), 200);
//! assert_eq!(sketch.depth(), 5);
//!
//! sketch.update("apple");
//! sketch.update_with_weight("banana", 3);
//!
//! assert!(sketch.estimate("apple") >= 1);
//! assert!(sketch.estimate("banana") >= 3);
//! ```
//!
//! # Configuration
//!
//! ```rust
//! use countmin::countmin::CountMinSketchBuilder;
//!
//! let width = CountMinSketchBuilder::suggest_width(0.001).unwrap();
//! let depth = CountMinSketchBuilder::suggest_depth(0.99).unwrap();
//! assert_eq!((width, depth), (2000, 7));
//!
//! let sketch = CountMinSketchBuilder::with_size(width, depth)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//! assert_eq!(sketch.num_counters(), 14_000);
//! ```
//!
//! # Concurrent updates
//!
//! [`AtomicCountMinSketch`] keeps its counters in atomics so it can be shared
//! between threads and updated through `&self`.

mod atomic;
mod builder;
mod sketch;

pub use self::atomic::AtomicCountMinSketch;
pub use self::builder::CountMinSketchBuilder;
pub use self::builder::DEFAULT_CONFIDENCE;
pub use self::builder::DEFAULT_ERROR_RATE;
pub use self::sketch::CountMinSketch;

/// Additive error factor bought by `width` counters per row.
fn relative_error_for_width(width: usize) -> f64 {
    2.0 / width as f64
}

/// Probability that an estimate stays within the error bound with `depth` rows.
fn confidence_for_depth(depth: usize) -> f64 {
    1.0 - 0.5f64.powi(depth as i32)
}

/// Largest amount an estimate may exceed the true count at the configured confidence.
fn error_slack(width: usize, total_weight: u64) -> u64 {
    (relative_error_for_width(width) * total_weight as f64).ceil() as u64
}
