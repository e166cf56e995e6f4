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

//! A fixed-memory Count-Min sketch for approximate frequency counting.
//!
//! The sketch estimates how often each item occurred in a stream without storing
//! the items. Memory is fixed when the sketch is built from an accuracy target;
//! estimates never undercount.
//!
//! ```rust
//! use countmin::countmin::CountMinSketch;
//!
//! let mut sketch = CountMinSketch::new(0.95, 0.01).unwrap();
//! sketch.update("a");
//! sketch.update("a");
//! assert!(sketch.estimate("a") >= 2);
//! ```

#![deny(missing_docs)]

pub mod countmin;
pub mod error;
pub mod hash;
