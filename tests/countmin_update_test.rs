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

use countmin::countmin::CountMinSketch;
use countmin::countmin::CountMinSketchBuilder;
use countmin::error::ErrorKind;
use googletest::assert_that;
use googletest::prelude::contains_substring;
use googletest::prelude::ge;
use googletest::prelude::le;

#[test]
fn test_end_to_end() {
    let mut sketch = CountMinSketch::new(0.95, 0.01).unwrap();
    assert_eq!(sketch.width(), 200);
    assert_eq!(sketch.depth(), 5);

    for _ in 0..3 {
        sketch.update("a");
    }
    sketch.update("b");

    assert_that!(sketch.estimate("a"), ge(3u64));
    assert_that!(sketch.estimate("b"), ge(1u64));
    // "c" was never added; only collisions could lift it above zero.
    assert_that!(sketch.estimate("c"), le(4u64));
    assert_eq!(sketch.total_weight(), 4);
}

#[test]
fn test_sizing_pairs() {
    let cases = [
        (0.95, 0.01, 200, 5),
        (0.99, 0.001, 2000, 7),
        (0.9, 0.1, 20, 4),
        (0.999, 0.05, 40, 10),
    ];
    for (confidence, error_rate, width, depth) in cases {
        let sketch = CountMinSketch::new(confidence, error_rate).unwrap();
        assert_eq!(
            (sketch.width(), sketch.depth()),
            (width, depth),
            "confidence={confidence}, error_rate={error_rate}"
        );
        assert_eq!(sketch.num_counters(), width * depth);
    }
}

#[test]
fn test_zero_for_unseen_values() {
    let sketch = CountMinSketch::new(0.95, 0.01).unwrap();
    for key in ["", "a", "hello world"] {
        assert_eq!(sketch.estimate(key), 0);
    }
    for key in 0..100u64 {
        assert_eq!(sketch.estimate(&key), 0);
    }
    assert_eq!(sketch.estimate(b"\x00\xff".as_slice()), 0);
}

#[test]
fn test_estimate_is_deterministic() {
    let mut sketch = CountMinSketch::new(0.95, 0.01).unwrap();
    for i in 0..500u32 {
        sketch.update(&(i % 17));
    }
    for i in 0..17u32 {
        let first = sketch.estimate(&i);
        for _ in 0..5 {
            assert_eq!(sketch.estimate(&i), first);
        }
    }
}

#[test]
fn test_estimate_is_monotonic() {
    let mut sketch = CountMinSketchBuilder::with_size(32, 3).build().unwrap();
    let mut previous = 0;
    for round in 1..=200u64 {
        sketch.update("tracked");
        sketch.update(&round);
        let current = sketch.estimate("tracked");
        assert_that!(current, ge(previous));
        assert_that!(current, ge(round));
        previous = current;
    }
}

#[test]
fn test_never_underestimates() {
    // A narrow sketch forces plenty of collisions.
    let mut sketch = CountMinSketchBuilder::with_size(16, 3).build().unwrap();
    let mut truth = vec![0u64; 300];
    for step in 0..5000usize {
        let key = (step * 7919) % 300;
        sketch.update(&key);
        truth[key] += 1;
    }
    for (key, &count) in truth.iter().enumerate() {
        assert_that!(sketch.estimate(&key), ge(count));
    }
}

#[test]
fn test_str_and_string_agree() {
    let mut sketch = CountMinSketch::new(0.95, 0.01).unwrap();
    sketch.update("key");
    sketch.update(&String::from("key"));
    assert_eq!(sketch.estimate("key"), 2);
}

#[test]
fn test_seeds_place_items_differently() {
    let mut a = CountMinSketchBuilder::with_size(1024, 2).seed(1).build().unwrap();
    let mut b = CountMinSketchBuilder::with_size(1024, 2).seed(2).build().unwrap();
    a.update("x");
    b.update("x");
    assert_eq!(a.estimate("x"), 1);
    assert_eq!(b.estimate("x"), 1);
    assert_ne!(a, b);
}

#[test]
fn test_invalid_accuracy_is_rejected() {
    let err = CountMinSketch::new(1.0, 0.01).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert_that!(err.message(), contains_substring("confidence"));

    let err = CountMinSketch::new(0.95, -0.01).unwrap_err();
    assert_that!(err.message(), contains_substring("error_rate"));
    assert_that!(err.to_string().as_str(), contains_substring("error_rate: -0.01"));

    let err = CountMinSketchBuilder::with_size(10, 0).build().unwrap_err();
    assert_that!(err.message(), contains_substring("depth"));
}
