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

use std::collections::HashMap;

use countmin::countmin::CountMinSketch;
use rand::Rng;
use rand::SeedableRng;
use rand::distr::Alphanumeric;
use rand::rngs::StdRng;

const NUM_INSERTS: usize = 10_000;
const NUM_SAMPLES: usize = 50;

struct Overestimation {
    max: u64,
    mean: f64,
}

fn random_key(rng: &mut StdRng) -> String {
    let len = rng.random_range(4..12);
    rng.sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Inserts keys drawn from `pool`, then compares the sketch with the exact counts
/// for a sample of the keys that were seen.
fn run_stream(
    sketch: &mut CountMinSketch,
    pool: &[String],
    rng: &mut StdRng,
) -> (HashMap<String, u64>, Overestimation) {
    let mut truth: HashMap<String, u64> = HashMap::new();
    for _ in 0..NUM_INSERTS {
        let key = &pool[rng.random_range(0..pool.len())];
        sketch.update(key.as_str());
        *truth.entry(key.clone()).or_default() += 1;
    }

    let seen: Vec<&String> = truth.keys().collect();
    let mut max = 0;
    let mut sum = 0;
    for _ in 0..NUM_SAMPLES {
        let key = seen[rng.random_range(0..seen.len())];
        let estimate = sketch.estimate(key.as_str());
        let actual = truth[key];
        assert!(
            estimate >= actual,
            "underestimated {key}: {estimate} < {actual}"
        );
        max = max.max(estimate - actual);
        sum += estimate - actual;
    }

    let stats = Overestimation {
        max,
        mean: sum as f64 / NUM_SAMPLES as f64,
    };
    (truth, stats)
}

#[test]
fn test_unique_random_keys_stay_within_error_bound() {
    let error_rate = 0.01;
    let mut sketch = CountMinSketch::new(0.95, error_rate).unwrap();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    let pool: Vec<String> = (0..NUM_INSERTS).map(|_| random_key(&mut rng)).collect();
    let (truth, stats) = run_stream(&mut sketch, &pool, &mut rng);

    let bound = (error_rate * NUM_INSERTS as f64) as u64;
    assert_eq!(sketch.total_weight(), NUM_INSERTS as u64);
    assert!(
        stats.max <= bound,
        "max overestimation {} exceeds {bound}",
        stats.max
    );
    assert!(
        stats.mean < bound as f64 / 2.0,
        "mean overestimation {} is too high",
        stats.mean
    );

    for (key, &count) in &truth {
        assert!(sketch.estimate(key.as_str()) >= count);
        assert!(sketch.lower_bound(key.as_str()) <= sketch.estimate(key.as_str()));
    }
}

#[test]
fn test_repeated_keys_stay_within_error_bound() {
    let error_rate = 0.005;
    let mut sketch = CountMinSketch::new(0.99, error_rate).unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    // A small pool so keys repeat many times.
    let pool: Vec<String> = (0..500).map(|_| random_key(&mut rng)).collect();
    let (truth, stats) = run_stream(&mut sketch, &pool, &mut rng);

    let bound = (error_rate * NUM_INSERTS as f64) as u64;
    assert!(
        stats.max <= bound,
        "max overestimation {} exceeds {bound}",
        stats.max
    );

    let exact = truth
        .iter()
        .filter(|(key, count)| sketch.estimate(key.as_str()) == **count)
        .count();
    assert!(
        exact * 2 > truth.len(),
        "only {exact} of {} keys estimated exactly",
        truth.len()
    );
}

#[test]
fn test_unseen_keys_are_rarely_inflated() {
    let mut sketch = CountMinSketch::new(0.95, 0.001).unwrap();
    for i in 0..1000u32 {
        sketch.update(&i);
    }

    let inflated = (1_000_000..1_001_000u32)
        .filter(|i| sketch.estimate(i) > 0)
        .count();
    assert!(inflated < 50, "{inflated} unseen keys reported nonzero");
}
