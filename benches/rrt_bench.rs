// MIT License
//
// Copyright (c) 2024 Erik Holum
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use armplanning::planning::{birrt, rrt};
use armplanning::sampler::{JointLimits, RandomSampler};
use armplanning::{Configuration, Distance, PlannerSettings};
use codspeed_criterion_compat::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DOF: usize = 7;

/// Random ball obstacles in joint space, fixed by the seed
fn obstacles(seed: u64, count: usize) -> Vec<(Configuration, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let center: Configuration = (0..DOF).map(|_| rng.gen_range(-2.0..2.0)).collect();
            (center, rng.gen_range(0.3..0.8))
        })
        .collect()
}

fn run(bidirectional: bool, obstacles: &[(Configuration, f64)]) {
    let start = Configuration::from([-2.5; DOF]);
    let goal = Configuration::from([2.5; DOF]);
    let settings = PlannerSettings::default()
        .with_step_size(0.2)
        .with_max_iterations(20_000);
    let mut sampler = RandomSampler::seeded(1, JointLimits::uniform(DOF, -3.0, 3.0).unwrap());
    let mut oracle = |q: &Configuration| {
        obstacles
            .iter()
            .all(|(center, radius)| q.distance(center) > *radius)
    };

    let result = if bidirectional {
        birrt(&start, &goal, &mut sampler, &mut oracle, settings).map(|(outcome, _)| outcome)
    } else {
        rrt(&start, &goal, &mut sampler, &mut oracle, settings).map(|(outcome, _)| outcome)
    };

    assert!(result.is_ok(), "Expected Ok result, got Err");
}

fn bench_rrt(c: &mut Criterion) {
    let obstacles = obstacles(3, 10);
    c.bench_function("rrt", |b| b.iter(|| run(false, &obstacles)));
}

fn bench_birrt(c: &mut Criterion) {
    let obstacles = obstacles(3, 10);
    c.bench_function("birrt", |b| b.iter(|| run(true, &obstacles)));
}

criterion_group!(benches, bench_rrt, bench_birrt);
criterion_main!(benches);
