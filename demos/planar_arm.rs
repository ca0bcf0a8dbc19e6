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

use armplanning::collision::PenetrationOracle;
use armplanning::config::PlanningConfig;
use armplanning::planning::{BiRrtPlanner, RrtPlanner};
use armplanning::projection::{EdgeProjector, ForwardKinematics, LineMesh};
use armplanning::{Configuration, PlanOutcome, PlannerSettings};
use geo::{coord, polygon, EuclideanDistance, Line, Polygon};
use log::info;
use plotly::common::{Fill, Line as PlotLine, Mode};
use plotly::{Layout, Plot, Scatter};
use std::env;
use std::path::Path;

/// Planar arm with two revolute joints at the origin.
struct PlanarArm {
    links: [f64; 2],
}

impl PlanarArm {
    /// Base, elbow and tip positions for joint angles `q`.
    fn joints(&self, q: &Configuration) -> [(f64, f64); 3] {
        let (a, b) = (q[0], q[0] + q[1]);
        let elbow = (self.links[0] * a.cos(), self.links[0] * a.sin());
        let tip = (
            elbow.0 + self.links[1] * b.cos(),
            elbow.1 + self.links[1] * b.sin(),
        );
        [(0.0, 0.0), elbow, tip]
    }

    fn tip(&self, q: &Configuration) -> [f64; 3] {
        let (x, y) = self.joints(q)[2];
        [x, y, 0.0]
    }

    fn segments(&self, q: &Configuration) -> [Line; 2] {
        let [base, elbow, tip] = self.joints(q);
        [
            Line::new(coord! { x: base.0, y: base.1 }, coord! { x: elbow.0, y: elbow.1 }),
            Line::new(coord! { x: elbow.0, y: elbow.1 }, coord! { x: tip.0, y: tip.1 }),
        ]
    }
}

/// Workspace obstacles the arm must keep clear of.
struct World {
    obstacles: Vec<Polygon>,

    // Required clearance between any link and any obstacle
    buffer: f64,
}

impl World {
    /// Positive when a link is closer to an obstacle than the buffer.
    fn penetration(&self, arm: &PlanarArm, q: &Configuration) -> f64 {
        let clearance = arm
            .segments(q)
            .iter()
            .flat_map(|link| {
                self.obstacles
                    .iter()
                    .map(move |obstacle| link.euclidean_distance(obstacle))
            })
            .fold(f64::INFINITY, f64::min);
        self.buffer - clearance
    }
}

// Single trace for a whole mesh, segments separated by gaps
fn mesh_trace(mesh: &LineMesh, color: &'static str, width: f64) -> Box<Scatter<f64, f64>> {
    let mut x = Vec::with_capacity(mesh.segments.len() * 3);
    let mut y = Vec::with_capacity(mesh.segments.len() * 3);
    for [from, to] in &mesh.segments {
        x.extend([mesh.vertices[*from][0], mesh.vertices[*to][0], f64::NAN]);
        y.extend([mesh.vertices[*from][1], mesh.vertices[*to][1], f64::NAN]);
    }
    Scatter::new(x, y)
        .mode(Mode::Lines)
        .line(PlotLine::new().color(color).width(width))
}

fn arm_trace(
    arm: &PlanarArm,
    q: &Configuration,
    color: &'static str,
) -> Box<Scatter<f64, f64>> {
    let (x, y): (Vec<_>, Vec<_>) = arm.joints(q).into_iter().unzip();
    Scatter::new(x, y)
        .mode(Mode::LinesMarkers)
        .line(PlotLine::new().color(color).width(6.0))
}

/// Visualize the tip trace of the search and the solution
fn visualize<K: ForwardKinematics>(
    world: &World,
    arm: &PlanarArm,
    projector: &EdgeProjector<K>,
    start: &Configuration,
    goal: &Configuration,
    algorithm: &str,
) {
    let mut plot = Plot::new();

    for obstacle in &world.obstacles {
        let (x, y): (Vec<_>, Vec<_>) = obstacle
            .exterior()
            .points()
            .map(|p| (p.x(), p.y()))
            .unzip();
        let trace = Scatter::new(x, y)
            .fill(Fill::ToSelf)
            .fill_color("black")
            .line(PlotLine::new().color("black"))
            .opacity(1.0);
        plot.add_trace(trace);
    }

    plot.add_trace(mesh_trace(projector.tree_mesh(), "blue", 1.0));
    plot.add_trace(mesh_trace(projector.path_mesh(), "red", 4.0));
    plot.add_trace(arm_trace(arm, start, "green"));
    plot.add_trace(arm_trace(arm, goal, "orange"));

    let reach = arm.links.iter().sum::<f64>() * 1.1;
    let layout = Layout::new()
        .title(format!("{algorithm} tool tip trace").as_str().into())
        .show_legend(false)
        .width(750)
        .height(750)
        .x_axis(plotly::layout::Axis::new().title("X".into()).range(vec![-reach, reach]))
        .y_axis(plotly::layout::Axis::new().title("Y".into()).range(vec![-reach, reach]));

    plot.set_layout(layout);
    plot.show();
}

pub fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 6 && args.len() != 7 {
        eprintln!("Usage: program start_q0 start_q1 goal_q0 goal_q1 use_birrt [config.yaml]");
        return;
    }

    let parse = |i: usize| -> f64 { args[i].parse().expect("Invalid joint angle") };
    let start = Configuration::from([parse(1), parse(2)]);
    let goal = Configuration::from([parse(3), parse(4)]);
    let use_birrt: bool = args[5]
        .parse()
        .expect("Invalid use_birrt argument; should be true or false");

    let config = match args.get(6) {
        Some(path) => PlanningConfig::load(Path::new(path)).expect("Invalid configuration file"),
        None => PlanningConfig {
            planner: PlannerSettings::default().with_step_size(0.05),
            ..PlanningConfig::default()
        },
    };

    println!("Start configuration: {start}");
    println!("Goal configuration: {goal}");

    let arm = PlanarArm { links: [1.0, 0.8] };
    let world = World {
        obstacles: vec![
            polygon![(x: 0.8, y: 0.4), (x: 1.3, y: 0.4), (x: 1.3, y: 1.0), (x: 0.8, y: 1.0), (x: 0.8, y: 0.4)],
            polygon![(x: -1.4, y: 0.6), (x: -0.9, y: 0.6), (x: -0.9, y: 1.1), (x: -1.4, y: 1.1), (x: -1.4, y: 0.6)],
            polygon![(x: -0.3, y: -1.5), (x: 0.3, y: -1.5), (x: 0.3, y: -1.1), (x: -0.3, y: -1.1), (x: -0.3, y: -1.5)],
        ],
        buffer: 0.05,
    };

    let mut sampler = config.sampler(2).expect("Invalid sampling configuration");
    let mut oracle = PenetrationOracle::new(|q: &Configuration| world.penetration(&arm, q));
    let mut projector = EdgeProjector::new(|q: &Configuration| arm.tip(q));

    let (alg, result) = if use_birrt {
        println!("Finding path with BiRRT");
        let planner = BiRrtPlanner::new(start.clone(), goal.clone(), config.planner.clone());
        let result = planner
            .and_then(|mut planner| planner.solve(&mut sampler, &mut oracle, &mut projector));
        ("BiRRT", result)
    } else {
        println!("Finding path with RRT");
        let planner = RrtPlanner::new(start.clone(), goal.clone(), config.planner.clone());
        let result = planner
            .and_then(|mut planner| planner.solve(&mut sampler, &mut oracle, &mut projector));
        ("RRT", result)
    };

    match result {
        Ok(PlanOutcome::Solved(path)) => {
            info!("Path length {:.3} rad over {} waypoints", path.length(), path.len());
            visualize(&world, &arm, &projector, &start, &goal, alg);
        }
        Ok(PlanOutcome::Exhausted(reason)) => println!("No path found: {reason:?}"),
        Err(e) => println!("Planning failed: {e}"),
    }
}
