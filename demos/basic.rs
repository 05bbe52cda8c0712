#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Basic Ridgeline Example
//!
//! Builds a ridgeline figure from a few synthetic distributions and writes
//! the Plotly figure JSON to disk.
//!
//! Run with: `cargo run --example basic`

use ridgeplot::prelude::*;

fn wave(n: usize, center: f64, width: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            center + width * (t * std::f64::consts::TAU * 3.0).sin() * t
        })
        .collect()
}

fn main() {
    println!("Basic Ridgeline Example");
    println!("=======================\n");

    let samples: Vec<Vec<f64>> =
        (0..6).map(|i| wave(400, f64::from(i), 1.0 + 0.2 * f64::from(i))).collect();

    let mut figure = Ridgeplot::new()
        .samples(samples)
        .labels(["Jan", "Feb", "Mar", "Apr", "May", "Jun"])
        .colorscale("viridis")
        .colormode(ColorMode::FillGradient)
        .opacity(0.8)
        .spacing(0.7)
        .build()
        .expect("Failed to build figure");
    figure.set_dimensions(800, 600);

    println!("Traces:    {}", figure.n_traces());
    println!("Baselines: {:?}", figure.baselines());

    let json = figure.to_json_string_pretty().expect("Failed to serialize figure");
    std::fs::write("ridgeplot_basic.json", json).expect("Failed to write JSON");
    println!("Saved: ridgeplot_basic.json");
}
