#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Weighted Histogram Example
//!
//! Bins weighted samples into bars instead of estimating a KDE, with a
//! per-row colormode and deprecated-argument notices printed at the end.
//!
//! Run with: `cargo run --example weighted_histogram`

use ridgeplot::prelude::*;

fn main() {
    println!("Weighted Histogram Example");
    println!("==========================\n");

    let ages: Vec<f64> = (0..200).map(|i| f64::from(18 + (i * 7) % 60)).collect();
    let weights: Vec<f64> = ages.iter().map(|a| 1.0 / a).collect();

    let (figure, notices) = Ridgeplot::new()
        .samples(vec![ages.clone(), ages])
        .sample_weights(SampleWeights::PerTrace(Value::from(vec![vec![1.0; 200], weights])))
        .labels(["unweighted", "weighted by 1/age"])
        .nbins(12)
        .colorscale("plasma")
        .colormode_name("index")
        .build_with_notices()
        .expect("Failed to build figure");

    for trace in &figure.traces {
        println!("{:>20}: baseline {:.4}", trace.label, trace.baseline);
    }
    for notice in &notices {
        println!("deprecated: {notice}");
    }

    let json = figure.to_json_string().expect("Failed to serialize figure");
    std::fs::write("ridgeplot_histogram.json", json).expect("Failed to write JSON");
    println!("\nSaved: ridgeplot_histogram.json");
}
