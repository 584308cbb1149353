use std::hint::black_box;
use std::time::Instant;

use anyhow::Result;
use sign_recognizer::config::RecognizerConfig;
use sign_recognizer::hand::{HandPose, Landmark, LandmarkIndex, Stride};
use sign_recognizer::recognizer::SignRecognizer;

fn synthetic_pose(t: f32) -> HandPose {
    let mut lm = [Landmark::default(); LandmarkIndex::COUNT];
    for (i, p) in lm.iter_mut().enumerate() {
        let a = t + i as f32 * 0.3;
        *p = Landmark::new(0.5 + 0.2 * a.cos(), 0.5 + 0.2 * a.sin(), 0.01 * i as f32);
    }
    HandPose::new(lm)
}

fn main() -> Result<()> {
    let recognizer = SignRecognizer::new(&RecognizerConfig::default())?;
    let poses: Vec<HandPose> = (0..64).map(|i| synthetic_pose(i as f32 * 0.1)).collect();

    // 単発
    let iterations = 10_000;
    let start = Instant::now();
    for i in 0..iterations {
        black_box(recognizer.classify(black_box(&poses[i % poses.len()])));
    }
    let elapsed = start.elapsed();
    let avg_us = elapsed.as_secs_f64() * 1e6 / iterations as f64;
    println!("classify: {:.2}us/pose = {:.0} poses/s", avg_us, 1e6 / avg_us);

    // バッチ
    let flat: Vec<f32> = poses
        .iter()
        .flat_map(|p| p.landmarks().iter().flat_map(|l| [l.x, l.y, l.z]))
        .collect();
    let rounds = 200;
    for (name, parallel) in [("batch", false), ("par_batch", true)] {
        let start = Instant::now();
        for _ in 0..rounds {
            let batch = if parallel {
                recognizer.par_classify_batch(black_box(&flat), Stride::Xyz)
            } else {
                recognizer.classify_batch(black_box(&flat), Stride::Xyz)
            };
            black_box(batch);
        }
        let per_pose = start.elapsed().as_secs_f64() * 1e6 / (rounds * poses.len()) as f64;
        println!("{}: {:.2}us/pose", name, per_pose);
    }

    Ok(())
}
