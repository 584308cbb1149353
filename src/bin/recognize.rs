//! 手のランドマークを JSON Lines で受け取り、認識結果を 1 行ずつ出力する。
//!
//! 入力 1 行の形式:
//!   [{"x":0.5,"y":0.9,"z":0.0}, ...]          (片手、21 点)
//!   {"left":[...], "right":[...]}              (両手、どちらも省略可)
//!
//! 使い方: recognize [input.jsonl]   (省略時は stdin)

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use sign_recognizer::classifier::RecognitionResult;
use sign_recognizer::config::Config;
use sign_recognizer::hand::{HandPose, Landmark};
use sign_recognizer::logging::init_tracing;
use sign_recognizer::recognizer::{build_info, SignRecognizer};

const CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputLine {
    Single(Vec<Landmark>),
    Hands {
        #[serde(default)]
        left: Option<Vec<Landmark>>,
        #[serde(default)]
        right: Option<Vec<Landmark>>,
    },
}

/// 21 点でない手は None（未認識扱い）
fn to_pose(landmarks: Option<&Vec<Landmark>>) -> Option<Option<HandPose>> {
    match landmarks {
        None => Some(None),
        Some(lm) => HandPose::from_slice(lm).map(Some),
    }
}

fn classify_line(recognizer: &SignRecognizer, input: &InputLine) -> RecognitionResult {
    match input {
        InputLine::Single(landmarks) => recognizer.classify_landmarks(landmarks),
        InputLine::Hands { left, right } => {
            match (to_pose(left.as_ref()), to_pose(right.as_ref())) {
                (Some(l), Some(r)) => recognizer.classify_hands(l.as_ref(), r.as_ref()),
                _ => RecognitionResult::unrecognized(),
            }
        }
    }
}

fn open_input() -> Result<Box<dyn BufRead>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let file = File::open(&path).with_context(|| format!("failed to open {}", path))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH);
    init_tracing(&config.log_level)?;

    info!("Sign Recognizer ({})", build_info());
    info!(
        model = ?config.recognizer.model,
        recognition_threshold = config.recognizer.recognition_threshold,
        "config"
    );

    let recognizer = SignRecognizer::new(&config.recognizer)?;
    let input = open_input()?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let start = Instant::now();
    let mut frames = 0usize;
    for (lineno, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let result = match serde_json::from_str::<InputLine>(line) {
            Ok(parsed) => classify_line(&recognizer, &parsed),
            Err(e) => {
                warn!(line = lineno + 1, "invalid input: {}", e);
                RecognitionResult::unrecognized()
            }
        };
        writeln!(out, "{}", result.to_json()?)?;
        frames += 1;
    }
    out.flush()?;

    let elapsed = start.elapsed();
    info!(
        frames,
        ms = elapsed.as_secs_f64() * 1000.0,
        "done"
    );
    Ok(())
}
