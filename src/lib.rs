pub mod classifier;
pub mod config;
pub mod features;
pub mod hand;
pub mod logging;
pub mod math;
pub mod recognizer;

pub use classifier::{BatchResult, RecognitionResult};
pub use hand::{HandPose, Landmark, Stride};
pub use recognizer::{build_info, fuse, version, SignRecognizer};
