pub mod extract;
pub mod geometry;
pub mod normalize;

pub use extract::{
    extract, extract_compact, hand_compact, palm_centroid, FeatureLayout, COMPACT_LEN,
    GEOMETRIC_LEN, HAND_COMPACT_LEN, PAIRWISE_LEN,
};
pub use geometry::{distance, joint_angle};
pub use normalize::{self_normalize, Scaler, MIN_STDDEV};
