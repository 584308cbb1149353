pub mod landmark;

pub use landmark::{
    is_finger_extended, is_thumb_extended, Finger, FingerStates, HandPose, Handedness, Landmark,
    LandmarkIndex, Stride,
};
