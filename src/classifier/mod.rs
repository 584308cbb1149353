pub mod gesture;
pub mod network;
pub mod neural;
pub mod params;
pub mod rules;

pub use gesture::{BatchResult, RecognitionResult, UNRECOGNIZED};
pub use network::{Activation, DenseLayer, Network};
pub use neural::{NeuralClassifier, NeuralOutput};
pub use params::{
    ClassifierParameters, LayerParameters, DEFAULT_TRAINED_LABELS, FIXED_LABELS, FIXED_WIDTHS,
};
