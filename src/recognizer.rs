//! 手話ジェスチャー認識
//!
//! ニューラル分類器を先に実行し、信頼度が認識閾値未満のときだけ
//! ルールベース分類器にフォールバックする。

use anyhow::Result;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info, warn};

use crate::classifier::{rules, BatchResult, ClassifierParameters, NeuralClassifier, RecognitionResult};
use crate::config::{ModelKind, RecognizerConfig};
use crate::features::FeatureLayout;
use crate::hand::{HandPose, Handedness, Landmark, Stride};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_VERSION: &str = env!("GIT_VERSION");

pub fn version() -> &'static str {
    VERSION
}

/// バージョン + git describe
pub fn build_info() -> String {
    format!("{} ({})", VERSION, GIT_VERSION)
}

/// ニューラル結果と閾値から最終結果を決める。
///
/// `neural.confidence >= threshold` ならそのまま返す（閾値を含む）。
/// それ以外はルール結果を計算し、信頼度が厳密に大きいときだけ採用する。
pub fn fuse<F>(neural: RecognitionResult, threshold: f32, rules: F) -> RecognitionResult
where
    F: FnOnce() -> RecognitionResult,
{
    if neural.confidence >= threshold {
        return neural;
    }
    let rule = rules();
    if rule.confidence > neural.confidence {
        rule
    } else {
        neural
    }
}

fn load_parameters(config: &RecognizerConfig) -> Result<ClassifierParameters> {
    match config.model {
        ModelKind::Fixed => Ok(ClassifierParameters::fixed()),
        ModelKind::Trained => ClassifierParameters::load_trained(&config.weights_path),
    }
}

/// f32 を bit 列で保持する閾値
#[derive(Debug)]
struct Threshold(AtomicU32);

impl Threshold {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// 認識器。パラメータは構築時に読み込み、以降は読み取り専用
#[derive(Debug)]
pub struct SignRecognizer {
    config: RecognizerConfig,
    neural: NeuralClassifier,
    detection_threshold: Threshold,
    recognition_threshold: Threshold,
}

impl SignRecognizer {
    pub fn new(config: &RecognizerConfig) -> Result<Self> {
        let params = load_parameters(config)?;
        Self::with_parameters(config, params)
    }

    /// 読み込み済みパラメータから構築
    pub fn with_parameters(config: &RecognizerConfig, params: ClassifierParameters) -> Result<Self> {
        let neural = NeuralClassifier::new(params)?;
        info!(
            widths = ?neural.network().widths(),
            layout = ?neural.layout(),
            "recognizer initialized"
        );
        Ok(Self {
            config: config.clone(),
            neural,
            detection_threshold: Threshold::new(config.detection_threshold),
            recognition_threshold: Threshold::new(config.recognition_threshold),
        })
    }

    /// パラメータを読み直す。閾値は現在値を維持
    pub fn initialize(&mut self) -> Result<()> {
        let params = load_parameters(&self.config)?;
        self.neural = NeuralClassifier::new(params)?;
        info!(model = ?self.config.model, "recognizer reinitialized");
        Ok(())
    }

    pub fn neural(&self) -> &NeuralClassifier {
        &self.neural
    }

    pub fn detection_threshold(&self) -> f32 {
        self.detection_threshold.get()
    }

    pub fn set_detection_threshold(&self, value: f32) {
        self.detection_threshold.set(value);
    }

    pub fn recognition_threshold(&self) -> f32 {
        self.recognition_threshold.get()
    }

    pub fn set_recognition_threshold(&self, value: f32) {
        self.recognition_threshold.set(value);
    }

    pub fn classify(&self, pose: &HandPose) -> RecognitionResult {
        let threshold = self.recognition_threshold();
        let neural = self.classify_neural(pose);
        let result = fuse(neural.clone(), threshold, || rules::classify(pose));
        debug!(
            gesture = %result.gesture,
            confidence = result.confidence,
            neural = %neural.gesture,
            neural_confidence = neural.confidence,
            "classified"
        );
        result
    }

    /// 21 点以外は未認識
    pub fn classify_landmarks(&self, landmarks: &[Landmark]) -> RecognitionResult {
        match HandPose::from_slice(landmarks) {
            Some(pose) => self.classify(&pose),
            None => RecognitionResult::unrecognized(),
        }
    }

    /// 両手入力。ルールは右手（無ければ左手）で判定する
    pub fn classify_hands(
        &self,
        left: Option<&HandPose>,
        right: Option<&HandPose>,
    ) -> RecognitionResult {
        let Some(primary) = right.or(left) else {
            return RecognitionResult::unrecognized();
        };
        let neural = self.neural.classify_hands(left, right);
        fuse(neural, self.recognition_threshold(), || rules::classify(primary))
    }

    /// x,y(,z) を詰めた 1 ポーズ分のバッファ
    pub fn classify_flat(&self, data: &[f32], stride: Stride) -> RecognitionResult {
        match HandPose::from_flat(data, stride) {
            Some(pose) => self.classify(&pose),
            None => RecognitionResult::unrecognized(),
        }
    }

    /// 連続したポーズを独立に分類する。端数のフレームは無視
    pub fn classify_batch(&self, data: &[f32], stride: Stride) -> BatchResult {
        let chunk = stride.floats_per_pose();
        warn_partial_frame(data.len(), chunk);
        let results = data
            .chunks_exact(chunk)
            .map(|frame| self.classify_flat(frame, stride))
            .collect();
        BatchResult::new(results)
    }

    /// classify_batch と同じ結果を rayon で並列に計算
    pub fn par_classify_batch(&self, data: &[f32], stride: Stride) -> BatchResult {
        let chunk = stride.floats_per_pose();
        warn_partial_frame(data.len(), chunk);
        let results = data
            .par_chunks_exact(chunk)
            .map(|frame| self.classify_flat(frame, stride))
            .collect();
        BatchResult::new(results)
    }

    fn classify_neural(&self, pose: &HandPose) -> RecognitionResult {
        match (self.neural.layout(), self.config.hand) {
            (FeatureLayout::Compact, Handedness::Left) => self.neural.classify_hands(Some(pose), None),
            _ => self.neural.classify(pose),
        }
    }
}

fn warn_partial_frame(len: usize, chunk: usize) {
    let rest = len % chunk;
    if rest != 0 {
        warn!(
            floats = len,
            trailing = rest,
            "batch buffer ends with a partial frame, ignoring it"
        );
    }
}
