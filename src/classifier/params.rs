//! 分類器パラメータ
//!
//! 固定重み（未学習）版と、学習済み重みを JSON から読む版の2種類。

use anyhow::{bail, Context, Result};
use ndarray::{Array1, Array2};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::features::{FeatureLayout, Scaler};

/// 固定重み版のレイヤー幅 210 → 128 → 64 → 32 → 5
pub const FIXED_WIDTHS: [usize; 5] = [210, 128, 64, 32, 5];
const FIXED_WEIGHT: f32 = 0.05;
const FIXED_FIRST_BIAS: f32 = 0.01;

/// 固定重み版のクラス名（出力インデックス = ID）
pub const FIXED_LABELS: [&str; 5] = ["unrecognized", "hello", "thank-you", "yes", "V"];

/// 学習済み版でラベルが無いときの既定値
pub const DEFAULT_TRAINED_LABELS: [&str; 4] = ["hello", "love", "nice", "thanks"];

/// 1層分の重み
#[derive(Debug, Clone)]
pub struct LayerParameters {
    /// [out, in] 行優先
    pub weights: Array2<f32>,
    pub bias: Array1<f32>,
}

/// 読み込み済みの分類器パラメータ（読み込み後は不変）
#[derive(Debug, Clone)]
pub struct ClassifierParameters {
    pub layers: Vec<LayerParameters>,
    pub scaler: Option<Scaler>,
    pub layout: FeatureLayout,
    pub labels: Vec<String>,
    /// 出力インデックス 0 に対応するID
    pub first_id: u32,
}

#[derive(Debug, Deserialize)]
struct LayerFile {
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ParameterFile {
    layers: Vec<LayerFile>,
    #[serde(default)]
    mean: Option<Vec<f32>>,
    #[serde(default)]
    scale: Option<Vec<f32>>,
    #[serde(default)]
    labels: Option<Vec<String>>,
}

impl ClassifierParameters {
    /// 全重み 0.05、第1層バイアス 0.01、以降のバイアス 0
    pub fn fixed() -> Self {
        let layers = FIXED_WIDTHS
            .windows(2)
            .enumerate()
            .map(|(i, w)| {
                let (input, output) = (w[0], w[1]);
                let bias = if i == 0 { FIXED_FIRST_BIAS } else { 0.0 };
                LayerParameters {
                    weights: Array2::from_elem((output, input), FIXED_WEIGHT),
                    bias: Array1::from_elem(output, bias),
                }
            })
            .collect();

        Self {
            layers,
            scaler: None,
            layout: FeatureLayout::Pairwise,
            labels: FIXED_LABELS.iter().map(|s| s.to_string()).collect(),
            first_id: 0,
        }
    }

    /// 学習済みパラメータを JSON ファイルから読み込む
    pub fn load_trained<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read weights file {}", path.display()))?;
        let params = Self::from_json_str(&content)
            .with_context(|| format!("Invalid weights file {}", path.display()))?;
        info!(
            path = %path.display(),
            layers = params.layers.len(),
            classes = params.labels.len(),
            "trained parameters loaded"
        );
        Ok(params)
    }

    /// 入力幅は Compact 特徴量 (126) 固定
    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: ParameterFile = serde_json::from_str(content)?;
        if file.layers.is_empty() {
            bail!("weights file contains no layers");
        }

        let mut layers = Vec::with_capacity(file.layers.len());
        for (i, layer) in file.layers.into_iter().enumerate() {
            let rows = layer.weights.len();
            let cols = layer.weights.first().map(|r| r.len()).unwrap_or(0);
            if layer.weights.iter().any(|r| r.len() != cols) {
                bail!("layer {}: weight rows have different lengths", i);
            }
            let flat: Vec<f32> = layer.weights.into_iter().flatten().collect();
            let weights = Array2::from_shape_vec((rows, cols), flat)
                .with_context(|| format!("layer {}: bad weight shape", i))?;
            layers.push(LayerParameters {
                weights,
                bias: Array1::from_vec(layer.bias),
            });
        }

        let layout = FeatureLayout::Compact;
        let input_width = layers[0].weights.ncols();
        if input_width != layout.len() {
            bail!(
                "first layer expects {} inputs, compact features have {}",
                input_width,
                layout.len()
            );
        }

        let output_width = layers[layers.len() - 1].weights.nrows();
        let labels = match file.labels {
            Some(labels) if !labels.is_empty() => labels,
            _ => {
                warn!("weights file has no labels, using defaults");
                DEFAULT_TRAINED_LABELS.iter().map(|s| s.to_string()).collect()
            }
        };
        if labels.len() != output_width {
            warn!(
                labels = labels.len(),
                outputs = output_width,
                "label count does not match output width"
            );
        }

        if file.mean.is_none() || file.scale.is_none() {
            warn!("weights file has no mean/scale, inputs are not standardized");
        }

        Ok(Self {
            layers,
            scaler: Some(Scaler::new(input_width, file.mean, file.scale)),
            layout,
            labels,
            first_id: 1,
        })
    }

    pub fn input_width(&self) -> usize {
        self.layers.first().map(|l| l.weights.ncols()).unwrap_or(0)
    }

    pub fn output_width(&self) -> usize {
        self.layers.last().map(|l| l.weights.nrows()).unwrap_or(0)
    }
}
