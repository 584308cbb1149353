use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::hand::Handedness;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// RUST_LOG が無いときのログレベル
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub recognizer: RecognizerConfig,
}

/// 使用するニューラル分類器
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// 固定重み (210 入力)
    #[default]
    Fixed,
    /// 学習済み重みファイル (126 入力)
    Trained,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecognizerConfig {
    /// 手検出の閾値（保持のみ、呼び出し側が参照する）
    #[serde(default = "default_detection_threshold")]
    pub detection_threshold: f32,
    /// この値以上ならニューラル結果を採用
    #[serde(default = "default_recognition_threshold")]
    pub recognition_threshold: f32,
    #[serde(default)]
    pub model: ModelKind,
    /// 学習済み重み JSON (model = "trained" のとき必須)
    #[serde(default = "default_weights_path")]
    pub weights_path: String,
    /// 片手入力を Compact 特徴量のどちらのスロットに置くか
    #[serde(default)]
    pub hand: Handedness,
}

fn default_log_level() -> String { "info".to_string() }
fn default_detection_threshold() -> f32 { 0.5 }
fn default_recognition_threshold() -> f32 { 0.7 }
fn default_weights_path() -> String { "models/gesture_weights.json".to_string() }

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            detection_threshold: default_detection_threshold(),
            recognition_threshold: default_recognition_threshold(),
            model: ModelKind::default(),
            weights_path: default_weights_path(),
            hand: Handedness::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            recognizer: RecognizerConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// 読めなければ既定値
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("config not loaded, using defaults: {:#}", e);
                Self::default()
            }
        }
    }
}
