use anyhow::Result;

use crate::features::{extract, extract_compact, FeatureLayout};
use crate::hand::HandPose;
use crate::math::{argmax, softmax};

use super::gesture::RecognitionResult;
use super::network::Network;
use super::params::ClassifierParameters;

/// ネットワークの生出力と確率分布
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralOutput {
    /// 生スコアの argmax
    pub index: usize,
    /// softmax 後の index の確率
    pub score: f32,
    pub probs: Vec<f32>,
    pub logits: Vec<f32>,
}

/// 特徴量抽出 + 全結合ネットワーク + 判定
#[derive(Debug, Clone)]
pub struct NeuralClassifier {
    network: Network,
    layout: FeatureLayout,
    labels: Vec<String>,
    first_id: u32,
}

impl NeuralClassifier {
    pub fn new(params: ClassifierParameters) -> Result<Self> {
        let ClassifierParameters {
            layers,
            scaler,
            layout,
            labels,
            first_id,
        } = params;

        let network = Network::from_layers(
            layers.into_iter().map(|l| (l.weights, l.bias)).collect(),
            scaler,
        )?;

        Ok(Self {
            network,
            layout,
            labels,
            first_id,
        })
    }

    pub fn layout(&self) -> FeatureLayout {
        self.layout
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// 生スコアの argmax で判定し、softmax を信頼度として添える。
    /// 入力長が合わない、または出力が有限値でなければ None
    pub fn infer(&self, features: &[f32]) -> Option<NeuralOutput> {
        let logits = self.network.forward(features)?;
        // 巨大な座標で距離が inf になると softmax が NaN を返す
        if !logits.iter().all(|v| v.is_finite()) {
            return None;
        }
        let index = argmax(&logits)?;
        let probs = softmax(&logits);
        let score = probs[index];
        if !score.is_finite() {
            return None;
        }
        Some(NeuralOutput {
            index,
            score,
            probs,
            logits,
        })
    }

    pub fn classify_features(&self, features: &[f32]) -> RecognitionResult {
        match self.infer(features) {
            Some(out) => self.to_result(&out),
            None => RecognitionResult::unrecognized(),
        }
    }

    /// 単一の手を分類。Compact 版では右手スロットに入れる
    pub fn classify(&self, pose: &HandPose) -> RecognitionResult {
        self.classify_features(&extract(pose, self.layout))
    }

    /// 両手を分類する。Compact 以外では右手を優先して片手だけ使う
    pub fn classify_hands(
        &self,
        left: Option<&HandPose>,
        right: Option<&HandPose>,
    ) -> RecognitionResult {
        match self.layout {
            FeatureLayout::Compact if left.is_some() || right.is_some() => {
                self.classify_features(&extract_compact(left, right))
            }
            FeatureLayout::Compact => RecognitionResult::unrecognized(),
            _ => match right.or(left) {
                Some(pose) => self.classify(pose),
                None => RecognitionResult::unrecognized(),
            },
        }
    }

    fn to_result(&self, out: &NeuralOutput) -> RecognitionResult {
        let id = self.first_id + out.index as u32;
        let label = self
            .labels
            .get(out.index)
            .cloned()
            .unwrap_or_else(|| format!("class_{}", out.index));
        RecognitionResult::new(label, out.score, id)
    }
}
