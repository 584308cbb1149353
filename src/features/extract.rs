//! ランドマーク → 特徴量ベクトル
//!
//! - Pairwise (210): 全ランドマーク対の3D距離
//! - Geometric (256): Pairwise + 手首距離(20) + 指角度(5) + 手のひら重心(2) + 曲率(19)
//! - Compact (126): 手首原点・スケール正規化した xyz × 21 を左右の手で連結

use crate::hand::{Finger, HandPose, Landmark, LandmarkIndex};

use super::geometry::{distance, joint_angle};
use super::normalize::self_normalize;

pub const PAIRWISE_LEN: usize = LandmarkIndex::COUNT * (LandmarkIndex::COUNT - 1) / 2;
pub const GEOMETRIC_LEN: usize = PAIRWISE_LEN + 20 + 5 + 2 + 19;
pub const HAND_COMPACT_LEN: usize = LandmarkIndex::COUNT * 3;
pub const COMPACT_LEN: usize = HAND_COMPACT_LEN * 2;

/// 手のひら重心に使う指の付け根
const PALM_BASES: [LandmarkIndex; 5] = [
    LandmarkIndex::ThumbCmc,
    LandmarkIndex::IndexMcp,
    LandmarkIndex::MiddleMcp,
    LandmarkIndex::RingMcp,
    LandmarkIndex::PinkyMcp,
];

/// 特徴量の構成
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureLayout {
    Pairwise,
    Geometric,
    Compact,
}

impl FeatureLayout {
    pub fn len(self) -> usize {
        match self {
            FeatureLayout::Pairwise => PAIRWISE_LEN,
            FeatureLayout::Geometric => GEOMETRIC_LEN,
            FeatureLayout::Compact => COMPACT_LEN,
        }
    }

    /// ベクトル自身の統計で正規化するか（Compact は外部スケーラを使う）
    pub fn self_normalized(self) -> bool {
        !matches!(self, FeatureLayout::Compact)
    }
}

/// 幾何特徴量を抽出して自己正規化する
///
/// `Compact` を渡された場合は右手スロットとして扱う。
pub fn extract(pose: &HandPose, layout: FeatureLayout) -> Vec<f32> {
    match layout {
        FeatureLayout::Pairwise => extract_geometric(pose, false),
        FeatureLayout::Geometric => extract_geometric(pose, true),
        FeatureLayout::Compact => extract_compact(None, Some(pose)),
    }
}

fn extract_geometric(pose: &HandPose, extended: bool) -> Vec<f32> {
    let mut features = geometric_features(pose, extended);
    self_normalize(&mut features);
    features
}

/// 正規化前の幾何特徴量
///
/// 並び: 全対距離 [0, 210) / 手首距離 [210, 230) / 指角度 [230, 235) /
/// 手のひら重心 [235, 237) / 曲率 [237, 256)
fn geometric_features(pose: &HandPose, extended: bool) -> Vec<f32> {
    let lm = pose.landmarks();
    let capacity = if extended { GEOMETRIC_LEN } else { PAIRWISE_LEN };
    let mut features = Vec::with_capacity(capacity);

    // i < j の全対
    for i in 0..LandmarkIndex::COUNT {
        for j in (i + 1)..LandmarkIndex::COUNT {
            features.push(distance(&lm[i], &lm[j]));
        }
    }

    if extended {
        let wrist = pose.wrist();
        features.extend(lm[1..].iter().map(|p| distance(p, wrist)));

        for finger in Finger::ALL {
            let (tip, pip, mcp) = finger.joints();
            features.push(joint_angle(pose.get(tip), pose.get(pip), pose.get(mcp)));
        }

        let (palm_x, palm_y) = palm_centroid(pose);
        features.push(palm_x);
        features.push(palm_y);

        for w in lm.windows(3) {
            features.push(joint_angle(&w[0], &w[1], &w[2]));
        }
    }

    debug_assert_eq!(features.len(), capacity);
    features
}

/// 指の付け根5点の平均 (x, y)
pub fn palm_centroid(pose: &HandPose) -> (f32, f32) {
    let (sx, sy) = PALM_BASES
        .iter()
        .map(|i| pose.get(*i))
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let n = PALM_BASES.len() as f32;
    (sx / n, sy / n)
}

/// 片手分の Compact 特徴量（63）
///
/// 手首を原点にし、手首→中指MCP の長さで割る（長さ 0 なら 1）。
pub fn hand_compact(pose: &HandPose) -> [f32; HAND_COMPACT_LEN] {
    let wrist = *pose.wrist();
    let reference = pose.get(LandmarkIndex::MiddleMcp).relative_to(&wrist);
    let mut scale = (reference.x * reference.x + reference.y * reference.y + reference.z * reference.z).sqrt();
    if scale == 0.0 {
        scale = 1.0;
    }

    let mut out = [0.0f32; HAND_COMPACT_LEN];
    for (i, p) in pose.landmarks().iter().enumerate() {
        let Landmark { x, y, z } = p.relative_to(&wrist);
        out[i * 3] = x / scale;
        out[i * 3 + 1] = y / scale;
        out[i * 3 + 2] = z / scale;
    }
    out
}

/// 左手 → 右手の順に連結（126）。いない手は 0 埋め
pub fn extract_compact(left: Option<&HandPose>, right: Option<&HandPose>) -> Vec<f32> {
    let mut features = Vec::with_capacity(COMPACT_LEN);
    for hand in [left, right] {
        match hand {
            Some(pose) => features.extend_from_slice(&hand_compact(pose)),
            None => features.extend(std::iter::repeat(0.0).take(HAND_COMPACT_LEN)),
        }
    }
    features
}
