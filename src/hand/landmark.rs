use serde::{Deserialize, Serialize};

/// MediaPipe Hands の 21 ランドマークインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl LandmarkIndex {
    pub const COUNT: usize = 21;

    pub fn from_index(index: usize) -> Option<Self> {
        use LandmarkIndex::*;
        const ALL: [LandmarkIndex; LandmarkIndex::COUNT] = [
            Wrist, ThumbCmc, ThumbMcp, ThumbIp, ThumbTip,
            IndexMcp, IndexPip, IndexDip, IndexTip,
            MiddleMcp, MiddlePip, MiddleDip, MiddleTip,
            RingMcp, RingPip, RingDip, RingTip,
            PinkyMcp, PinkyPip, PinkyDip, PinkyTip,
        ];
        ALL.get(index).copied()
    }
}

/// 単一ランドマーク
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// 正規化されたX座標 (0.0〜1.0)
    pub x: f32,
    /// 正規化されたY座標 (0.0〜1.0, 小さいほど画面上方)
    pub y: f32,
    /// 手首基準の相対深度
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// `origin` を原点とした相対座標
    pub fn relative_to(&self, origin: &Landmark) -> Landmark {
        Landmark::new(self.x - origin.x, self.y - origin.y, self.z - origin.z)
    }
}

/// 指の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// (tip, pip, mcp) の組。親指は (tip, ip, mcp)
    pub fn joints(self) -> (LandmarkIndex, LandmarkIndex, LandmarkIndex) {
        use LandmarkIndex::*;
        match self {
            Finger::Thumb => (ThumbTip, ThumbIp, ThumbMcp),
            Finger::Index => (IndexTip, IndexPip, IndexMcp),
            Finger::Middle => (MiddleTip, MiddlePip, MiddleMcp),
            Finger::Ring => (RingTip, RingPip, RingMcp),
            Finger::Pinky => (PinkyTip, PinkyPip, PinkyMcp),
        }
    }
}

/// 左右どちらの手か
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    #[default]
    Right,
}

/// 親指以外: tip.y < pip.y < mcp.y なら伸展
pub fn is_finger_extended(tip: &Landmark, pip: &Landmark, mcp: &Landmark) -> bool {
    tip.y < pip.y && pip.y < mcp.y
}

/// 親指: 手首からの水平距離が tip > ip なら伸展
pub fn is_thumb_extended(tip: &Landmark, ip: &Landmark, wrist: &Landmark) -> bool {
    (tip.x - wrist.x).abs() > (ip.x - wrist.x).abs()
}

/// 5本指の伸展フラグ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerStates {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    pub const fn new(thumb: bool, index: bool, middle: bool, ring: bool, pinky: bool) -> Self {
        Self { thumb, index, middle, ring, pinky }
    }

    pub fn get(&self, finger: Finger) -> bool {
        match finger {
            Finger::Thumb => self.thumb,
            Finger::Index => self.index,
            Finger::Middle => self.middle,
            Finger::Ring => self.ring,
            Finger::Pinky => self.pinky,
        }
    }

    /// 伸展している指の本数
    pub fn count(&self) -> usize {
        Finger::ALL.iter().filter(|f| self.get(**f)).count()
    }
}

/// フラットバッファ内の1ランドマークあたりの要素数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stride {
    /// (x, y)。z は 0 として扱う
    Xy,
    /// (x, y, z)
    Xyz,
}

impl Stride {
    pub fn floats_per_landmark(self) -> usize {
        match self {
            Stride::Xy => 2,
            Stride::Xyz => 3,
        }
    }

    pub fn floats_per_pose(self) -> usize {
        self.floats_per_landmark() * LandmarkIndex::COUNT
    }
}

/// 21ランドマークからなる手の姿勢
#[derive(Debug, Clone, PartialEq)]
pub struct HandPose {
    landmarks: [Landmark; LandmarkIndex::COUNT],
}

impl HandPose {
    pub fn new(landmarks: [Landmark; LandmarkIndex::COUNT]) -> Self {
        Self { landmarks }
    }

    /// 長さが 21 でなければ None
    pub fn from_slice(landmarks: &[Landmark]) -> Option<Self> {
        let landmarks: [Landmark; LandmarkIndex::COUNT] = landmarks.try_into().ok()?;
        Some(Self { landmarks })
    }

    /// `[x0, y0, (z0,) x1, ...]` 形式のバッファから生成。長さ不一致は None
    pub fn from_flat(data: &[f32], stride: Stride) -> Option<Self> {
        if data.len() != stride.floats_per_pose() {
            return None;
        }

        let step = stride.floats_per_landmark();
        let mut landmarks = [Landmark::default(); LandmarkIndex::COUNT];
        for (i, chunk) in data.chunks_exact(step).enumerate() {
            let z = if step == 3 { chunk[2] } else { 0.0 };
            landmarks[i] = Landmark::new(chunk[0], chunk[1], z);
        }

        Some(Self { landmarks })
    }

    /// インデックスでランドマークを取得
    pub fn get(&self, index: LandmarkIndex) -> &Landmark {
        &self.landmarks[index as usize]
    }

    pub fn wrist(&self) -> &Landmark {
        self.get(LandmarkIndex::Wrist)
    }

    pub fn landmarks(&self) -> &[Landmark; LandmarkIndex::COUNT] {
        &self.landmarks
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        let (tip, pip, mcp) = finger.joints();
        match finger {
            Finger::Thumb => is_thumb_extended(self.get(tip), self.get(pip), self.wrist()),
            _ => is_finger_extended(self.get(tip), self.get(pip), self.get(mcp)),
        }
    }

    pub fn finger_states(&self) -> FingerStates {
        FingerStates::new(
            self.is_extended(Finger::Thumb),
            self.is_extended(Finger::Index),
            self.is_extended(Finger::Middle),
            self.is_extended(Finger::Ring),
            self.is_extended(Finger::Pinky),
        )
    }
}

impl Default for HandPose {
    fn default() -> Self {
        Self {
            landmarks: [Landmark::default(); LandmarkIndex::COUNT],
        }
    }
}
