use serde::{Deserialize, Serialize};

/// 未認識時のラベル
pub const UNRECOGNIZED: &str = "unrecognized";

/// 認識結果
///
/// JSON では `{"gesture": "...", "confidence": 0.8, "id": 1}`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// ジェスチャー名
    pub gesture: String,
    /// 信頼度 (0.0〜1.0)
    pub confidence: f32,
    /// ジェスチャーID (0 = 未認識)
    pub id: u32,
}

impl RecognitionResult {
    pub fn new(gesture: impl Into<String>, confidence: f32, id: u32) -> Self {
        Self {
            gesture: gesture.into(),
            confidence,
            id,
        }
    }

    /// 不正入力・該当なしの既定値
    pub fn unrecognized() -> Self {
        Self::new(UNRECOGNIZED, 0.0, 0)
    }

    pub fn is_recognized(&self) -> bool {
        self.id != 0
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Default for RecognitionResult {
    fn default() -> Self {
        Self::unrecognized()
    }
}

/// バッチ認識の結果（フレーム順）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub results: Vec<RecognitionResult>,
    pub frame_count: usize,
}

impl BatchResult {
    pub fn new(results: Vec<RecognitionResult>) -> Self {
        let frame_count = results.len();
        Self {
            results,
            frame_count,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized() {
        let r = RecognitionResult::unrecognized();
        assert_eq!(r.gesture, "unrecognized");
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.id, 0);
        assert!(!r.is_recognized());
        assert_eq!(RecognitionResult::default(), r);
    }

    #[test]
    fn test_json_field_names() {
        let json = RecognitionResult::new("hello", 0.8, 1).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["gesture"], "hello");
        assert_eq!(value["id"], 1);
        assert!((value["confidence"].as_f64().unwrap() - 0.8).abs() < 1e-6);
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_batch_json_shape() {
        let batch = BatchResult::new(vec![
            RecognitionResult::new("yes", 0.85, 3),
            RecognitionResult::unrecognized(),
        ]);
        let value: serde_json::Value = serde_json::from_str(&batch.to_json().unwrap()).unwrap();
        assert_eq!(value["frameCount"], 2);
        assert_eq!(value["results"][0]["gesture"], "yes");
        assert_eq!(value["results"][1]["id"], 0);
    }
}
