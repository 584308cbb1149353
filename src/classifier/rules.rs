//! 指の伸展フラグによるルールベース分類
//!
//! 信頼度は設計者が割り当てた固定値で、統計的な保証ではない。

use crate::hand::{FingerStates, HandPose};

use super::gesture::RecognitionResult;

struct Rule {
    pattern: FingerStates,
    label: &'static str,
    confidence: f32,
    id: u32,
}

/// 上から順に評価し、最初に一致したものを採用
const RULES: [Rule; 5] = [
    Rule {
        pattern: FingerStates::new(false, true, false, false, false),
        label: "yes",
        confidence: 0.85,
        id: 3,
    },
    Rule {
        pattern: FingerStates::new(true, true, true, true, true),
        label: "hello",
        confidence: 0.80,
        id: 1,
    },
    Rule {
        pattern: FingerStates::new(false, false, false, false, false),
        label: "thank-you",
        confidence: 0.75,
        id: 2,
    },
    Rule {
        pattern: FingerStates::new(false, true, true, false, false),
        label: "V",
        confidence: 0.70,
        id: 4,
    },
    Rule {
        pattern: FingerStates::new(false, true, true, true, false),
        label: "OK",
        confidence: 0.70,
        id: 5,
    },
];

/// 伸展フラグから判定。該当なしは未認識
pub fn classify_states(states: FingerStates) -> RecognitionResult {
    RULES
        .iter()
        .find(|rule| rule.pattern == states)
        .map(|rule| RecognitionResult::new(rule.label, rule.confidence, rule.id))
        .unwrap_or_else(RecognitionResult::unrecognized)
}

pub fn classify(pose: &HandPose) -> RecognitionResult {
    classify_states(pose.finger_states())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::{Landmark, LandmarkIndex};

    /// 指ごとに伸展/屈曲を指定してポーズを作る
    fn make_pose(thumb: bool, fingers: [bool; 4]) -> HandPose {
        let mut lm = [Landmark::default(); LandmarkIndex::COUNT];
        lm[0] = Landmark::new(0.5, 0.9, 0.0);

        // 親指: 伸展なら tip が ip より手首から遠い
        lm[1] = Landmark::new(0.45, 0.85, 0.0);
        lm[2] = Landmark::new(0.42, 0.80, 0.0);
        lm[3] = Landmark::new(0.40, 0.78, 0.0);
        lm[4] = if thumb {
            Landmark::new(0.30, 0.75, 0.0)
        } else {
            Landmark::new(0.46, 0.80, 0.0)
        };

        for (k, extended) in fingers.iter().enumerate() {
            let base = 5 + k * 4;
            let x = 0.45 + 0.05 * k as f32;
            lm[base] = Landmark::new(x, 0.7, 0.0);
            if *extended {
                lm[base + 1] = Landmark::new(x, 0.6, 0.0);
                lm[base + 2] = Landmark::new(x, 0.5, 0.0);
                lm[base + 3] = Landmark::new(x, 0.4, 0.0);
            } else {
                // 曲げた指: 先端が PIP より下
                lm[base + 1] = Landmark::new(x, 0.65, 0.0);
                lm[base + 2] = Landmark::new(x, 0.7, 0.0);
                lm[base + 3] = Landmark::new(x, 0.72, 0.0);
            }
        }
        HandPose::new(lm)
    }

    fn assert_result(r: &RecognitionResult, label: &str, confidence: f32, id: u32) {
        assert_eq!(r.gesture, label);
        assert!((r.confidence - confidence).abs() < 1e-6);
        assert_eq!(r.id, id);
    }

    #[test]
    fn test_all_extended_is_hello() {
        let r = classify(&make_pose(true, [true; 4]));
        assert_result(&r, "hello", 0.80, 1);
    }

    #[test]
    fn test_none_extended_is_thank_you() {
        let r = classify(&make_pose(false, [false; 4]));
        assert_result(&r, "thank-you", 0.75, 2);
    }

    #[test]
    fn test_index_only_is_yes() {
        let r = classify(&make_pose(false, [true, false, false, false]));
        assert_result(&r, "yes", 0.85, 3);
    }

    #[test]
    fn test_v_and_ok() {
        let r = classify(&make_pose(false, [true, true, false, false]));
        assert_result(&r, "V", 0.70, 4);

        let r = classify(&make_pose(false, [true, true, true, false]));
        assert_result(&r, "OK", 0.70, 5);
    }

    #[test]
    fn test_unmatched_patterns() {
        // 親指 + 人差し指は表にない
        let r = classify(&make_pose(true, [true, false, false, false]));
        assert_result(&r, "unrecognized", 0.0, 0);

        // 小指だけ
        let r = classify_states(FingerStates::new(false, false, false, false, true));
        assert_eq!(r, RecognitionResult::unrecognized());

        // 4本
        let r = classify_states(FingerStates::new(false, true, true, true, true));
        assert_eq!(r.id, 0);
    }

    #[test]
    fn test_pure_function_of_flags() {
        // 同じフラグなら座標が違っても結果は同じ
        for bits in 0u8..32 {
            let states = FingerStates::new(
                bits & 1 != 0,
                bits & 2 != 0,
                bits & 4 != 0,
                bits & 8 != 0,
                bits & 16 != 0,
            );
            let pose = make_pose(states.thumb, [states.index, states.middle, states.ring, states.pinky]);
            assert_eq!(pose.finger_states(), states);
            assert_eq!(classify(&pose), classify_states(states));
        }
    }
}
