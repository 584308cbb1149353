use tracing::warn;

/// 標準偏差がこれ以下なら自己正規化を行わない
pub const MIN_STDDEV: f32 = 1e-6;

/// ベクトル全体の平均・母標準偏差で 平均0 / 分散1 に揃える
///
/// 標準偏差が [`MIN_STDDEV`] 以下なら何もしない。
pub fn self_normalize(features: &mut [f32]) {
    if features.is_empty() {
        return;
    }

    let n = features.len() as f32;
    let mean = features.iter().sum::<f32>() / n;
    let variance = features.iter().map(|f| (f - mean) * (f - mean)).sum::<f32>() / n;
    let stddev = variance.sqrt();

    if stddev > MIN_STDDEV {
        for f in features.iter_mut() {
            *f = (*f - mean) / stddev;
        }
    }
}

/// 外部で学習した特徴量ごとの平均・スケールによる標準化
#[derive(Debug, Clone, PartialEq)]
pub struct Scaler {
    mean: Vec<f32>,
    scale: Vec<f32>,
}

impl Scaler {
    /// 平均0・スケール1（恒等変換）
    pub fn identity(width: usize) -> Self {
        Self {
            mean: vec![0.0; width],
            scale: vec![1.0; width],
        }
    }

    /// 長さが `width` と合わない配列は恒等変換に置き換える。
    /// スケール 0 は 1 として扱う。
    pub fn new(width: usize, mean: Option<Vec<f32>>, scale: Option<Vec<f32>>) -> Self {
        let mean = match mean {
            Some(m) if m.len() == width => m,
            Some(m) => {
                warn!(expected = width, got = m.len(), "scaler mean length mismatch, using zeros");
                vec![0.0; width]
            }
            None => vec![0.0; width],
        };
        let scale = match scale {
            Some(s) if s.len() == width => s
                .into_iter()
                .map(|v| if v == 0.0 { 1.0 } else { v })
                .collect(),
            Some(s) => {
                warn!(expected = width, got = s.len(), "scaler scale length mismatch, using ones");
                vec![1.0; width]
            }
            None => vec![1.0; width],
        };
        Self { mean, scale }
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    /// x'[i] = (x[i] - mean[i]) / scale[i]
    pub fn apply(&self, features: &mut [f32]) {
        debug_assert_eq!(features.len(), self.width());
        for ((f, m), s) in features.iter_mut().zip(&self.mean).zip(&self.scale) {
            *f = (*f - m) / s;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mean_and_std(v: &[f32]) -> (f32, f32) {
        let n = v.len() as f32;
        let mean = v.iter().sum::<f32>() / n;
        let var = v.iter().map(|x| (x - mean) * (x - mean)).sum::<f32>() / n;
        (mean, var.sqrt())
    }

    #[test]
    fn test_self_normalize_zero_mean_unit_std() {
        let mut v = vec![1.0, 2.0, 3.0, 4.0, 10.0];
        self_normalize(&mut v);
        let (mean, std) = mean_and_std(&v);
        assert!(mean.abs() < 1e-5);
        assert!((std - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_self_normalize_constant_vector_unchanged() {
        let mut v = vec![0.25; 10];
        self_normalize(&mut v);
        assert_eq!(v, vec![0.25; 10]);

        let mut empty: Vec<f32> = Vec::new();
        self_normalize(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_self_normalize_tiny_spread_unchanged() {
        let mut v = vec![1.0, 1.0 + 1e-7, 1.0];
        let before = v.clone();
        self_normalize(&mut v);
        assert_eq!(v, before);
    }

    #[test]
    fn test_scaler_apply() {
        let scaler = Scaler::new(2, Some(vec![1.0, 2.0]), Some(vec![2.0, 0.5]));
        let mut x = [3.0, 3.0];
        scaler.apply(&mut x);
        assert_eq!(x, [1.0, 2.0]);
    }

    #[test]
    fn test_scaler_falls_back_to_identity() {
        let scaler = Scaler::new(3, Some(vec![1.0]), Some(vec![0.0, 0.0, 2.0]));
        let mut x = [4.0, 5.0, 6.0];
        scaler.apply(&mut x);
        // mean は恒等、scale の 0 は 1 扱い
        assert_eq!(x, [4.0, 5.0, 3.0]);
        assert_eq!(Scaler::identity(3).width(), 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_normalized_moments(v in proptest::collection::vec(-100.0f32..100.0, 2..300)) {
            let (_, std_before) = mean_and_std(&v);
            let mut w = v.clone();
            self_normalize(&mut w);
            if std_before > 1e-3 {
                let (mean, std) = mean_and_std(&w);
                prop_assert!(mean.abs() < 1e-3, "mean={}", mean);
                prop_assert!((std - 1.0).abs() < 1e-3, "std={}", std);
            } else if std_before <= MIN_STDDEV {
                prop_assert_eq!(w, v);
            }
        }
    }
}
