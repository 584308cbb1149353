//! 全結合フィードフォワードネットワーク
//!
//! 重みは行優先 `[out, in]` で保持し、h = act(W·x + b) を順に適用する。
//! 隠れ層は ReLU、最終層は線形。

use anyhow::{bail, Result};
use ndarray::{Array1, Array2};

use crate::features::Scaler;
use crate::math::{add, matvec, relu_in_place};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Linear,
}

/// 全結合層
#[derive(Debug, Clone)]
pub struct DenseLayer {
    /// [out, in]
    weights: Array2<f32>,
    bias: Array1<f32>,
    activation: Activation,
}

impl DenseLayer {
    pub fn new(weights: Array2<f32>, bias: Array1<f32>, activation: Activation) -> Result<Self> {
        let (out, _) = weights.dim();
        if bias.len() != out {
            bail!("bias length {} does not match layer output width {}", bias.len(), out);
        }
        Ok(Self {
            weights,
            bias,
            activation,
        })
    }

    pub fn input_width(&self) -> usize {
        self.weights.ncols()
    }

    pub fn output_width(&self) -> usize {
        self.weights.nrows()
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        let mut product = vec![0.0f32; self.output_width()];
        matvec(self.weights.view(), input, &mut product);

        let mut out = vec![0.0f32; product.len()];
        match self.bias.as_slice() {
            Some(bias) => add(&product, bias, &mut out),
            None => {
                for ((o, p), b) in out.iter_mut().zip(&product).zip(self.bias.iter()) {
                    *o = p + b;
                }
            }
        }

        if self.activation == Activation::Relu {
            relu_in_place(&mut out);
        }
        out
    }
}

/// 入力標準化（任意）+ 全結合層の連鎖
#[derive(Debug, Clone)]
pub struct Network {
    scaler: Option<Scaler>,
    layers: Vec<DenseLayer>,
}

impl Network {
    /// (weights, bias) の列から構築。最終層のみ線形、それ以外は ReLU
    pub fn from_layers(
        layers: Vec<(Array2<f32>, Array1<f32>)>,
        scaler: Option<Scaler>,
    ) -> Result<Self> {
        let count = layers.len();
        let layers = layers
            .into_iter()
            .enumerate()
            .map(|(i, (w, b))| {
                let activation = if i + 1 == count {
                    Activation::Linear
                } else {
                    Activation::Relu
                };
                DenseLayer::new(w, b, activation)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(layers, scaler)
    }

    pub fn new(layers: Vec<DenseLayer>, scaler: Option<Scaler>) -> Result<Self> {
        if layers.is_empty() {
            bail!("network has no layers");
        }

        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].output_width() != pair[1].input_width() {
                bail!(
                    "layer {} outputs {} values but layer {} expects {}",
                    i,
                    pair[0].output_width(),
                    i + 1,
                    pair[1].input_width()
                );
            }
        }

        if let Some(scaler) = &scaler {
            if scaler.width() != layers[0].input_width() {
                bail!(
                    "scaler width {} does not match input width {}",
                    scaler.width(),
                    layers[0].input_width()
                );
            }
        }

        Ok(Self { scaler, layers })
    }

    pub fn input_width(&self) -> usize {
        self.layers[0].input_width()
    }

    pub fn output_width(&self) -> usize {
        self.layers[self.layers.len() - 1].output_width()
    }

    /// 各層の出力幅（入力幅を先頭に含む）
    pub fn widths(&self) -> Vec<usize> {
        std::iter::once(self.input_width())
            .chain(self.layers.iter().map(|l| l.output_width()))
            .collect()
    }

    /// 順伝播。入力長が合わなければ None
    pub fn forward(&self, features: &[f32]) -> Option<Vec<f32>> {
        if features.len() != self.input_width() {
            return None;
        }

        let mut x = features.to_vec();
        if let Some(scaler) = &self.scaler {
            scaler.apply(&mut x);
        }

        for layer in &self.layers {
            x = layer.forward(&x);
        }
        Some(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    fn tiny_network(scaler: Option<Scaler>) -> Network {
        // 2 -> 2 (ReLU) -> 1 (linear)
        Network::from_layers(
            vec![
                (arr2(&[[1.0, -1.0], [0.5, 0.5]]), arr1(&[0.0, 1.0])),
                (arr2(&[[2.0, 1.0]]), arr1(&[-0.5])),
            ],
            scaler,
        )
        .unwrap()
    }

    #[test]
    fn test_forward_hand_computed() {
        let net = tiny_network(None);
        // h = relu([1-3, 0.5*1+0.5*3+1]) = [0, 3]; y = 2*0 + 3 - 0.5
        let y = net.forward(&[1.0, 3.0]).unwrap();
        assert_eq!(y.len(), 1);
        assert!((y[0] - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_final_layer_is_linear() {
        let net = Network::from_layers(
            vec![(arr2(&[[1.0]]), arr1(&[0.0])), (arr2(&[[-1.0]]), arr1(&[0.0]))],
            None,
        )
        .unwrap();
        // 負の出力がそのまま出る
        assert_eq!(net.forward(&[2.0]).unwrap(), vec![-2.0]);
    }

    #[test]
    fn test_scaler_applied_before_first_layer() {
        let scaler = Scaler::new(2, Some(vec![1.0, 1.0]), Some(vec![1.0, 2.0]));
        let net = tiny_network(Some(scaler));
        // x' = [0, 1] -> h = relu([-1, 1.5]) = [0, 1.5]; y = 1.5 - 0.5
        let y = net.forward(&[1.0, 3.0]).unwrap();
        assert!((y[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_width_mismatch_returns_none() {
        let net = tiny_network(None);
        assert!(net.forward(&[1.0]).is_none());
        assert!(net.forward(&[1.0, 2.0, 3.0]).is_none());
        assert_eq!(net.widths(), vec![2, 2, 1]);
    }

    #[test]
    fn test_rejects_inconsistent_shapes() {
        let err = Network::from_layers(
            vec![(arr2(&[[1.0, 1.0]]), arr1(&[0.0])), (arr2(&[[1.0, 1.0]]), arr1(&[0.0]))],
            None,
        );
        assert!(err.is_err());

        assert!(DenseLayer::new(arr2(&[[1.0]]), arr1(&[0.0, 0.0]), Activation::Relu).is_err());
        assert!(Network::new(Vec::new(), None).is_err());
        assert!(Network::from_layers(
            vec![(arr2(&[[1.0, 1.0]]), arr1(&[0.0]))],
            Some(Scaler::identity(3))
        )
        .is_err());
    }
}
