//! ベクトル・行列演算カーネル
//!
//! 推論パスの全レイヤーが使う。ブロック分割はワーキングセットを抑えるための
//! 実装上の工夫で、結果は素朴な三重ループと丸め誤差の範囲で一致する。

use ndarray::{s, Array2, ArrayView2};

/// 行列ベクトル積のブロックサイズ
pub const MATVEC_BLOCK: usize = 32;
/// 行列積のブロックサイズ
pub const MATMUL_BLOCK: usize = 64;

const LANES: usize = 8;

/// 内積 Σ a[i]·b[i]
///
/// 8レーンの部分和で累積する（自動ベクトル化向け）。
/// 長さ不一致は呼び出し側の契約違反。
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len().min(b.len());
    let (a, b) = (&a[..n], &b[..n]);

    let mut lanes = [0.0f32; LANES];
    let a_chunks = a.chunks_exact(LANES);
    let b_chunks = b.chunks_exact(LANES);
    let a_rem = a_chunks.remainder();
    let b_rem = b_chunks.remainder();

    for (ca, cb) in a_chunks.zip(b_chunks) {
        for l in 0..LANES {
            lanes[l] += ca[l] * cb[l];
        }
    }

    let mut sum: f32 = lanes.iter().sum();
    for (x, y) in a_rem.iter().zip(b_rem) {
        sum += x * y;
    }
    sum
}

/// ブロックごとの部分和を足し合わせる内積
pub fn dot_blocked(a: &[f32], b: &[f32], block: usize) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let block = block.max(1);
    a.chunks(block)
        .zip(b.chunks(block))
        .map(|(ca, cb)| dot(ca, cb))
        .sum()
}

/// 要素ごとの加算 out[i] = a[i] + b[i]
pub fn add(a: &[f32], b: &[f32], out: &mut [f32]) {
    debug_assert!(a.len() == b.len() && a.len() == out.len());
    for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
        *o = x + y;
    }
}

/// 要素ごとの乗算 out[i] = a[i] * b[i]
pub fn multiply(a: &[f32], b: &[f32], out: &mut [f32]) {
    debug_assert!(a.len() == b.len() && a.len() == out.len());
    for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
        *o = x * y;
    }
}

/// スカラー倍 out[i] = a[i] * k
pub fn scale(a: &[f32], k: f32, out: &mut [f32]) {
    debug_assert_eq!(a.len(), out.len());
    for (o, x) in out.iter_mut().zip(a) {
        *o = x * k;
    }
}

/// 行列ベクトル積 out = A·x（A は [rows, cols]）
pub fn matvec(a: ArrayView2<f32>, x: &[f32], out: &mut [f32]) {
    matvec_with_block(a, x, out, MATVEC_BLOCK);
}

pub fn matvec_with_block(a: ArrayView2<f32>, x: &[f32], out: &mut [f32], block: usize) {
    let (rows, cols) = a.dim();
    debug_assert_eq!(cols, x.len());
    debug_assert_eq!(rows, out.len());
    let block = block.max(1);

    out.iter_mut().for_each(|v| *v = 0.0);

    for ii in (0..rows).step_by(block) {
        let i_end = ii.saturating_add(block).min(rows);
        for jj in (0..cols).step_by(block) {
            let j_end = jj.saturating_add(block).min(cols);
            let xs = &x[jj..j_end];
            for i in ii..i_end {
                let row = a.slice(s![i, jj..j_end]);
                out[i] += match row.as_slice() {
                    Some(w) => dot(w, xs),
                    None => row.iter().zip(xs).map(|(w, v)| w * v).sum(),
                };
            }
        }
    }
}

/// 行列積 C = A·B（A: [n, k], B: [k, m]）
pub fn matmul(a: ArrayView2<f32>, b: ArrayView2<f32>) -> Array2<f32> {
    matmul_with_block(a, b, MATMUL_BLOCK)
}

pub fn matmul_with_block(a: ArrayView2<f32>, b: ArrayView2<f32>, block: usize) -> Array2<f32> {
    let (n, k) = a.dim();
    let (k2, m) = b.dim();
    debug_assert_eq!(k, k2);
    let k = k.min(k2);
    let block = block.max(1);

    let mut c = Array2::<f32>::zeros((n, m));

    for ii in (0..n).step_by(block) {
        let i_end = ii.saturating_add(block).min(n);
        for kk in (0..k).step_by(block) {
            let k_end = kk.saturating_add(block).min(k);
            for jj in (0..m).step_by(block) {
                let j_end = jj.saturating_add(block).min(m);
                for i in ii..i_end {
                    for p in kk..k_end {
                        let aip = a[[i, p]];
                        for j in jj..j_end {
                            c[[i, j]] += aip * b[[p, j]];
                        }
                    }
                }
            }
        }
    }

    c
}

pub fn relu_in_place(v: &mut [f32]) {
    for x in v.iter_mut() {
        *x = x.max(0.0);
    }
}

/// 数値安定化したソフトマックス（最大値を引いてから exp）
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// 最大値のインデックス。同値は先頭を優先、空なら None
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
