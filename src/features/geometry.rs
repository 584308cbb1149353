use nalgebra::{Vector2, Vector3};

use crate::hand::Landmark;

fn position(lm: &Landmark) -> Vector3<f32> {
    Vector3::new(lm.x, lm.y, lm.z)
}

/// 2点間の3Dユークリッド距離
pub fn distance(a: &Landmark, b: &Landmark) -> f32 {
    (position(a) - position(b)).norm()
}

/// 頂点 b における角度 ∠abc（度）
///
/// 画像平面 (x, y) 上で計算し、z は使わない。
/// どちらかの腕の長さが 0 なら 0.0 を返す。
pub fn joint_angle(a: &Landmark, b: &Landmark, c: &Landmark) -> f32 {
    let ba = Vector2::new(a.x - b.x, a.y - b.y);
    let bc = Vector2::new(c.x - b.x, c.y - b.y);

    let mag_ba = ba.norm();
    let mag_bc = bc.norm();
    if mag_ba == 0.0 || mag_bc == 0.0 {
        return 0.0;
    }

    // 丸め誤差で ±1 をはみ出すと acos が NaN になる
    let cos_angle = (ba.dot(&bc) / (mag_ba * mag_bc)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}
