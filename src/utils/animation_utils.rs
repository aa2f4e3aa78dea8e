/// 按角速度推进角位置，结果回绕到 [0, 360)
///
/// 负速度或较大的时间步同样正确回绕。
pub fn advance_angle(position_deg: f32, speed_deg_per_sec: f32, dt: f32) -> f32 {
    let next = (position_deg + speed_deg_per_sec * dt).rem_euclid(360.0);
    // rem_euclid 在极小负数上可能返回 360.0
    if next >= 360.0 { 0.0 } else { next }
}

/// 固定帧率下的时间步（秒）
pub fn frame_time_step(fps: f32) -> f32 {
    if fps > 0.0 { 1.0 / fps } else { 0.0 }
}
