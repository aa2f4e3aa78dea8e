use crate::core::frame_buffer::Rgb;
use nalgebra::Vector3;

/// 平面着色参数：强度 = clamp(-gain · dot(n, l) + ambient)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingParams {
    pub gain: f32,
    pub ambient: f32,
}

impl Default for ShadingParams {
    fn default() -> Self {
        Self {
            gain: 110.0,
            ambient: 30.0,
        }
    }
}

/// 归一化；零向量原样返回，不做除法
pub fn normalize_or_zero(v: &Vector3<f32>) -> Vector3<f32> {
    let norm = v.norm();
    if norm == 0.0 { *v } else { v / norm }
}

/// 计算三角形的平面着色强度
///
/// `light_direction` 必须是单位向量。退化三角形（两边共线）法线为零，
/// 只得到环境光分量。
pub fn shade(
    edge0: &Vector3<f32>,
    edge1: &Vector3<f32>,
    light_direction: &Vector3<f32>,
    params: &ShadingParams,
) -> u8 {
    let normal = normalize_or_zero(&edge0.cross(edge1));
    intensity_from_dot(normal.dot(light_direction), params)
}

/// 点积到强度的线性映射，饱和到 [0, 255] 而不是回绕
pub fn intensity_from_dot(dot: f32, params: &ShadingParams) -> u8 {
    let raw = -params.gain * dot + params.ambient;
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 255.0) as u8
}

/// 灰度颜色 R=G=B
pub fn greyscale(intensity: u8) -> Rgb {
    [intensity, intensity, intensity]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light() -> Vector3<f32> {
        Vector3::new(0.0, 0.0, 1.0)
    }

    #[test]
    fn facing_the_light_is_bright() {
        // 法线为 -z，正对光线来向
        let e0 = Vector3::new(0.0, 1.0, 0.0);
        let e1 = Vector3::new(1.0, 0.0, 0.0);
        let params = ShadingParams::default();
        assert_eq!(shade(&e0, &e1, &light(), &params), 140);
        // 反向绕序得到背光面，被钳制到0
        assert_eq!(shade(&e1, &e0, &light(), &params), 0);
    }

    #[test]
    fn degenerate_triangle_gets_ambient_only() {
        let e0 = Vector3::new(1.0, 1.0, 0.0);
        let e1 = Vector3::new(2.0, 2.0, 0.0);
        assert_eq!(normalize_or_zero(&e0.cross(&e1)), Vector3::zeros());
        assert_eq!(shade(&e0, &e1, &light(), &ShadingParams::default()), 30);
    }

    #[test]
    fn intensity_is_monotonically_decreasing() {
        let params = ShadingParams::default();
        let mut previous = u8::MAX;
        for i in 0..=200 {
            let dot = -1.0 + i as f32 * 0.01;
            let value = intensity_from_dot(dot, &params);
            assert!(value <= previous, "dot={dot}");
            previous = value;
        }
    }

    #[test]
    fn intensity_saturates_instead_of_wrapping() {
        let params = ShadingParams {
            gain: 400.0,
            ambient: 30.0,
        };
        assert_eq!(intensity_from_dot(-1.0, &params), 255);
        assert_eq!(intensity_from_dot(1.0, &params), 0);
        assert_eq!(intensity_from_dot(f32::NAN, &params), 0);
    }

    #[test]
    fn greyscale_repeats_channel() {
        assert_eq!(greyscale(77), [77, 77, 77]);
    }
}
