use nalgebra::{Point3, Vector4};

/// 旋转后的法线z分量非负时三角形背向观察者
pub fn is_backface_normal(rotated_normal: &Vector4<f32>) -> bool {
    rotated_normal.z >= 0.0
}

/// 屏幕空间两条边的二维叉积（z分量）
pub fn z_cross(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> f32 {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}

/// 基于屏幕空间绕序的背面判断，正面三角形的 z 叉积为负
pub fn is_backface_winding(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> bool {
    z_cross(a, b, c) >= 0.0
}
