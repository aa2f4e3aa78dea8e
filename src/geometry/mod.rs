// geometry/mod.rs
// 导出几何变换与剔除相关模块
pub mod culling;
pub mod transform;
