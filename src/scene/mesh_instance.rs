use crate::core::shading::normalize_or_zero;
use crate::geometry::transform::TransformFactory;
use nalgebra::{Matrix4, Vector3, Vector4};

/// 齐次坐标三角形 (A, B, C)，绕序决定正反面
pub type Triangle = [Vector4<f32>; 3];

/// 网格实例：加载后不再修改的几何数据
///
/// 每个三角形对应一条法线（w=0，仅表示方向），
/// 质心用于构造绕自身中心旋转的平移矩阵。
#[derive(Debug, Clone)]
pub struct MeshInstance {
    pub name: String,
    triangles: Vec<Triangle>,
    normals: Vec<Vector4<f32>>,
    centroid: Vector3<f32>,
    add_centroid: Matrix4<f32>,
    remove_centroid: Matrix4<f32>,
}

impl MeshInstance {
    /// 由三角形列表和逐三角形法线构建网格实例
    ///
    /// 顶点的w被强制为1，法线的w被强制为0并归一化（零法线保持为零）。
    pub fn new(
        name: impl Into<String>,
        triangles: Vec<Triangle>,
        normals: Vec<Vector4<f32>>,
    ) -> Result<Self, String> {
        if triangles.len() != normals.len() {
            return Err(format!(
                "三角形数量({})与法线数量({})不一致",
                triangles.len(),
                normals.len()
            ));
        }

        Ok(Self::build(name.into(), triangles, normals))
    }

    /// 由三角形绕序推导法线 `cross(B-A, C-A)`
    #[cfg(test)]
    pub fn from_triangles(name: impl Into<String>, triangles: Vec<Triangle>) -> Self {
        let normals = triangles.iter().map(winding_normal).collect();
        Self::build(name.into(), triangles, normals)
    }

    fn build(name: String, triangles: Vec<Triangle>, normals: Vec<Vector4<f32>>) -> Self {
        let triangles: Vec<Triangle> = triangles
            .into_iter()
            .map(|tri| tri.map(|v| Vector4::new(v.x, v.y, v.z, 1.0)))
            .collect();
        let normals = normals
            .into_iter()
            .map(|n| normalize_or_zero(&n.xyz()).push(0.0))
            .collect();

        let centroid = Self::compute_centroid(&triangles);

        Self {
            name,
            triangles,
            normals,
            centroid,
            add_centroid: TransformFactory::translation(&centroid),
            remove_centroid: TransformFactory::translation(&-centroid),
        }
    }

    /// 所有三角形质心的平均值
    fn compute_centroid(triangles: &[Triangle]) -> Vector3<f32> {
        if triangles.is_empty() {
            return Vector3::zeros();
        }
        let sum: Vector3<f32> = triangles
            .iter()
            .map(|[a, b, c]| (a.xyz() + b.xyz() + c.xyz()) / 3.0)
            .sum();
        sum / triangles.len() as f32
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn normals(&self) -> &[Vector4<f32>] {
        &self.normals
    }

    pub fn centroid(&self) -> &Vector3<f32> {
        &self.centroid
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// 模型旋转矩阵：绕质心时为 `add · R · remove`，否则绕世界原点
    pub fn model_rotation(&self, rotation: &Matrix4<f32>, rotate_on_centroid: bool) -> Matrix4<f32> {
        if rotate_on_centroid {
            self.add_centroid * rotation * self.remove_centroid
        } else {
            *rotation
        }
    }
}

/// 三角形绕序法线（未归一化，w=0）
pub fn winding_normal(triangle: &Triangle) -> Vector4<f32> {
    let [a, b, c] = triangle;
    (b.xyz() - a.xyz()).cross(&(c.xyz() - a.xyz())).push(0.0)
}
