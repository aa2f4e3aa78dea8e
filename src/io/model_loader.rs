use crate::io::stl_loader::{StlFacet, parse_stl};
use crate::scene::mesh_instance::{MeshInstance, Triangle, winding_normal};
use log::{debug, info, warn};
use nalgebra::{Point3, Vector3, Vector4};
use std::path::Path;

/// 归一化后模型包围盒最长边的长度
const NORMALIZED_EXTENT: f32 = 1.6;

fn get_basename_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

/// 按扩展名加载模型文件（STL 或 OBJ），每个文件得到一个网格实例
pub fn load_model<P: AsRef<Path>>(path: P, normalize: bool) -> Result<MeshInstance, String> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let (mut triangles, normals) = match extension.as_str() {
        "stl" => load_stl_triangles(path)?,
        "obj" => {
            let triangles = load_obj_triangles(path)?;
            let normals = triangles.iter().map(winding_normal).collect();
            (triangles, normals)
        }
        other => return Err(format!("不支持的模型格式 '{}': {}", other, path.display())),
    };

    if triangles.is_empty() {
        return Err(format!("模型 {} 不包含任何三角形", path.display()));
    }

    if normalize {
        let scale = normalize_triangles(&mut triangles);
        debug!("模型缩放系数: {:.4}", scale);
    }

    let mesh = MeshInstance::new(get_basename_from_path(path), triangles, normals)?;
    info!(
        "已加载模型 '{}': {} 个三角形，质心 ({:.3}, {:.3}, {:.3})",
        mesh.name,
        mesh.triangle_count(),
        mesh.centroid().x,
        mesh.centroid().y,
        mesh.centroid().z
    );
    Ok(mesh)
}

/// 读取STL；文件中的面片法线为零时改用绕序法线
fn load_stl_triangles(path: &Path) -> Result<(Vec<Triangle>, Vec<Vector4<f32>>), String> {
    info!("加载 STL 文件: {:?}", path);
    let data = std::fs::read(path).map_err(|e| format!("读取 STL 文件失败: {}", e))?;
    let facets = parse_stl(&data)?;
    Ok(facets_to_triangles(&facets))
}

pub fn facets_to_triangles(facets: &[StlFacet]) -> (Vec<Triangle>, Vec<Vector4<f32>>) {
    let mut triangles = Vec::with_capacity(facets.len());
    let mut normals = Vec::with_capacity(facets.len());
    let mut skipped = 0usize;

    for facet in facets {
        let all_finite = facet
            .vertices
            .iter()
            .chain(std::iter::once(&facet.normal))
            .all(|v| v.iter().all(|c| c.is_finite()));
        if !all_finite {
            skipped += 1;
            continue;
        }

        let triangle: Triangle = facet.vertices.map(|v| v.push(1.0));
        let normal = if facet.normal.norm() > 0.0 {
            facet.normal.push(0.0)
        } else {
            winding_normal(&triangle)
        };
        triangles.push(triangle);
        normals.push(normal);
    }

    if skipped > 0 {
        warn!("跳过 {} 个包含非有限数值的 STL 面片", skipped);
    }
    (triangles, normals)
}

/// 读取OBJ，所有面三角化后按文件顺序展开
fn load_obj_triangles(path: &Path) -> Result<Vec<Triangle>, String> {
    info!("加载 OBJ 文件: {:?}", path);

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: false,
        ignore_points: true,
        ignore_lines: true,
    };

    // 只需要几何数据，材质加载结果忽略
    let (models, _materials) =
        tobj::load_obj(path, &load_options).map_err(|e| format!("加载 OBJ 失败: {}", e))?;

    let mut triangles = Vec::new();
    for model in &models {
        let mesh = &model.mesh;
        if mesh.indices.is_empty() {
            debug!("跳过没有索引的网格 '{}'", model.name);
            continue;
        }

        let vertex_count = mesh.positions.len() / 3;
        let position = |i: u32| -> Option<Vector4<f32>> {
            let i = i as usize;
            (i < vertex_count).then(|| {
                Vector4::new(
                    mesh.positions[3 * i],
                    mesh.positions[3 * i + 1],
                    mesh.positions[3 * i + 2],
                    1.0,
                )
            })
        };

        for (face, indices) in mesh.indices.chunks_exact(3).enumerate() {
            match (position(indices[0]), position(indices[1]), position(indices[2])) {
                (Some(a), Some(b), Some(c)) => triangles.push([a, b, c]),
                _ => warn!("网格 '{}' 的面 {} 包含越界的顶点索引，跳过", model.name, face),
            }
        }
    }

    Ok(triangles)
}

/// 均匀缩放使包围盒最长边为1.6（以原点为缩放中心），返回缩放系数
pub fn normalize_triangles(triangles: &mut [Triangle]) -> f32 {
    let mut min_coord = Point3::new(f32::MAX, f32::MAX, f32::MAX);
    let mut max_coord = Point3::new(f32::MIN, f32::MIN, f32::MIN);

    for v in triangles.iter().flatten() {
        let p = Point3::new(v.x, v.y, v.z);
        min_coord = min_coord.inf(&p);
        max_coord = max_coord.sup(&p);
    }

    let extent: Vector3<f32> = max_coord - min_coord;
    let max_extent = extent.x.max(extent.y).max(extent.z);
    if !max_extent.is_finite() || max_extent <= 1e-6 {
        return 1.0;
    }

    let scale = NORMALIZED_EXTENT / max_extent;
    for v in triangles.iter_mut().flatten() {
        v.x *= scale;
        v.y *= scale;
        v.z *= scale;
    }
    scale
}
