use crate::core::frame_buffer::Rgb;
use crate::core::render_context::RenderContext;
use crate::core::shading::{greyscale, shade};
use crate::geometry::culling::{is_backface_normal, is_backface_winding};
use crate::geometry::transform::perspective_divide;
use crate::io::render_settings::CullMode;
use crate::scene::mesh_instance::{MeshInstance, Triangle};
use crate::scene::scene_object::SceneObject;
use nalgebra::{Matrix4, Point3, Vector4};
use rayon::prelude::*;

/// 通过剔除、已着色的屏幕空间三角形，顶点为 (x, y, depth)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTriangle {
    pub vertices: [Point3<f32>; 3],
    pub color: Rgb,
}

/// 几何处理器，负责顶点变换、剔除与着色
pub struct GeometryProcessor;

impl GeometryProcessor {
    /// 按对象当前动画状态处理一帧
    pub fn process_object(object: &SceneObject, context: &RenderContext) -> Vec<ScreenTriangle> {
        let rotation = object.rotation();
        Self::process_mesh(&object.mesh, &rotation, context)
    }

    /// 给定旋转矩阵处理网格，输出保持原三角形顺序
    pub fn process_mesh(
        mesh: &MeshInstance,
        rotation: &Matrix4<f32>,
        context: &RenderContext,
    ) -> Vec<ScreenTriangle> {
        let model = mesh.model_rotation(rotation, context.rotate_on_centroid);
        let screen_transform = context.projection_matrix() * model;

        let process = |(triangle, normal): (&Triangle, &Vector4<f32>)| {
            Self::process_triangle(triangle, normal, &screen_transform, &model, rotation, context)
        };

        if context.use_multithreading {
            mesh.triangles()
                .par_iter()
                .zip(mesh.normals())
                .filter_map(process)
                .collect()
        } else {
            mesh.triangles()
                .iter()
                .zip(mesh.normals())
                .filter_map(process)
                .collect()
        }
    }

    fn process_triangle(
        triangle: &Triangle,
        normal: &Vector4<f32>,
        screen_transform: &Matrix4<f32>,
        model: &Matrix4<f32>,
        rotation: &Matrix4<f32>,
        context: &RenderContext,
    ) -> Option<ScreenTriangle> {
        let vertices = triangle.map(|v| {
            let p = perspective_divide(&(screen_transform * v));
            Point3::new(p.x, p.y, p.z)
        });

        let culled = match context.cull_mode {
            CullMode::Normal => is_backface_normal(&(rotation * normal)),
            CullMode::Winding => is_backface_winding(&vertices[0], &vertices[1], &vertices[2]),
            CullMode::None => false,
        };
        if culled {
            return None;
        }

        // 着色使用旋转后、投影前的三角形边
        let [ra, rb, rc] = triangle.map(|v| model * v);
        let intensity = shade(
            &(rb - ra).xyz(),
            &(rc - ra).xyz(),
            &context.light_direction,
            &context.shading,
        );

        Some(ScreenTriangle {
            vertices,
            color: greyscale(intensity),
        })
    }
}
