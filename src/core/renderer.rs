use crate::core::frame_buffer::{FrameBuffer, Rgb};
use crate::core::geometry_processor::GeometryProcessor;
use crate::core::rasterizer::{draw_triangle_outline, fill_triangle};
use crate::core::render_context::RenderContext;
use crate::io::render_settings::RenderMode;
use crate::scene::Scene;
use log::debug;
use std::time::{Duration, Instant};

/// 线框颜色
const WIREFRAME_COLOR: Rgb = [255, 255, 255];

/// 一帧的统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// 提交的三角形总数
    pub submitted: usize,
    /// 通过剔除并送入光栅化的三角形数
    pub rendered: usize,
    /// 实际写入的像素数（线框模式为0）
    pub pixels_written: usize,
}

/// 渲染器：独占帧缓冲区，逐帧清空并绘制整个场景
pub struct Renderer {
    pub frame_buffer: FrameBuffer,
    last_frame_time: Duration,
}

impl Renderer {
    pub fn new(width: usize, height: usize, background: Rgb) -> Self {
        Self {
            frame_buffer: FrameBuffer::new(width, height, background),
            last_frame_time: Duration::ZERO,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize, background: Rgb) {
        self.frame_buffer.resize(width, height, background);
    }

    /// 渲染一帧
    ///
    /// 几何阶段可按三角形并行，光栅化始终按网格和三角形的原始顺序串行执行。
    pub fn render_frame(&mut self, scene: &Scene, context: &RenderContext) -> FrameStats {
        let start_time = Instant::now();

        self.resize(context.width(), context.height(), context.background);
        self.frame_buffer.clear(context.background);

        let mut stats = FrameStats::default();
        for object in &scene.objects {
            let visible = GeometryProcessor::process_object(object, context);
            stats.submitted += object.mesh.triangle_count();
            stats.rendered += visible.len();

            for triangle in &visible {
                match context.render_mode {
                    RenderMode::Fill => {
                        stats.pixels_written += fill_triangle(
                            &mut self.frame_buffer,
                            &triangle.vertices,
                            triangle.color,
                            context.depth_test,
                        );
                    }
                    RenderMode::Wireframe => {
                        draw_triangle_outline(
                            &mut self.frame_buffer,
                            &triangle.vertices,
                            WIREFRAME_COLOR,
                        );
                    }
                }
            }
        }

        self.last_frame_time = start_time.elapsed();
        debug!(
            "渲染完成: {}/{} 个三角形, {} 个像素, 用时 {:?}",
            stats.rendered, stats.submitted, stats.pixels_written, self.last_frame_time
        );
        stats
    }

    pub fn last_frame_time(&self) -> Duration {
        self.last_frame_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::render_settings::{CullMode, ProjectionMode, RenderSettings};
    use crate::scene::mesh_instance::MeshInstance;
    use crate::scene::scene_object::SceneObject;
    use nalgebra::Vector4;

    const BG: Rgb = [57, 3, 66];

    fn v(x: f32, y: f32, z: f32) -> Vector4<f32> {
        Vector4::new(x, y, z, 1.0)
    }

    /// 2×2×2 正交盒投影到 100×100 画布，旋转固定为单位矩阵
    fn ortho_context(depth_test: bool) -> RenderContext {
        let settings = RenderSettings {
            width: 100,
            height: 100,
            projection: ProjectionMode::Orthographic,
            ortho_box: "2,2,2".to_string(),
            ortho_depth: 100.0,
            camera_position: "0,0,0".to_string(),
            backface_culling: CullMode::None,
            rotate_on_centroid: false,
            use_zbuffer: depth_test,
            ..Default::default()
        };
        RenderContext::from_settings(&settings).unwrap()
    }

    fn still_object(triangles: Vec<[Vector4<f32>; 3]>) -> SceneObject {
        // 偏航0、角速度0：旋转矩阵恒为单位矩阵
        SceneObject::new(MeshInstance::from_triangles("test", triangles), 0.0, 0.0)
    }

    #[test]
    fn unit_triangle_fills_top_left_quadrant() {
        let scene = Scene::new(vec![still_object(vec![quadrant_triangle(-1.0)])]);
        let ctx = ortho_context(true);
        let mut renderer = Renderer::new(100, 100, BG);
        let stats = renderer.render_frame(&scene, &ctx);

        assert_eq!(stats.submitted, 1);
        assert_eq!(stats.rendered, 1);
        assert!(stats.pixels_written > 0);

        let fb = &renderer.frame_buffer;
        assert_ne!(fb.color_at(10, 10), BG);
        assert_eq!(fb.color_at(60, 60), BG);
        for y in 0..100 {
            for x in 0..100 {
                let depth = fb.depth_at(x, y);
                if depth.is_finite() {
                    assert!(x < 51 && y < 51, "({x},{y}) 越出左上象限");
                    assert!((depth + 50.0).abs() < 1e-3, "({x},{y}) 深度 {depth}");
                }
            }
        }
    }

    fn quadrant_triangle(z: f32) -> [Vector4<f32>; 3] {
        [v(0.0, 0.0, z), v(1.0, 0.0, z), v(0.0, 1.0, z)]
    }

    #[test]
    fn near_triangle_wins_over_coincident_far_one() {
        // 远处（z=+1）先绘制，近处（z=0）后绘制
        let far_object = still_object(vec![quadrant_triangle(1.0)]);
        let near_object = still_object(vec![quadrant_triangle(0.0)]);

        let ctx = ortho_context(true);
        let mut renderer = Renderer::new(100, 100, BG);
        renderer.render_frame(&Scene::new(vec![far_object.clone()]), &ctx);
        let far_pixels = renderer.frame_buffer.covered_pixels();
        assert!(far_pixels > 0);

        renderer.render_frame(&Scene::new(vec![far_object, near_object]), &ctx);
        let fb = &renderer.frame_buffer;
        assert_eq!(fb.covered_pixels(), far_pixels);
        for y in 0..100 {
            for x in 0..100 {
                let depth = fb.depth_at(x, y);
                if depth.is_finite() {
                    assert!(depth.abs() < 1e-3, "({x},{y}) 深度 {depth}");
                }
            }
        }
    }

    #[test]
    fn painter_order_without_depth_test() {
        let scene = Scene::new(vec![
            still_object(vec![quadrant_triangle(0.0)]),
            still_object(vec![quadrant_triangle(1.0)]),
        ]);

        let mut renderer = Renderer::new(100, 100, BG);
        renderer.render_frame(&scene, &ortho_context(false));
        // 关闭深度测试时后绘制的远处三角形覆盖近处
        assert!((renderer.frame_buffer.depth_at(10, 10) - 50.0).abs() < 1e-3);
    }

    #[test]
    fn culled_triangles_do_not_touch_buffers() {
        let settings = RenderSettings {
            width: 100,
            height: 100,
            projection: ProjectionMode::Orthographic,
            ortho_box: "2,2,2".to_string(),
            camera_position: "0,0,0".to_string(),
            backface_culling: CullMode::Normal,
            rotate_on_centroid: false,
            ..Default::default()
        };
        let ctx = RenderContext::from_settings(&settings).unwrap();
        // 绕序法线为 +z，背向观察者
        let scene = Scene::new(vec![still_object(vec![quadrant_triangle(-1.0)])]);

        let mut renderer = Renderer::new(100, 100, BG);
        let stats = renderer.render_frame(&scene, &ctx);
        assert_eq!(stats.submitted, 1);
        assert_eq!(stats.rendered, 0);
        assert_eq!(renderer.frame_buffer.covered_pixels(), 0);
        assert!(renderer.frame_buffer.color_buffer.chunks(3).all(|p| p == BG));
    }

    #[test]
    fn wireframe_draws_white_edges_without_depth() {
        let mut ctx = ortho_context(true);
        ctx.toggle_render_mode();
        let scene = Scene::new(vec![still_object(vec![quadrant_triangle(-1.0)])]);

        let mut renderer = Renderer::new(100, 100, BG);
        let stats = renderer.render_frame(&scene, &ctx);
        assert_eq!(stats.rendered, 1);
        assert_eq!(stats.pixels_written, 0);
        assert_eq!(renderer.frame_buffer.color_at(25, 0), WIREFRAME_COLOR);
        assert_eq!(renderer.frame_buffer.color_at(10, 10), BG);
        assert_eq!(renderer.frame_buffer.covered_pixels(), 0);
    }

    #[test]
    fn buffer_follows_viewport() {
        let mut ctx = ortho_context(true);
        let mut renderer = Renderer::new(100, 100, BG);
        ctx.set_viewport(64, 32);
        renderer.render_frame(&Scene::default(), &ctx);
        assert_eq!(renderer.frame_buffer.width, 64);
        assert_eq!(renderer.frame_buffer.height, 32);
    }
}
