use crate::core::frame_buffer::Rgb;
use crate::core::shading::{ShadingParams, normalize_or_zero};
use crate::geometry::transform::TransformFactory;
use crate::io::render_settings::{
    CullMode, ProjectionMode, RenderMode, RenderSettings, parse_rgb, parse_vec3,
};
use log::debug;
use nalgebra::{Matrix4, Vector2, Vector3};

/// 视场角可调范围（度），开区间 (0, 180) 内留出余量
const MIN_FOV_DEG: f32 = 1.0;
const MAX_FOV_DEG: f32 = 179.0;

/// 每帧渲染所需的全部状态
///
/// 投影矩阵只在相机、视场角或视口变化时重建；旋转矩阵由管线每帧计算。
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub projection: ProjectionMode,
    pub render_mode: RenderMode,
    pub rotate_on_centroid: bool,
    pub cull_mode: CullMode,
    pub depth_test: bool,
    pub use_multithreading: bool,
    /// 单位光照方向
    pub light_direction: Vector3<f32>,
    pub shading: ShadingParams,
    pub background: Rgb,

    width: usize,
    height: usize,
    fov_deg: f32,
    z_far: f32,
    camera_position: Vector3<f32>,
    ortho_box: Vector3<f32>,
    ortho_depth: f32,

    ortho_to_screen: Matrix4<f32>,
    persp_to_screen: Matrix4<f32>,
}

impl RenderContext {
    /// 由渲染设置构建，视口取设置中的宽高
    pub fn from_settings(settings: &RenderSettings) -> Result<Self, String> {
        let camera_position = parse_vec3(&settings.camera_position)
            .map_err(|e| format!("无效的相机位置格式: {}", e))?;
        let ortho_box =
            parse_vec3(&settings.ortho_box).map_err(|e| format!("无效的正交盒格式: {}", e))?;
        let light = parse_vec3(&settings.light_direction)
            .map_err(|e| format!("无效的光照方向格式: {}", e))?;
        let background = parse_rgb(&settings.background_color)
            .map_err(|e| format!("无效的背景颜色格式: {}", e))?;

        let mut context = Self {
            projection: settings.projection,
            render_mode: settings.render_mode,
            rotate_on_centroid: settings.rotate_on_centroid,
            cull_mode: settings.backface_culling,
            depth_test: settings.use_zbuffer,
            use_multithreading: settings.use_multithreading,
            light_direction: normalize_or_zero(&light),
            shading: ShadingParams {
                gain: settings.light_gain,
                ambient: settings.ambient,
            },
            background,
            width: settings.width,
            height: settings.height,
            fov_deg: settings.camera_fov,
            z_far: settings.z_far,
            camera_position,
            ortho_box,
            ortho_depth: settings.ortho_depth,
            ortho_to_screen: Matrix4::identity(),
            persp_to_screen: Matrix4::identity(),
        };
        context.rebuild_projections();
        Ok(context)
    }

    fn rebuild_projections(&mut self) {
        let (w, h) = (self.width as f32, self.height as f32);
        self.ortho_to_screen = TransformFactory::orthographic_to_screen(
            &self.ortho_box,
            &Vector3::new(w, h, self.ortho_depth),
            &self.camera_position,
        );
        self.persp_to_screen = TransformFactory::perspective_to_screen(
            &Vector2::new(w, h),
            self.fov_deg.to_radians(),
            self.z_far,
            &self.camera_position,
        );
        debug!(
            "重建投影矩阵: {}x{}, FOV {:.1}°, 相机 {:?}",
            self.width, self.height, self.fov_deg, self.camera_position
        );
    }

    /// 视口尺寸变化时重建投影，返回是否发生变化
    pub fn set_viewport(&mut self, width: usize, height: usize) -> bool {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        self.rebuild_projections();
        true
    }

    /// 当前投影模式对应的矩阵
    pub fn projection_matrix(&self) -> &Matrix4<f32> {
        match self.projection {
            ProjectionMode::Perspective => &self.persp_to_screen,
            ProjectionMode::Orthographic => &self.ortho_to_screen,
        }
    }

    pub fn toggle_projection(&mut self) {
        self.projection = self.projection.toggled();
    }

    pub fn toggle_render_mode(&mut self) {
        self.render_mode = self.render_mode.toggled();
    }

    pub fn toggle_centroid(&mut self) {
        self.rotate_on_centroid = !self.rotate_on_centroid;
    }

    /// 调整视场角（度）
    ///
    /// 结果被钳制到 [1°, 179°]；若新焦距不小于远平面则拒绝调整。
    /// 返回是否实际改变。
    pub fn adjust_fov(&mut self, delta_deg: f32) -> bool {
        let fov = (self.fov_deg + delta_deg).clamp(MIN_FOV_DEG, MAX_FOV_DEG);
        if fov == self.fov_deg || TransformFactory::focal_length(fov.to_radians()) >= self.z_far {
            return false;
        }
        self.fov_deg = fov;
        self.rebuild_projections();
        true
    }

    pub fn fov_deg(&self) -> f32 {
        self.fov_deg
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}
