use nalgebra::Vector3;
use std::path::Path;

/// 投影模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

impl ProjectionMode {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "perspective" => Ok(Self::Perspective),
            "orthographic" => Ok(Self::Orthographic),
            other => Err(format!("不支持的投影类型: {}", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Perspective => "perspective",
            Self::Orthographic => "orthographic",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Perspective => "Perspective",
            Self::Orthographic => "Orthographic",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Perspective => Self::Orthographic,
            Self::Orthographic => Self::Perspective,
        }
    }
}

/// 渲染模式：实心填充或线框
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    #[default]
    Fill,
    Wireframe,
}

impl RenderMode {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fill" => Ok(Self::Fill),
            "wireframe" | "wire" => Ok(Self::Wireframe),
            other => Err(format!("不支持的渲染模式: {}", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Wireframe => "wireframe",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Fill => "Fill",
            Self::Wireframe => "Wireframe",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Fill => Self::Wireframe,
            Self::Wireframe => Self::Fill,
        }
    }
}

/// 背面剔除方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CullMode {
    /// 旋转后法线 z ≥ 0 时剔除
    #[default]
    Normal,
    /// 屏幕空间绕序 z 叉积 ≥ 0 时剔除
    Winding,
    None,
}

impl CullMode {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "winding" => Ok(Self::Winding),
            "none" | "off" => Ok(Self::None),
            other => Err(format!("不支持的背面剔除方式: {}", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Winding => "winding",
            Self::None => "none",
        }
    }
}

/// 所有可通过TOML配置的渲染参数
///
/// 向量与颜色保持 "x,y,z" 字符串形式，使用时再解析。
#[derive(Debug, Clone)]
pub struct RenderSettings {
    // ===== 文件路径设置 =====
    /// 输入模型路径（STL 或 OBJ），按顺序绘制
    pub models: Vec<String>,
    /// 输出文件的基础名称
    pub output: String,
    /// 输出图像的目录
    pub output_dir: String,

    // ===== 渲染基础设置 =====
    pub width: usize,
    pub height: usize,
    pub projection: ProjectionMode,
    pub render_mode: RenderMode,
    /// 启用Z缓冲（深度测试）
    pub use_zbuffer: bool,
    pub backface_culling: CullMode,
    /// 几何阶段按三角形并行
    pub use_multithreading: bool,
    /// 无头模式下同时保存深度图
    pub save_depth: bool,
    /// 背景颜色 "r,g,b"（0-255）
    pub background_color: String,

    // ===== 相机设置 =====
    pub camera_position: String,
    /// 视场角（度）
    pub camera_fov: f32,
    pub z_far: f32,
    /// 正交盒尺寸 "x,y,z"
    pub ortho_box: String,
    /// 正交投影时画布的深度尺寸
    pub ortho_depth: f32,

    // ===== 物体设置 =====
    pub rotate_on_centroid: bool,
    /// 角速度（度/秒）
    pub angular_speed: f32,
    /// 固定偏航角（度）
    pub base_yaw: f32,
    /// 把模型最大包围盒边长缩放到1.6
    pub normalize_model: bool,

    // ===== 光照设置 =====
    pub light_direction: String,
    pub light_gain: f32,
    pub ambient: f32,

    // ===== 动画设置 =====
    /// 无头模式渲染的帧数
    pub frames: usize,
    /// 无头模式的固定帧率
    pub fps: f32,
    /// 按键开关的最小间隔（秒）
    pub toggle_interval: f32,
    /// 每次调整视场角的步长（度）
    pub fov_step: f32,
}

pub fn parse_vec3(s: &str) -> Result<Vector3<f32>, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err("需要3个逗号分隔的值".to_string());
    }
    let mut values = [0.0_f32; 3];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = part
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("无效数字 '{}': {}", part, e))?;
    }
    Ok(Vector3::from(values))
}

/// 解析 "r,g,b" 颜色，每个分量为 0-255 的整数
pub fn parse_rgb(s: &str) -> Result<[u8; 3], String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err("颜色需要3个逗号分隔的值".to_string());
    }
    let mut rgb = [0u8; 3];
    for (channel, part) in rgb.iter_mut().zip(&parts) {
        *channel = part
            .trim()
            .parse::<u8>()
            .map_err(|e| format!("无效颜色分量 '{}': {}", part, e))?;
    }
    Ok(rgb)
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            output: "output".to_string(),
            output_dir: "output_rasterizer".to_string(),

            width: 800,
            height: 750,
            projection: ProjectionMode::Perspective,
            render_mode: RenderMode::Fill,
            use_zbuffer: true,
            backface_culling: CullMode::Normal,
            use_multithreading: true,
            save_depth: false,
            background_color: "57,3,66".to_string(),

            camera_position: "0,0,-5".to_string(),
            camera_fov: 36.0,
            z_far: 100.0,
            ortho_box: "3,3,100".to_string(),
            ortho_depth: 100.0,

            rotate_on_centroid: true,
            angular_speed: 180.0,
            base_yaw: 180.0,
            normalize_model: false,

            light_direction: "0,0,1".to_string(),
            light_gain: 110.0,
            ambient: 30.0,

            frames: 1,
            fps: 30.0,
            toggle_interval: 1.5,
            fov_step: 5.0,
        }
    }
}

impl RenderSettings {
    /// 验证所有参数（包括模型文件），返回第一个发现的错误
    pub fn validate(&self) -> Result<(), String> {
        if self.models.is_empty() {
            return Err("错误: 未指定模型文件路径".to_string());
        }
        for model in &self.models {
            if !Path::new(model).exists() {
                return Err(format!("错误: 找不到模型文件 '{}'", model));
            }
        }

        if self.output_dir.trim().is_empty() {
            return Err("错误: 输出目录不能为空".to_string());
        }
        if self.output.trim().is_empty() {
            return Err("错误: 输出文件名不能为空".to_string());
        }

        self.validate_render()
    }

    /// 只验证渲染参数；GUI 可以不带模型启动
    pub fn validate_render(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("错误: 图像宽度和高度必须大于0".to_string());
        }

        parse_vec3(&self.camera_position)
            .map_err(|e| format!("错误: 相机位置格式不正确，应为 x,y,z 格式: {}", e))?;

        let ortho_box = parse_vec3(&self.ortho_box)
            .map_err(|e| format!("错误: 正交盒尺寸格式不正确，应为 x,y,z 格式: {}", e))?;
        if ortho_box.iter().any(|&d| d == 0.0) {
            return Err("错误: 正交盒尺寸不能为0".to_string());
        }
        if self.ortho_depth <= 0.0 {
            return Err("错误: 正交画布深度必须大于0".to_string());
        }

        let light = parse_vec3(&self.light_direction)
            .map_err(|e| format!("错误: 光照方向格式不正确，应为 x,y,z 格式: {}", e))?;
        if light.norm() == 0.0 {
            return Err("错误: 光照方向不能为零向量".to_string());
        }

        parse_rgb(&self.background_color)
            .map_err(|e| format!("错误: 背景颜色格式不正确，应为 r,g,b 格式: {}", e))?;

        if !(self.camera_fov > 0.0 && self.camera_fov < 180.0) {
            return Err(format!("错误: 视场角必须在 (0, 180) 度之间，当前为 {}", self.camera_fov));
        }
        let focal = 1.0 / (self.camera_fov.to_radians() * 0.5).tan();
        if self.z_far <= focal {
            return Err(format!(
                "错误: 远平面 {} 必须大于焦距 {:.3}",
                self.z_far, focal
            ));
        }

        if self.fps <= 0.0 {
            return Err("错误: 帧率必须大于0".to_string());
        }
        if self.toggle_interval < 0.0 {
            return Err("错误: 按键间隔不能为负".to_string());
        }

        Ok(())
    }
}
