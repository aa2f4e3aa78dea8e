use crate::io::render_settings::{CullMode, ProjectionMode, RenderMode, RenderSettings};
use log::warn;
use std::path::Path;
use toml::Value;

/// TOML配置管理器 - 统一处理所有配置的读写
pub struct TomlConfigLoader;

impl TomlConfigLoader {
    /// 从TOML文件加载完整配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<RenderSettings, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("读取配置文件失败: {}", e))?;

        Self::load_from_content(&content)
    }

    /// 从TOML内容字符串加载配置
    pub fn load_from_content(content: &str) -> Result<RenderSettings, String> {
        let toml_value: Value =
            toml::from_str(content).map_err(|e| format!("解析TOML失败: {}", e))?;

        Self::parse_toml_to_settings(toml_value)
    }

    /// 保存配置到TOML文件
    pub fn save_to_file<P: AsRef<Path>>(settings: &RenderSettings, path: P) -> Result<(), String> {
        let toml_content = Self::settings_to_toml(settings);
        std::fs::write(path, toml_content).map_err(|e| format!("写入配置文件失败: {}", e))
    }

    /// 生成带注释的示例配置文件
    pub fn create_example_config<P: AsRef<Path>>(path: P) -> Result<(), String> {
        let settings = RenderSettings {
            models: vec!["models/teapot.stl".to_string()],
            ..Default::default()
        };

        Self::save_to_file(&settings, path).map_err(|e| format!("创建示例配置失败: {}", e))
    }

    // ===== TOML -> RenderSettings 转换 =====

    fn parse_toml_to_settings(toml: Value) -> Result<RenderSettings, String> {
        let mut settings = RenderSettings::default();

        if let Some(files) = toml.get("files").and_then(|v| v.as_table()) {
            Self::parse_files_section(&mut settings, files)?;
        }
        if let Some(render) = toml.get("render").and_then(|v| v.as_table()) {
            Self::parse_render_section(&mut settings, render)?;
        }
        if let Some(camera) = toml.get("camera").and_then(|v| v.as_table()) {
            Self::parse_camera_section(&mut settings, camera)?;
        }
        if let Some(object) = toml.get("object").and_then(|v| v.as_table()) {
            Self::parse_object_section(&mut settings, object)?;
        }
        if let Some(lighting) = toml.get("lighting").and_then(|v| v.as_table()) {
            Self::parse_lighting_section(&mut settings, lighting)?;
        }
        if let Some(animation) = toml.get("animation").and_then(|v| v.as_table()) {
            Self::parse_animation_section(&mut settings, animation)?;
        }

        Ok(settings)
    }

    // ===== 各个section的解析方法 =====

    fn parse_files_section(
        settings: &mut RenderSettings,
        files: &toml::Table,
    ) -> Result<(), String> {
        match files.get("models") {
            Some(Value::Array(models)) => {
                settings.models = models
                    .iter()
                    .map(|m| {
                        m.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| format!("models 中的条目必须是字符串: {}", m))
                    })
                    .collect::<Result<_, _>>()?;
            }
            // 单个模型也允许直接写成字符串
            Some(Value::String(model)) => settings.models = vec![model.clone()],
            Some(other) => return Err(format!("models 必须是字符串数组: {}", other)),
            None => {}
        }
        if let Some(output) = files.get("output").and_then(|v| v.as_str()) {
            settings.output = output.to_string();
        }
        if let Some(output_dir) = files.get("output_dir").and_then(|v| v.as_str()) {
            settings.output_dir = output_dir.to_string();
        }
        Ok(())
    }

    fn parse_render_section(
        settings: &mut RenderSettings,
        render: &toml::Table,
    ) -> Result<(), String> {
        if let Some(width) = get_usize(render, "width")? {
            settings.width = width;
        }
        if let Some(height) = get_usize(render, "height")? {
            settings.height = height;
        }
        if let Some(projection) = render.get("projection").and_then(|v| v.as_str()) {
            settings.projection = ProjectionMode::parse(projection)?;
        }
        if let Some(render_mode) = render.get("render_mode").and_then(|v| v.as_str()) {
            settings.render_mode = RenderMode::parse(render_mode)?;
        }
        if let Some(use_zbuffer) = render.get("use_zbuffer").and_then(|v| v.as_bool()) {
            settings.use_zbuffer = use_zbuffer;
        }
        match render.get("backface_culling") {
            Some(Value::String(mode)) => settings.backface_culling = CullMode::parse(mode)?,
            // 布尔值兼容: true 使用法线剔除
            Some(Value::Boolean(enabled)) => {
                settings.backface_culling = if *enabled {
                    CullMode::Normal
                } else {
                    CullMode::None
                };
            }
            Some(other) => warn!("忽略无效的 backface_culling 值: {}", other),
            None => {}
        }
        if let Some(mt) = render.get("use_multithreading").and_then(|v| v.as_bool()) {
            settings.use_multithreading = mt;
        }
        if let Some(save_depth) = render.get("save_depth").and_then(|v| v.as_bool()) {
            settings.save_depth = save_depth;
        }
        if let Some(bg) = render.get("background_color").and_then(|v| v.as_str()) {
            settings.background_color = bg.to_string();
        }
        Ok(())
    }

    fn parse_camera_section(
        settings: &mut RenderSettings,
        camera: &toml::Table,
    ) -> Result<(), String> {
        if let Some(position) = camera.get("position").and_then(|v| v.as_str()) {
            settings.camera_position = position.to_string();
        }
        if let Some(fov) = get_f32(camera, "fov") {
            settings.camera_fov = fov;
        }
        if let Some(z_far) = get_f32(camera, "z_far") {
            settings.z_far = z_far;
        }
        if let Some(ortho_box) = camera.get("ortho_box").and_then(|v| v.as_str()) {
            settings.ortho_box = ortho_box.to_string();
        }
        if let Some(ortho_depth) = get_f32(camera, "ortho_depth") {
            settings.ortho_depth = ortho_depth;
        }
        Ok(())
    }

    fn parse_object_section(
        settings: &mut RenderSettings,
        object: &toml::Table,
    ) -> Result<(), String> {
        if let Some(on_centroid) = object.get("rotate_on_centroid").and_then(|v| v.as_bool()) {
            settings.rotate_on_centroid = on_centroid;
        }
        if let Some(speed) = get_f32(object, "angular_speed") {
            settings.angular_speed = speed;
        }
        if let Some(base_yaw) = get_f32(object, "base_yaw") {
            settings.base_yaw = base_yaw;
        }
        if let Some(normalize) = object.get("normalize_model").and_then(|v| v.as_bool()) {
            settings.normalize_model = normalize;
        }
        Ok(())
    }

    fn parse_lighting_section(
        settings: &mut RenderSettings,
        lighting: &toml::Table,
    ) -> Result<(), String> {
        if let Some(direction) = lighting.get("direction").and_then(|v| v.as_str()) {
            settings.light_direction = direction.to_string();
        }
        if let Some(gain) = get_f32(lighting, "gain") {
            settings.light_gain = gain;
        }
        if let Some(ambient) = get_f32(lighting, "ambient") {
            settings.ambient = ambient;
        }
        Ok(())
    }

    fn parse_animation_section(
        settings: &mut RenderSettings,
        animation: &toml::Table,
    ) -> Result<(), String> {
        if let Some(frames) = get_usize(animation, "frames")? {
            settings.frames = frames;
        }
        if let Some(fps) = get_f32(animation, "fps") {
            settings.fps = fps;
        }
        if let Some(interval) = get_f32(animation, "toggle_interval") {
            settings.toggle_interval = interval;
        }
        if let Some(step) = get_f32(animation, "fov_step") {
            settings.fov_step = step;
        }
        Ok(())
    }

    // ===== RenderSettings -> TOML 转换 =====

    fn settings_to_toml(settings: &RenderSettings) -> String {
        let mut content = String::new();

        content.push_str("# 扫描线光栅化器配置文件\n");
        content.push_str("# 基于RenderSettings默认值生成\n\n");

        // [files] 部分
        content.push_str("[files]\n");
        let models = settings
            .models
            .iter()
            .map(|m| format!("\"{}\"", m))
            .collect::<Vec<_>>()
            .join(", ");
        content.push_str(&format!("models = [{}]  # STL 或 OBJ，按顺序绘制\n", models));
        content.push_str(&format!("output = \"{}\"\n", settings.output));
        content.push_str(&format!("output_dir = \"{}\"\n", settings.output_dir));
        content.push('\n');

        // [render] 部分
        content.push_str("[render]\n");
        content.push_str(&format!("width = {}\n", settings.width));
        content.push_str(&format!("height = {}\n", settings.height));
        content.push_str(&format!(
            "projection = \"{}\"  # perspective | orthographic\n",
            settings.projection.as_str()
        ));
        content.push_str(&format!(
            "render_mode = \"{}\"  # fill | wireframe\n",
            settings.render_mode.as_str()
        ));
        content.push_str(&format!("use_zbuffer = {}\n", settings.use_zbuffer));
        content.push_str(&format!(
            "backface_culling = \"{}\"  # normal | winding | none\n",
            settings.backface_culling.as_str()
        ));
        content.push_str(&format!(
            "use_multithreading = {}\n",
            settings.use_multithreading
        ));
        content.push_str(&format!("save_depth = {}\n", settings.save_depth));
        content.push_str(&format!(
            "background_color = \"{}\"\n",
            settings.background_color
        ));
        content.push('\n');

        // [camera] 部分
        content.push_str("[camera]\n");
        content.push_str(&format!("position = \"{}\"\n", settings.camera_position));
        content.push_str(&format!("fov = {:?}  # 度\n", settings.camera_fov));
        content.push_str(&format!("z_far = {:?}\n", settings.z_far));
        content.push_str(&format!("ortho_box = \"{}\"\n", settings.ortho_box));
        content.push_str(&format!("ortho_depth = {:?}\n", settings.ortho_depth));
        content.push('\n');

        // [object] 部分
        content.push_str("[object]\n");
        content.push_str(&format!(
            "rotate_on_centroid = {}\n",
            settings.rotate_on_centroid
        ));
        content.push_str(&format!(
            "angular_speed = {:?}  # 度/秒\n",
            settings.angular_speed
        ));
        content.push_str(&format!("base_yaw = {:?}\n", settings.base_yaw));
        content.push_str(&format!("normalize_model = {}\n", settings.normalize_model));
        content.push('\n');

        // [lighting] 部分
        content.push_str("[lighting]\n");
        content.push_str(&format!("direction = \"{}\"\n", settings.light_direction));
        content.push_str(&format!("gain = {:?}\n", settings.light_gain));
        content.push_str(&format!("ambient = {:?}\n", settings.ambient));
        content.push('\n');

        // [animation] 部分
        content.push_str("[animation]\n");
        content.push_str(&format!("frames = {}  # 无头模式帧数\n", settings.frames));
        content.push_str(&format!("fps = {:?}\n", settings.fps));
        content.push_str(&format!(
            "toggle_interval = {:?}  # 秒\n",
            settings.toggle_interval
        ));
        content.push_str(&format!("fov_step = {:?}\n", settings.fov_step));

        content
    }
}

/// 读取数值字段，整数和浮点数都接受
fn get_f32(table: &toml::Table, key: &str) -> Option<f32> {
    match table.get(key)? {
        Value::Float(f) => Some(*f as f32),
        Value::Integer(i) => Some(*i as f32),
        other => {
            warn!("忽略无效的数值字段 {} = {}", key, other);
            None
        }
    }
}

fn get_usize(table: &toml::Table, key: &str) -> Result<Option<usize>, String> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Integer(i)) if *i >= 0 => Ok(Some(*i as usize)),
        Some(other) => Err(format!("{} 必须是非负整数: {}", key, other)),
    }
}
