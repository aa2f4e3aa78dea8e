use crate::io::config_loader::TomlConfigLoader;
use crate::io::render_settings::RenderSettings;
use clap::Parser;
use log::info;

/// 极简CLI - 配置文件加上少量覆盖项
#[derive(Parser, Debug)]
#[command(name = "scanline-rasterizer")]
#[command(about = "扫描线软件光栅化器：平面着色、深度缓冲、实时预览")]
pub struct SimpleCli {
    /// 配置文件路径（TOML格式）
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// 无头模式（不启动GUI，渲染帧并保存为PNG）
    #[arg(long)]
    pub headless: bool,

    /// 使用示例配置（创建并加载 temp_example_config.toml）
    #[arg(long)]
    pub use_example_config: bool,

    /// 模型文件（STL/OBJ），可重复；覆盖配置中的模型列表
    #[arg(short, long = "model", value_name = "PATH")]
    pub models: Vec<String>,

    /// 无头模式渲染的帧数
    #[arg(long, value_name = "N")]
    pub frames: Option<usize>,
}

impl SimpleCli {
    /// 处理CLI参数，返回RenderSettings和是否启动GUI
    pub fn process() -> Result<(RenderSettings, bool), String> {
        Self::parse().into_settings()
    }

    fn into_settings(self) -> Result<(RenderSettings, bool), String> {
        let mut settings = if self.use_example_config {
            let temp_config_path = "temp_example_config.toml";
            TomlConfigLoader::create_example_config(temp_config_path)?;
            info!("已创建临时示例配置: {}", temp_config_path);

            TomlConfigLoader::load_from_file(temp_config_path)
                .map_err(|e| format!("加载示例配置失败: {}", e))?
        } else if let Some(config_path) = &self.config {
            info!("加载配置文件: {}", config_path);
            TomlConfigLoader::load_from_file(config_path)
                .map_err(|e| format!("配置文件加载失败: {}", e))?
        } else {
            info!("使用默认设置");
            RenderSettings::default()
        };

        if !self.models.is_empty() {
            settings.models = self.models;
        }
        if let Some(frames) = self.frames {
            settings.frames = frames;
        }

        Ok((settings, !self.headless))
    }
}
