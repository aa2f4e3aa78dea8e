mod core;
mod geometry;
mod io;
mod scene;
mod ui;
mod utils;

use crate::core::render_context::RenderContext;
use crate::io::simple_cli::SimpleCli;
use crate::scene::Scene;
use crate::utils::render_process::run_headless;
use log::{error, info, warn};

fn run() -> Result<(), String> {
    let (settings, should_start_gui) = SimpleCli::process()?;

    if should_start_gui {
        // GUI 模式允许无模型启动，之后通过对话框加载
        settings.validate_render()?;
        if settings.models.is_empty() {
            warn!("未指定模型，可在窗口中打开");
        }
        let context = RenderContext::from_settings(&settings)?;
        let scene = Scene::from_settings(&settings)?;

        info!("启动GUI...");
        ui::start_gui(settings, scene, context).map_err(|e| format!("GUI启动失败: {}", e))
    } else {
        settings.validate()?;
        let context = RenderContext::from_settings(&settings)?;
        let mut scene = Scene::from_settings(&settings)?;

        run_headless(&settings, &mut scene, &context).map(|_| ())
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
