use crate::core::render_context::RenderContext;
use crate::core::renderer::{FrameStats, Renderer};
use crate::io::render_settings::RenderSettings;
use crate::scene::Scene;
use crate::utils::animation_utils::frame_time_step;
use crate::utils::save_utils::save_frame;
use log::info;
use std::time::Instant;

/// 渲染单帧并保存结果
pub fn render_single_frame(
    renderer: &mut Renderer,
    scene: &Scene,
    context: &RenderContext,
    settings: &RenderSettings,
    output_name: &str,
) -> Result<FrameStats, String> {
    let frame_start_time = Instant::now();

    let stats = renderer.render_frame(scene, context);
    save_frame(
        &renderer.frame_buffer,
        &settings.output_dir,
        output_name,
        settings.save_depth,
    )?;

    info!(
        "帧 {} 完成: 渲染 {}/{} 个三角形，覆盖 {} 像素，光栅化 {:?}，总耗时 {:?}",
        output_name,
        stats.rendered,
        stats.submitted,
        renderer.frame_buffer.covered_pixels(),
        renderer.last_frame_time(),
        frame_start_time.elapsed()
    );
    Ok(stats)
}

/// 无头模式：以固定时间步 `1/fps` 渲染 `frames` 帧并逐帧保存
pub fn run_headless(
    settings: &RenderSettings,
    scene: &mut Scene,
    context: &RenderContext,
) -> Result<Vec<FrameStats>, String> {
    let total_frames = settings.frames.max(1);
    let dt = frame_time_step(settings.fps);
    info!("开始无头渲染 ({} 帧, 时间步 {:.4}s)...", total_frames, dt);

    let start_time = Instant::now();
    let mut renderer = Renderer::new(context.width(), context.height(), context.background);
    let mut all_stats = Vec::with_capacity(total_frames);

    for frame_num in 0..total_frames {
        if frame_num > 0 {
            scene.advance_animation(dt);
        }
        let output_name = format!("{}_{:03}", settings.output, frame_num);
        all_stats.push(render_single_frame(
            &mut renderer,
            scene,
            context,
            settings,
            &output_name,
        )?);
    }

    info!("无头渲染完成，总耗时 {:?}", start_time.elapsed());
    Ok(all_stats)
}
