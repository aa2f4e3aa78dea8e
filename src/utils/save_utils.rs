use crate::core::frame_buffer::FrameBuffer;
use image::ColorType;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// 保存RGB图像数据到PNG文件
pub fn save_image(path: &Path, data: &[u8], width: u32, height: u32) -> Result<(), String> {
    image::save_buffer(path, data, width, height, ColorType::Rgb8)
        .map_err(|e| format!("保存图像到 {} 时出错: {}", path.display(), e))?;
    info!("图像已保存到 {}", path.display());
    Ok(())
}

/// 按百分位数把有限深度归一化到 [0, 1]
///
/// 非有限值（从未写入的像素）保持为 `None`。
pub fn normalize_depth(
    depth_buffer: &[f32],
    min_percentile: f32,
    max_percentile: f32,
) -> Vec<Option<f32>> {
    let mut finite_depths: Vec<f32> = depth_buffer
        .iter()
        .copied()
        .filter(|d| d.is_finite())
        .collect();

    if finite_depths.is_empty() {
        return vec![None; depth_buffer.len()];
    }

    finite_depths.sort_unstable_by(f32::total_cmp);
    let last = finite_depths.len() - 1;
    let percentile_index =
        |p: f32| ((p / 100.0 * last as f32).round() as usize).min(last);

    let mut min_clip = finite_depths[percentile_index(min_percentile)];
    let mut max_clip = finite_depths[percentile_index(max_percentile)];
    if max_clip - min_clip < 1e-6 {
        min_clip = finite_depths[0];
        max_clip = finite_depths[last];
    }
    debug!(
        "深度归一化: [{:.1}%, {:.1}%] -> [{:.3}, {:.3}]",
        min_percentile, max_percentile, min_clip, max_clip
    );

    let range = max_clip - min_clip;
    let inv_range = if range > 1e-6 { 1.0 / range } else { 0.0 };

    depth_buffer
        .iter()
        .map(|&depth| {
            depth
                .is_finite()
                .then(|| ((depth.clamp(min_clip, max_clip) - min_clip) * inv_range).clamp(0.0, 1.0))
        })
        .collect()
}

/// 深度图转灰度RGB：越近越亮，未覆盖像素为黑色
pub fn depth_to_grey(depth_buffer: &[f32]) -> Vec<u8> {
    normalize_depth(depth_buffer, 1.0, 99.0)
        .into_iter()
        .flat_map(|d| {
            let v = d.map_or(0, |d| (255.0 * (1.0 - d)).round() as u8);
            [v, v, v]
        })
        .collect()
}

/// 保存一帧：`<name>_color.png`，以及可选的 `<name>_depth.png`
///
/// 返回写出的文件路径。输出目录不存在时自动创建。
pub fn save_frame(
    frame_buffer: &FrameBuffer,
    output_dir: &str,
    output_name: &str,
    save_depth: bool,
) -> Result<Vec<PathBuf>, String> {
    fs::create_dir_all(output_dir)
        .map_err(|e| format!("创建输出目录 {} 失败: {}", output_dir, e))?;

    let width = frame_buffer.width as u32;
    let height = frame_buffer.height as u32;
    let mut written = Vec::new();

    let color_path = Path::new(output_dir).join(format!("{}_color.png", output_name));
    save_image(&color_path, frame_buffer.get_color_buffer_bytes(), width, height)?;
    written.push(color_path);

    if save_depth {
        let depth_path = Path::new(output_dir).join(format!("{}_depth.png", output_name));
        let grey = depth_to_grey(frame_buffer.get_depth_buffer_f32());
        save_image(&depth_path, &grey, width, height)?;
        written.push(depth_path);
    }

    Ok(written)
}
