use crate::core::render_context::RenderContext;
use crate::core::renderer::{FrameStats, Renderer};
use crate::io::model_loader::load_model;
use crate::io::render_settings::RenderSettings;
use crate::scene::Scene;
use crate::scene::scene_object::SceneObject;
use crate::utils::debounce::ToggleDebouncer;
use crate::utils::save_utils::save_frame;
use egui::{Color32, ColorImage, Key, RichText, TextureOptions};
use log::{debug, error, info};
use native_dialog::FileDialogBuilder;
use std::time::Instant;

use super::fps::FpsCounter;

/// 按键触发的开关动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToggleAction {
    Projection,
    RenderMode,
    Centroid,
    FovUp,
    FovDown,
    Screenshot,
}

const KEY_BINDINGS: [(Key, ToggleAction); 6] = [
    (Key::P, ToggleAction::Projection),
    (Key::R, ToggleAction::RenderMode),
    (Key::C, ToggleAction::Centroid),
    (Key::ArrowUp, ToggleAction::FovUp),
    (Key::ArrowDown, ToggleAction::FovDown),
    (Key::S, ToggleAction::Screenshot),
];

/// 窗口标题
pub fn window_caption(total_triangles: usize, rendered: usize, fps: f32) -> String {
    format!(
        "Tri count: {}. Rendered: {}. FPS: {}",
        total_triangles, rendered, fps as i64
    )
}

/// 实时预览窗口
pub struct RasterizerApp {
    settings: RenderSettings,
    context: RenderContext,
    scene: Scene,
    renderer: Renderer,
    /// 所有按键共用一个限速器
    debouncer: ToggleDebouncer,

    rendered_image: Option<egui::TextureHandle>,
    fps: FpsCounter,
    last_frame_time: Option<Instant>,
    last_stats: FrameStats,
    last_caption: String,
    status_message: String,
}

impl RasterizerApp {
    pub fn new(
        settings: RenderSettings,
        scene: Scene,
        context: RenderContext,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let renderer = Renderer::new(context.width(), context.height(), context.background);
        let debouncer = ToggleDebouncer::from_secs(settings.toggle_interval);

        Self {
            settings,
            context,
            scene,
            renderer,
            debouncer,
            rendered_image: None,
            fps: FpsCounter::default(),
            last_frame_time: None,
            last_stats: FrameStats::default(),
            last_caption: String::new(),
            status_message: String::new(),
        }
    }

    /// 轮询按住的按键，经限速器过滤后执行
    fn handle_keys(&mut self, ctx: &egui::Context, now: Instant) {
        let held: Vec<ToggleAction> = ctx.input(|i| {
            KEY_BINDINGS
                .iter()
                .filter(|(key, _)| i.key_down(*key))
                .map(|(_, action)| *action)
                .collect()
        });

        for action in held {
            if self.debouncer.try_accept(now) {
                self.apply(action);
            }
        }
    }

    fn apply(&mut self, action: ToggleAction) {
        match action {
            ToggleAction::Projection => {
                self.context.toggle_projection();
                info!("投影模式: {}", self.context.projection.label());
            }
            ToggleAction::RenderMode => {
                self.context.toggle_render_mode();
                info!("渲染模式: {}", self.context.render_mode.label());
            }
            ToggleAction::Centroid => {
                self.context.toggle_centroid();
                info!("绕质心旋转: {}", self.context.rotate_on_centroid);
            }
            ToggleAction::FovUp | ToggleAction::FovDown => {
                let step = if action == ToggleAction::FovUp {
                    self.settings.fov_step
                } else {
                    -self.settings.fov_step
                };
                if self.context.adjust_fov(step) {
                    info!("视场角: {:.1}°", self.context.fov_deg());
                } else {
                    debug!("视场角保持 {:.1}°", self.context.fov_deg());
                }
            }
            ToggleAction::Screenshot => match self.take_screenshot() {
                Ok(path) => self.status_message = format!("Saved {}", path),
                Err(e) => {
                    error!("{}", e);
                    self.status_message = "Screenshot failed".to_string();
                }
            },
        }
    }

    fn take_screenshot(&self) -> Result<String, String> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let snapshot_name = format!("{}_screenshot_{}", self.settings.output, timestamp);
        let written = save_frame(
            &self.renderer.frame_buffer,
            &self.settings.output_dir,
            &snapshot_name,
            self.settings.save_depth,
        )?;
        Ok(written
            .first()
            .map(|p| p.display().to_string())
            .unwrap_or(snapshot_name))
    }

    fn open_model_dialog(&mut self) {
        let result = FileDialogBuilder::default()
            .set_title("Open model")
            .add_filter("Mesh", ["stl", "obj"])
            .open_single_file()
            .show();

        match result {
            Ok(Some(path)) => match load_model(&path, self.settings.normalize_model) {
                Ok(mesh) => {
                    self.status_message = format!("Loaded {}", mesh.name);
                    self.scene.add_object(SceneObject::new(
                        mesh,
                        self.settings.angular_speed,
                        self.settings.base_yaw,
                    ));
                }
                Err(e) => {
                    error!("{}", e);
                    self.status_message = format!("Failed to load {}", path.display());
                }
            },
            Ok(None) => {}
            Err(e) => {
                error!("文件对话框出错: {}", e);
                self.status_message = "File dialog failed".to_string();
            }
        }
    }

    fn draw_top_panel(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(format!("Projection (P): {}", self.context.projection.label()));
            ui.separator();
            ui.label(format!("Render type (R): {}", self.context.render_mode.label()));
            ui.separator();
            ui.label(format!("FOV (Up/Down): {:.0} deg", self.context.fov_deg()));
            ui.separator();
            ui.label(format!(
                "Centroid rotation (C): {}",
                if self.context.rotate_on_centroid { "On" } else { "Off" }
            ));
            ui.separator();
            ui.label(format!(
                "Triangles: {}/{}",
                self.last_stats.rendered, self.last_stats.submitted
            ));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let (fps_text, fps_color) = self.fps.display();
                ui.label(RichText::new(fps_text).color(fps_color));
                ui.separator();
                if ui
                    .add_enabled(!self.scene.is_empty(), egui::Button::new("Clear"))
                    .clicked()
                {
                    self.scene = Scene::default();
                }
                if ui.button("Open model").clicked() {
                    self.open_model_dialog();
                }
                if !self.status_message.is_empty() {
                    ui.label(RichText::new(&self.status_message).color(Color32::LIGHT_GRAY));
                }
            });
        });
    }

    /// 以中央面板的像素尺寸作为视口渲染一帧并显示
    fn render_viewport(&mut self, ui: &mut egui::Ui, dt: f32) {
        let available = ui.available_size();
        let pixels_per_point = ui.ctx().pixels_per_point();
        let width = (available.x * pixels_per_point).round() as usize;
        let height = (available.y * pixels_per_point).round() as usize;
        if self.context.set_viewport(width, height) {
            debug!("视口尺寸变为 {}x{}", width, height);
        }

        self.scene.advance_animation(dt);
        self.last_stats = self.renderer.render_frame(&self.scene, &self.context);

        let frame_buffer = &self.renderer.frame_buffer;
        let image = ColorImage::from_rgb(
            [frame_buffer.width, frame_buffer.height],
            frame_buffer.get_color_buffer_bytes(),
        );
        match &mut self.rendered_image {
            Some(texture) => texture.set(image, TextureOptions::default()),
            None => {
                self.rendered_image =
                    Some(ui.ctx().load_texture("frame", image, TextureOptions::default()));
            }
        }

        if let Some(texture) = &self.rendered_image {
            ui.add(egui::Image::new(texture).fit_to_exact_size(available));
        }
    }
}

impl eframe::App for RasterizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let frame_time = self
            .last_frame_time
            .map(|last| now.duration_since(last))
            .unwrap_or_default();
        self.last_frame_time = Some(now);
        self.fps.update(frame_time);

        self.handle_keys(ctx, now);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            self.draw_top_panel(ui);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::default())
            .show(ctx, |ui| {
                self.render_viewport(ui, frame_time.as_secs_f32());
            });

        let caption = window_caption(
            self.scene.total_triangles(),
            self.last_stats.rendered,
            self.fps.current(),
        );
        if caption != self.last_caption {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(caption.clone()));
            self.last_caption = caption;
        }

        ctx.request_repaint();
    }
}

/// 启动GUI应用
pub fn start_gui(
    settings: RenderSettings,
    scene: Scene,
    context: RenderContext,
) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.width as f32, settings.height as f32 + 32.0])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Scanline Rasterizer",
        options,
        Box::new(move |cc| Ok(Box::new(RasterizerApp::new(settings, scene, context, cc)))),
    )
}
