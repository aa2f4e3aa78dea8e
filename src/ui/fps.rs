use egui::Color32;
use std::collections::VecDeque;
use std::time::Duration;

const FPS_HISTORY_SIZE: usize = 30;

/// 帧率统计，保留最近30帧用于平滑显示
#[derive(Debug, Default)]
pub struct FpsCounter {
    history: VecDeque<f32>,
    current: f32,
    average: f32,
}

impl FpsCounter {
    pub fn update(&mut self, frame_time: Duration) {
        let seconds = frame_time.as_secs_f32();
        if seconds <= 0.0 {
            return;
        }
        self.current = 1.0 / seconds;

        self.history.push_back(self.current);
        if self.history.len() > FPS_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.average = self.history.iter().sum::<f32>() / self.history.len() as f32;
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn average(&self) -> f32 {
        self.average
    }

    /// 显示文本与颜色：≥30 绿色，≥15 黄色，其余红色
    pub fn display(&self) -> (String, Color32) {
        let fps_color = if self.average >= 30.0 {
            Color32::from_rgb(50, 220, 50)
        } else if self.average >= 15.0 {
            Color32::from_rgb(220, 180, 50)
        } else {
            Color32::from_rgb(220, 50, 50)
        };

        (format!("FPS: {:.1}", self.average), fps_color)
    }
}
