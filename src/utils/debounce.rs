use std::time::{Duration, Instant};

/// 按键开关的限速器
///
/// 距离上次被接受的事件不足 `min_interval` 的事件被丢弃；
/// 只有被接受的事件才会更新时间戳，第一次事件总是被接受。
#[derive(Debug, Clone)]
pub struct ToggleDebouncer {
    min_interval: Duration,
    last_accepted: Option<Instant>,
}

impl ToggleDebouncer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: None,
        }
    }

    pub fn from_secs(seconds: f32) -> Self {
        Self::new(Duration::from_secs_f32(seconds.max(0.0)))
    }

    /// 尝试接受一次事件
    pub fn try_accept(&mut self, now: Instant) -> bool {
        let accepted = match self.last_accepted {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.min_interval,
        };
        if accepted {
            self.last_accepted = Some(now);
        }
        accepted
    }
}
