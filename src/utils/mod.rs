// utils/mod.rs
// 动画推进、按键限速、无头渲染流程与结果保存
pub mod animation_utils;
pub mod debounce;
pub mod render_process;
pub mod save_utils;
