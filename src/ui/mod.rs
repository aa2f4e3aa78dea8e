pub mod app;
pub mod fps;

pub use app::start_gui;
