pub mod frame_buffer;
pub mod geometry_processor;
pub mod rasterizer;
pub mod render_context;
pub mod renderer;
pub mod shading;
