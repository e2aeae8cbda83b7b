pub mod cull;
pub mod frame;
pub mod present;
pub mod render_loop;
pub mod surface;
