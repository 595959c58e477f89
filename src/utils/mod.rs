pub mod tracing;
pub mod xdg;
