pub mod config;
pub mod input;
pub mod page;
pub mod repository;
pub mod view;

mod app;

pub use app::{Terminal, TerminalError};
