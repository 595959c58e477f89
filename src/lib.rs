pub mod domain;
pub mod terminal;
pub mod utils;
