pub mod app;
pub mod entity;
pub mod relay;
pub mod repository;
pub mod statistics;
pub mod timer;
pub mod tracker;
