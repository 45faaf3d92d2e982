pub mod color;
pub mod config;
