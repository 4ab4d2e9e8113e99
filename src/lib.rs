pub mod api;
pub mod cli;
pub mod core;
pub mod feed;
pub mod render;
