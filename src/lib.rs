pub mod app;
pub mod category;
pub mod collector;
pub mod config;
pub mod constants;
pub mod error;
pub mod extractor;
pub mod images;
pub mod infra;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod publisher;
pub mod render;
pub mod types;
