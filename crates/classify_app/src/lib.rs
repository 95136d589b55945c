//! Terminal client for a remote image classification server.
mod app;
pub mod config;
pub mod controller;
mod effects;
pub mod ui;

pub use app::run_app;
pub use config::{ClientConfig, ConfigError, LogSetting};
pub use controller::{ChannelViewSink, Controller, ViewSink};
