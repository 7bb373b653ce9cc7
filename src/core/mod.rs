// src/core/mod.rs
//! Core pipeline: template storage, rendering, sanitizing and processing

pub mod fs_ops;
pub mod processor;
pub mod renderer;
pub mod sanitizer;
pub mod service_client;
pub mod template_store;

pub use fs_ops::FsOps;
pub use processor::ResumeProcessor;
pub use renderer::{RenderOptions, TemplateRenderer};
pub use sanitizer::sanitize;
pub use service_client::ServiceClient;
pub use template_store::TemplateStore;
