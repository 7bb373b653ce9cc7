pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod session;
pub mod types;
pub mod web;

pub use config::AppConfig;
pub use crate::core::{ResumeProcessor, TemplateRenderer, TemplateStore};
pub use error::{FormatterError, FormatterResult};
pub use web::start_web_server;
