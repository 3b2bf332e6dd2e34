pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod pages;
pub mod scenario;
pub mod widgets;

pub use config::DemoConfig;
pub use error::{Error, Result};
pub use model::Session;
