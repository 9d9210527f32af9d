//! AIS relay service library.
//!
//! Wires the feed connection, message store, and HTTP query layer together.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use logging::init_logging;
