//! # Configuration
//!
//! Controller configuration loaded once at startup and passed explicitly to the
//! components that need it.

mod controller;

pub use controller::ControllerConfig;
