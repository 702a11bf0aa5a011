//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the reader platform core:
//! - Logging and tracing infrastructure
//! - Configuration management with injected bridges
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the core runtime utilities that other modules depend
//! on. It establishes the logging conventions, the dependency-injection
//! configuration, and the event broadcasting mechanisms used throughout the
//! system.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
pub use events::{EventBus, EventStream, ReaderEvent};
