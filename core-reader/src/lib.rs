//! # Core Reader Module
//!
//! The reading-session surface of the reader core: the pure view-state
//! machine and the [`NavigationController`] that hosts drive.
//!
//! ## Overview
//!
//! - [`state`] holds the side-effect-free view machine
//!   (`Search`/`Shelf`/`Detail`/`Reader` plus transitions).
//! - [`controller`] wires the machine to the stores, the fetch
//!   coordinators, and the event bus.
//!
//! ## Usage
//!
//! ```ignore
//! use core_reader::NavigationController;
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("https://catalog.example.com")
//!     .build()?;
//! let controller = NavigationController::new(&config);
//!
//! let candidates = controller.search("sable").await?;
//! controller.open_book(candidates[0].clone());
//! let content = controller.start_reading().await?;
//! ```

pub mod controller;
pub mod error;
pub mod state;

pub use controller::NavigationController;
pub use error::{ReaderError, Result};
pub use state::{NavEvent, NavSignal, Step, ViewState};
