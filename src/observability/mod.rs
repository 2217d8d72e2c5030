//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing, config and http produce:
//!     → logging.rs (structured log events via `tracing`)
//!
//! Consumers:
//!     → stdout (fmt layer)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`route`, `template`, `strategy`) rather than formatted text
//! - Route matching logs at debug, link generation at trace
//! - Log level configurable via config and environment

pub mod logging;

pub use logging::init_logging;
