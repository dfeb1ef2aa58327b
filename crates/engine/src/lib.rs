//! Starbridge Engine library.
//!
//! Session coordination server for the bridge VTT.
//!
//! ## Structure
//!
//! - `use_cases/` - One module per bridge subsystem
//! - `infrastructure/` - Ports, the SQLite state store, clock and configuration
//! - `api/` - HTTP and WebSocket entry points, sessions and broadcast routing
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
