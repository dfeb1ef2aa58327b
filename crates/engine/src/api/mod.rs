//! API layer - HTTP and WebSocket entry points.

pub mod broadcast;
pub mod connections;
pub mod http;
pub mod rooms;
pub mod session_registry;
pub mod websocket;

pub use connections::ConnectionManager;
