//! Huddle Relay Library
//!
//! Core components for the huddle session relay: devices join a shared
//! session over WebSockets, user messages are persisted and answered by an
//! external text-generation provider speaking through a named mood persona,
//! and a raw-signal path fans opaque payloads between peers.

pub mod api;
pub mod completion;
pub mod config;
pub mod db;
pub mod events;
pub mod persona;
pub mod registry;
pub mod relay;
pub mod store;
