//! Real-time collaboration server library.
//!
//! Tracks live connections and their platform, keeps collaborative rooms with
//! a single editor and a shared key/value state, and relays room changes to
//! every subscriber over WebSocket. A small HTTP side-channel lets other
//! services push alerts and notifications into the live connection set.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
