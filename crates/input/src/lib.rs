//! Terminal input module (session-facing).
//!
//! This module is intentionally independent of any UI framework. It maps
//! `crossterm` key and mouse events into [`crate::types::PlayerAction`]s and
//! click positions. Resolving a click to a selection option is left to the
//! widget that drew it.

pub mod map;

pub use train_matcher_types as types;

pub use map::{click_position, handle_key_event, should_quit};
