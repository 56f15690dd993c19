//! Terminal "game renderer" module.
//!
//! This is a small, game-oriented rendering layer for terminal gameplay.
//! It intentionally avoids ratatui widgets/layout and instead renders into a
//! simple framebuffer that can be flushed to a terminal backend.
//!
//! Goals:
//! - Keep `core` free of presentation concerns
//! - Compose the screen from a few framebuffer widgets sharing one trait
//! - Only re-emit the cells that changed since the previous frame

pub mod fb;
pub mod game_view;
pub mod renderer;
pub mod theme;
pub mod widgets;

pub use train_matcher_core as core;
pub use train_matcher_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{GameView, Layout, ViewWidgets, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
pub use theme::{Theme, ThemeKind};
pub use widgets::{ComboMeter, MessageFeed, Rect, SelectionBar, ViewContext, Widget};
