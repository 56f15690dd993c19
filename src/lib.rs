//! Train color matcher (workspace facade crate).
//!
//! Exposes `train_matcher::{core,config,input,journal,term,types}` over the
//! crates under `crates/`, plus the terminal [`app`] driving them.

pub use train_matcher_config as config;
pub use train_matcher_core as core;
pub use train_matcher_input as input;
pub use train_matcher_journal as journal;
pub use train_matcher_term as term;
pub use train_matcher_types as types;

pub mod app;
