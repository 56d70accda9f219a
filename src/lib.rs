//! Blockfall (workspace facade crate).
//!
//! Re-exports the `blockfall::{core,input,term,types}` crates and adds the
//! application layer: the [`app::App`] context that routes terminal events
//! into the game, [`config::Config`] and logging setup.

pub mod app;
pub mod config;
pub mod logging;

pub use blockfall_core as core;
pub use blockfall_input as input;
pub use blockfall_term as term;
pub use blockfall_types as types;
