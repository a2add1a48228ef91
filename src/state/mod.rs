//! State module for tracking walk progress
//!
//! # Components
//!
//! - `WalkState`: the hierarchy walker's position (summary, flat-type links, blocks, done)

mod walk_state;

pub use walk_state::WalkState;
