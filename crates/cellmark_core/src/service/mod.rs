//! Core use-case services.
//!
//! # Responsibility
//! - Drive cell state transitions and keep visuals in sync with them.
//! - Keep host widget types out of the state machine.

pub mod classifier;
