//! Presentation adapter contracts.
//!
//! Declares the instructor toolbar actions, the host-facing adapter trait and
//! the registry wiring them to opened documents. Widget construction stays
//! with the host.

pub mod kernel;
pub mod toolbar;
