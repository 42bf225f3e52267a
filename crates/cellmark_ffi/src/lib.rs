//! FFI bindings for Cellmark UI hosts.

pub mod api;
