//! DreamShift EMS recurring-task worker library.
//!
//! Exposes the sweep logic so the binary entrypoint and integration
//! tests share it.

pub mod sweep;
