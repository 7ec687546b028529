//! Small raster helpers for the remote UI.

pub mod placeholder;
