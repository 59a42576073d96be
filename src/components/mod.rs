//! UI components.

pub mod cloud_sky;
